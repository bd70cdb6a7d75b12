//! Replication roles and record layout definitions for the repbit codec.
//!
//! This crate defines how replicated value records are described to the
//! codec engine:
//! - Field types (blittable primitives, enums, single-level composites)
//! - The wire-width rules for every field type
//! - Record layouts with structural validation
//! - The [`Replicated`] field-access contract records implement
//!
//! # Design Principles
//!
//! - **Runtime-first** - layouts are plain values built by hand or by a
//!   scanner; derive macros can come later.
//! - **Explicit layouts** - No reflection on arbitrary Rust types.
//! - **Declaration order is canonical** - both endpoints must agree on it.

mod error;
mod field;
mod record;
mod value;

pub use error::{LayoutError, LayoutResult};
pub use field::{bits_for_enum, FieldDef, FieldType};
pub use record::{RecordLayout, MAX_FIELDS};
pub use value::{FieldRef, FieldValue, Replicated};

/// Replication role assigned to a record type.
///
/// The role decides which id bucket a record joins; it has no effect on the
/// record's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Client-predicted state, reconciled against server authority.
    Predicted,
    /// Server-authoritative state mirrored to clients.
    Ghost,
    /// Client input sampled per tick.
    Input,
    /// Fire-and-forget event, delivered at most once.
    ShortLivedEvent,
}

impl Role {
    /// All roles, in id-bucket order followed by events.
    pub const ALL: [Role; 4] = [
        Role::Predicted,
        Role::Ghost,
        Role::Input,
        Role::ShortLivedEvent,
    ];

    /// Returns the lowercase display name of the role.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Role::Predicted => "predicted",
            Role::Ghost => "ghost",
            Role::Input => "input",
            Role::ShortLivedEvent => "event",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        // Verify all expected items are exported
        let _ = FieldType::Bool;
        let _ = FieldDef::new("hp", FieldType::U16);
        let _ = bits_for_enum(3);
        let _ = RecordLayout::new("Empty", &[]);

        let _: Role = Role::Ghost;
        let _: LayoutResult<()> = Ok(());
    }

    #[test]
    fn role_names() {
        assert_eq!(Role::Predicted.name(), "predicted");
        assert_eq!(Role::Ghost.name(), "ghost");
        assert_eq!(Role::Input.name(), "input");
        assert_eq!(Role::ShortLivedEvent.name(), "event");
    }

    #[test]
    fn role_all_covers_every_variant() {
        assert_eq!(Role::ALL.len(), 4);
        for role in Role::ALL {
            assert!(Role::ALL.contains(&role));
        }
    }

    #[test]
    fn role_is_hashable() {
        use std::collections::HashSet;
        let set: HashSet<Role> = Role::ALL.into_iter().collect();
        assert_eq!(set.len(), 4);
    }
}
