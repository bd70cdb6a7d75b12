//! Per-record bit codec construction, type-id registry, and dispatch.
//!
//! This is the engine crate of repbit. Given a set of record types (each
//! implementing [`layout::Replicated`]) and the composite serializers they
//! reference, it builds:
//!
//! - A compiled [`RecordCodec`] per record: full/masked serialize,
//!   full/masked deserialize, and the fieldwise difference mask.
//! - A frozen [`Registry`] assigning each record a dense `u16` type id,
//!   grouping ids by replication role, and holding the per-id dispatch
//!   thunks.
//! - Three stateless dispatch entry points routing wire-tagged
//!   `new`/`update`/`destroy` messages to a user-supplied [`Receiver`].
//!
//! # Design Principles
//!
//! - **Build once, run read-only** - all validation happens at
//!   registration; steady-state calls never mutate shared state.
//! - **Deterministic** - field order, widths, and id assignment depend only
//!   on the registration sequence.
//! - **No rollback** - a partially written message stays written; callers
//!   wanting atomicity must buffer.

mod dispatch;
mod error;
mod plan;
mod registry;
mod serializers;

pub use dispatch::{receive_destroy, receive_new, receive_update, Receiver};
pub use error::{BuildError, BuildResult, CodecError, CodecResult};
pub use plan::RecordCodec;
pub use registry::{RecordEntry, Registry, RegistryBuilder};
pub use serializers::{BitSerializer, CompositeCodec, SerializerRegistry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        // Verify all expected items are exported
        let _ = SerializerRegistry::new();
        let _: BuildResult<()> = Ok(());
        let _: CodecResult<()> = Ok(());

        struct Probe;
        impl Receiver for Probe {
            fn receive_new<T: layout::Replicated>(&mut self, _: u32, _: T) {}
            fn update<T: layout::Replicated>(&mut self, _: u32, _: u32, _: T) {}
            fn grab_or_create<T: layout::Replicated>(&mut self, _: u32) -> T {
                T::default()
            }
            fn destroy_component<T: layout::Replicated>(&mut self, _: u32) {}
        }

        let registry: Registry<Probe> = Registry::builder().build();
        assert!(registry.is_empty());
    }
}
