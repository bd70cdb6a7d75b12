//! Record layout definition and structural validation.

use crate::error::{LayoutError, LayoutResult};
use crate::field::FieldDef;

/// Maximum number of fields a record may declare.
///
/// The change mask is a `u32` with one bit per field, so 32 is a hard cap.
pub const MAX_FIELDS: usize = 32;

/// The ordered field layout of one replicated record type.
///
/// Field order is the canonical declaration order; both endpoints must use
/// the same layout for the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Record type name, for diagnostics and the id assignment table.
    pub type_name: &'static str,
    /// Fields in declaration order.
    pub fields: &'static [FieldDef],
}

impl RecordLayout {
    /// Creates a record layout.
    #[must_use]
    pub const fn new(type_name: &'static str, fields: &'static [FieldDef]) -> Self {
        Self { type_name, fields }
    }

    /// Returns the number of declared fields.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Validates structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::TooManyFields`] if the record declares more
    /// than [`MAX_FIELDS`] fields, or [`LayoutError::DuplicateFieldName`] if
    /// two fields share a name.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.fields.len() > MAX_FIELDS {
            return Err(LayoutError::TooManyFields {
                record: self.type_name,
                count: self.fields.len(),
                max: MAX_FIELDS,
            });
        }

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(LayoutError::DuplicateFieldName {
                    record: self.type_name,
                    field: field.name,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    #[test]
    fn empty_layout_is_valid() {
        let layout = RecordLayout::new("Marker", &[]);
        layout.validate().unwrap();
        assert_eq!(layout.field_count(), 0);
    }

    #[test]
    fn simple_layout_is_valid() {
        const FIELDS: [FieldDef; 2] = [
            FieldDef::new("alive", FieldType::Bool),
            FieldDef::new("hp", FieldType::U16),
        ];
        let layout = RecordLayout::new("Health", &FIELDS);
        layout.validate().unwrap();
        assert_eq!(layout.field_count(), 2);
    }

    #[test]
    fn layout_at_field_cap_is_valid() {
        const NAMES: [&str; MAX_FIELDS] = [
            "f00", "f01", "f02", "f03", "f04", "f05", "f06", "f07", "f08", "f09", "f10", "f11",
            "f12", "f13", "f14", "f15", "f16", "f17", "f18", "f19", "f20", "f21", "f22", "f23",
            "f24", "f25", "f26", "f27", "f28", "f29", "f30", "f31",
        ];
        static FIELDS: [FieldDef; MAX_FIELDS] = {
            let mut fields = [FieldDef::new("", FieldType::Bool); MAX_FIELDS];
            let mut i = 0;
            while i < MAX_FIELDS {
                fields[i] = FieldDef::new(NAMES[i], FieldType::Bool);
                i += 1;
            }
            fields
        };
        let layout = RecordLayout::new("WideFlags", &FIELDS);
        layout.validate().unwrap();
    }

    #[test]
    fn layout_over_field_cap_is_rejected() {
        static FIELDS: [FieldDef; MAX_FIELDS + 1] = {
            let mut fields = [FieldDef::new("", FieldType::Bool); MAX_FIELDS + 1];
            // Names are never compared before the count check fires.
            fields[0] = FieldDef::new("first", FieldType::Bool);
            fields
        };
        let layout = RecordLayout::new("TooWide", &FIELDS);
        let err = layout.validate().unwrap_err();
        assert!(matches!(
            err,
            LayoutError::TooManyFields {
                record: "TooWide",
                count: 33,
                max: MAX_FIELDS,
            }
        ));
    }

    #[test]
    fn layout_rejects_duplicate_field_names() {
        const FIELDS: [FieldDef; 2] = [
            FieldDef::new("hp", FieldType::U16),
            FieldDef::new("hp", FieldType::U8),
        ];
        let layout = RecordLayout::new("Health", &FIELDS);
        let err = layout.validate().unwrap_err();
        assert!(matches!(
            err,
            LayoutError::DuplicateFieldName {
                record: "Health",
                field: "hp",
            }
        ));
    }
}
