//! Layout validation errors.

use std::fmt;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors that can occur when validating a record layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Record declares more fields than a change mask can address.
    TooManyFields {
        /// The offending record type.
        record: &'static str,
        /// Declared field count.
        count: usize,
        /// Maximum supported field count.
        max: usize,
    },

    /// Two fields of the same record share a name.
    DuplicateFieldName {
        /// The offending record type.
        record: &'static str,
        /// The duplicated field name.
        field: &'static str,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyFields { record, count, max } => {
                write!(
                    f,
                    "record {record} declares {count} fields, maximum is {max}"
                )
            }
            Self::DuplicateFieldName { record, field } => {
                write!(f, "record {record} declares field {field} more than once")
            }
        }
    }
}

impl std::error::Error for LayoutError {}
