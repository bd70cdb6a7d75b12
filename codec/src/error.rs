//! Error types for codec construction and execution.

use std::fmt;

use bitstream::BitError;
use layout::LayoutError;

/// Result type for build-phase operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors that abort codec construction or registration.
///
/// All of these are fatal: the record set is wrong and no wire traffic
/// should be attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The record layout violates a structural invariant.
    Layout(LayoutError),

    /// A composite field references a serializer that was never registered.
    MissingSerializer {
        /// The record declaring the field.
        record: &'static str,
        /// The field name.
        field: &'static str,
        /// The unregistered composite type name.
        composite: &'static str,
    },

    /// A composite declares another composite among its sub-fields.
    ///
    /// Only single-level nesting is supported.
    NestedComposite {
        /// The offending composite type name.
        composite: &'static str,
        /// The sub-field that is itself a composite.
        field: &'static str,
    },

    /// The same composite serializer was registered twice.
    DuplicateSerializer {
        /// The composite type name.
        composite: &'static str,
    },

    /// The same record type was registered twice.
    DuplicateRecord {
        /// The record type name.
        record: &'static str,
    },

    /// More records were registered than the id space can address.
    IdSpaceExhausted {
        /// Maximum number of assignable ids.
        max: u32,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(e) => write!(f, "invalid record layout: {e}"),
            Self::MissingSerializer {
                record,
                field,
                composite,
            } => {
                write!(
                    f,
                    "record {record} field {field} needs a serializer for {composite}, none registered"
                )
            }
            Self::NestedComposite { composite, field } => {
                write!(
                    f,
                    "composite {composite} nests composite field {field}; only single-level nesting is supported"
                )
            }
            Self::DuplicateSerializer { composite } => {
                write!(f, "serializer for {composite} registered twice")
            }
            Self::DuplicateRecord { record } => {
                write!(f, "record {record} registered twice")
            }
            Self::IdSpaceExhausted { max } => {
                write!(f, "type-id space exhausted, maximum is {max} records")
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for BuildError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

/// Result type for runtime codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors surfaced by the generated routines at runtime.
///
/// Stream errors are propagated from the bit port untranslated. The other
/// variants indicate a record or composite implementation that disagrees
/// with its declared layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Bit-port error.
    Bit(BitError),

    /// A record's field access disagreed with its declared layout.
    FieldMismatch {
        /// The record type name.
        record: &'static str,
        /// The field name.
        field: &'static str,
    },

    /// A composite value failed to downcast to its registered type.
    CompositeType {
        /// The composite type name.
        composite: &'static str,
    },

    /// The record type was never registered.
    UnregisteredRecord {
        /// The record type name.
        record: &'static str,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit(e) => write!(f, "bit port error: {e}"),
            Self::FieldMismatch { record, field } => {
                write!(
                    f,
                    "record {record} field {field} disagrees with its declared layout"
                )
            }
            Self::CompositeType { composite } => {
                write!(f, "value is not a {composite}")
            }
            Self::UnregisteredRecord { record } => {
                write!(f, "record {record} is not registered")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BitError> for CodecError {
    fn from(err: BitError) -> Self {
        Self::Bit(err)
    }
}
