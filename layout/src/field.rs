//! Field type and wire-width definitions.

/// The wire encoding of a single record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Boolean (1 bit).
    Bool,

    /// Unsigned 8-bit integer.
    U8,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 64-bit integer, carried as two 32-bit halves, high word first.
    U64,
    /// Signed 64-bit integer, carried as two 32-bit halves, high word first.
    I64,

    /// Integer-backed enumeration with a known variant count.
    Enum {
        /// Number of declared variants.
        variants: u32,
    },

    /// A user-defined composite serialized by an externally registered codec.
    ///
    /// Composites may not themselves contain composites.
    Composite {
        /// Name the codec was registered under.
        type_name: &'static str,
    },
}

impl FieldType {
    /// Creates an enum field type with the given variant count.
    #[must_use]
    pub const fn enumeration(variants: u32) -> Self {
        Self::Enum { variants }
    }

    /// Creates a composite field type referencing a registered serializer.
    #[must_use]
    pub const fn composite(type_name: &'static str) -> Self {
        Self::Composite { type_name }
    }

    /// Returns `true` for composite fields.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Composite { .. })
    }

    /// Returns the exact on-wire bit count, or `None` for composites whose
    /// width is delegated to their registered codec.
    #[must_use]
    pub const fn wire_bits(self) -> Option<u32> {
        match self {
            Self::Bool => Some(1),
            Self::U8 | Self::I8 => Some(8),
            Self::U16 | Self::I16 => Some(16),
            Self::U32 | Self::I32 => Some(32),
            Self::U64 | Self::I64 => Some(64),
            Self::Enum { variants } => Some(bits_for_enum(variants)),
            Self::Composite { .. } => None,
        }
    }
}

/// Returns the number of bits an enum of `variants` variants occupies.
///
/// Zero variants take zero bits, a single variant takes one bit, and
/// anything larger takes `ceil(log2(variants))` bits.
#[must_use]
pub const fn bits_for_enum(variants: u32) -> u32 {
    match variants {
        0 => 0,
        1 => 1,
        _ => 32 - (variants - 1).leading_zeros(),
    }
}

/// Field definition within a record, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name, for diagnostics and tool output.
    pub name: &'static str,
    /// Wire encoding.
    pub ty: FieldType,
}

impl FieldDef {
    /// Creates a field definition.
    #[must_use]
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}
