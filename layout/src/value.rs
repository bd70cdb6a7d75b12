//! Field access values and the record contract.

use std::any::Any;
use std::fmt;

use crate::record::RecordLayout;

/// A borrowed view of one record field, produced by [`Replicated::field`].
///
/// Enum fields surface their underlying discriminant; composite fields
/// surface a type-erased borrow that the engine hands to the registered
/// composite codec.
pub enum FieldRef<'a> {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    /// Underlying discriminant of an integer-backed enum.
    Enum(u32),
    /// Borrow of a composite value, downcast by its registered codec.
    Composite(&'a dyn Any),
}

impl fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::U8(v) => write!(f, "U8({v})"),
            Self::I8(v) => write!(f, "I8({v})"),
            Self::U16(v) => write!(f, "U16({v})"),
            Self::I16(v) => write!(f, "I16({v})"),
            Self::U32(v) => write!(f, "U32({v})"),
            Self::I32(v) => write!(f, "I32({v})"),
            Self::U64(v) => write!(f, "U64({v})"),
            Self::I64(v) => write!(f, "I64({v})"),
            Self::Enum(v) => write!(f, "Enum({v})"),
            Self::Composite(_) => write!(f, "Composite(..)"),
        }
    }
}

/// An owned field value, consumed by [`Replicated::set_field`].
pub enum FieldValue {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    /// Underlying discriminant of an integer-backed enum.
    Enum(u32),
    /// Boxed composite value, downcast by the receiving record.
    Composite(Box<dyn Any>),
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::U8(v) => write!(f, "U8({v})"),
            Self::I8(v) => write!(f, "I8({v})"),
            Self::U16(v) => write!(f, "U16({v})"),
            Self::I16(v) => write!(f, "I16({v})"),
            Self::U32(v) => write!(f, "U32({v})"),
            Self::I32(v) => write!(f, "I32({v})"),
            Self::U64(v) => write!(f, "U64({v})"),
            Self::I64(v) => write!(f, "I64({v})"),
            Self::Enum(v) => write!(f, "Enum({v})"),
            Self::Composite(_) => write!(f, "Composite(..)"),
        }
    }
}

/// Field-access contract for replicated record types.
///
/// Implementations expose the record's canonical layout and indexed access
/// to its fields. The engine borrows records for the duration of one call;
/// it never stores them.
///
/// Invariant: `field(i)` and `set_field(i, ..)` must agree with `layout()` —
/// index `i` addresses the `i`-th declared field and carries the variant
/// matching its declared [`FieldType`](crate::FieldType).
pub trait Replicated: Default + 'static {
    /// Returns the canonical declaration-order layout of this record.
    fn layout() -> RecordLayout;

    /// Returns a borrowed view of field `index`, or `None` if out of range.
    fn field(&self, index: usize) -> Option<FieldRef<'_>>;

    /// Stores `value` into field `index`.
    ///
    /// Out-of-range indices and mismatched variants are ignored.
    fn set_field(&mut self, index: usize, value: FieldValue);
}
