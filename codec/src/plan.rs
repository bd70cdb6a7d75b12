//! Per-record codec construction and the generated routines.
//!
//! [`RecordCodec::build`] is the build phase for one record: it classifies
//! every field, resolves wire widths and composite serializers, and produces
//! a compiled field plan. The plan then drives the full/masked
//! serialize/deserialize routines and the difference mask, all of which
//! borrow the record for the duration of a single call.

use bitstream::{BitSink, BitSource};
use layout::{bits_for_enum, FieldRef, FieldType, FieldValue, RecordLayout, Replicated};

use crate::error::{BuildError, BuildResult, CodecError, CodecResult};
use crate::serializers::{CompositeCodec, SerializerRegistry};

/// Compiled wire operation for one field.
#[derive(Debug, Clone)]
enum FieldOp {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    Enum { bits: u32 },
    Composite { codec: CompositeCodec },
}

#[derive(Debug, Clone)]
struct PlannedField {
    name: &'static str,
    op: FieldOp,
}

/// The compiled codec for one record type.
///
/// Holds the bit-packing plan for every field in declaration order plus the
/// mask-prefix decision. All routines are generic over the record type; the
/// caller must pass the same type the plan was built from (the registry
/// pairs them).
#[derive(Debug, Clone)]
pub struct RecordCodec {
    type_name: &'static str,
    fields: Vec<PlannedField>,
    mask_bits: u32,
    full_width_bits: Option<u32>,
}

impl RecordCodec {
    /// Builds the codec for `layout`, resolving composite serializers.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Layout`] if the layout is structurally invalid
    /// and [`BuildError::MissingSerializer`] if a composite field references
    /// an unregistered serializer.
    pub fn build(layout: &RecordLayout, serializers: &SerializerRegistry) -> BuildResult<Self> {
        layout.validate()?;

        let mut fields = Vec::with_capacity(layout.fields.len());
        for def in layout.fields {
            let op = match def.ty {
                FieldType::Bool => FieldOp::Bool,
                FieldType::U8 => FieldOp::U8,
                FieldType::I8 => FieldOp::I8,
                FieldType::U16 => FieldOp::U16,
                FieldType::I16 => FieldOp::I16,
                FieldType::U32 => FieldOp::U32,
                FieldType::I32 => FieldOp::I32,
                FieldType::U64 => FieldOp::U64,
                FieldType::I64 => FieldOp::I64,
                FieldType::Enum { variants } => FieldOp::Enum {
                    bits: bits_for_enum(variants),
                },
                FieldType::Composite { type_name } => {
                    let codec =
                        serializers
                            .lookup(type_name)
                            .ok_or(BuildError::MissingSerializer {
                                record: layout.type_name,
                                field: def.name,
                                composite: type_name,
                            })?;
                    FieldOp::Composite { codec: *codec }
                }
            };
            fields.push(PlannedField {
                name: def.name,
                op,
            });
        }

        // A single field is always present; only multi-field records carry
        // a mask prefix.
        let mask_bits = if fields.len() > 1 {
            fields.len() as u32
        } else {
            0
        };

        let full_width_bits = layout
            .fields
            .iter()
            .fold(Some(0u32), |total, def| Some(total? + def.ty.wire_bits()?));

        Ok(Self {
            type_name: layout.type_name,
            fields,
            mask_bits,
            full_width_bits,
        })
    }

    /// Returns the record type name the codec was built from.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the number of fields in the plan.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Returns the width of the mask prefix in masked form (0 or N).
    #[must_use]
    pub const fn mask_bits(&self) -> u32 {
        self.mask_bits
    }

    /// Returns the exact full-form wire width, or `None` if any field is an
    /// opaque composite.
    #[must_use]
    pub const fn full_width_bits(&self) -> Option<u32> {
        self.full_width_bits
    }

    /// Writes every field of `value` in declaration order.
    ///
    /// # Errors
    ///
    /// Propagates port errors; returns [`CodecError::FieldMismatch`] if the
    /// record's field access disagrees with its layout.
    pub fn serialize_full<T: Replicated>(
        &self,
        sink: &mut dyn BitSink,
        value: &T,
    ) -> CodecResult<()> {
        for (index, field) in self.fields.iter().enumerate() {
            self.write_field(sink, value, index, field)?;
        }
        Ok(())
    }

    /// Writes the fields of `value` selected by `mask`.
    ///
    /// Multi-field records carry an N-bit mask prefix first; bit `i` selects
    /// field `i`. Mask bits at or above the field count are cleared before
    /// sending. A single-field record carries no prefix and the field is
    /// always written; a zero-field record writes nothing.
    ///
    /// # Errors
    ///
    /// Same as [`serialize_full`](Self::serialize_full).
    pub fn serialize_masked<T: Replicated>(
        &self,
        sink: &mut dyn BitSink,
        value: &T,
        mask: u32,
    ) -> CodecResult<()> {
        let mask = mask & self.mask_limit();
        if self.mask_bits > 0 {
            sink.write_bits(mask, self.mask_bits)?;
        }
        for (index, field) in self.fields.iter().enumerate() {
            if self.mask_bits > 0 && (mask >> index) & 1 == 0 {
                continue;
            }
            self.write_field(sink, value, index, field)?;
        }
        Ok(())
    }

    /// Reads a new value, every field in declaration order.
    ///
    /// # Errors
    ///
    /// Same as [`serialize_full`](Self::serialize_full).
    pub fn deserialize_full<T: Replicated>(&self, source: &mut dyn BitSource) -> CodecResult<T> {
        let mut value = T::default();
        self.deserialize_full_into(source, &mut value)?;
        Ok(value)
    }

    /// Reads every field in declaration order into a borrowed target.
    ///
    /// # Errors
    ///
    /// Same as [`serialize_full`](Self::serialize_full).
    pub fn deserialize_full_into<T: Replicated>(
        &self,
        source: &mut dyn BitSource,
        target: &mut T,
    ) -> CodecResult<()> {
        for (index, field) in self.fields.iter().enumerate() {
            let value = read_field(source, field)?;
            target.set_field(index, value);
        }
        Ok(())
    }

    /// Reads a masked form into a borrowed target and returns the mask.
    ///
    /// Multi-field records read the N-bit mask prefix; a single-field record
    /// reads its field unconditionally and reports mask 1; a zero-field
    /// record reads nothing and reports mask 0.
    ///
    /// # Errors
    ///
    /// Same as [`serialize_full`](Self::serialize_full).
    pub fn deserialize_masked_into<T: Replicated>(
        &self,
        source: &mut dyn BitSource,
        target: &mut T,
    ) -> CodecResult<u32> {
        let mask = if self.mask_bits > 0 {
            source.read_bits(self.mask_bits)?
        } else if self.fields.len() == 1 {
            1
        } else {
            0
        };

        for (index, field) in self.fields.iter().enumerate() {
            if self.mask_bits > 0 && (mask >> index) & 1 == 0 {
                continue;
            }
            let value = read_field(source, field)?;
            target.set_field(index, value);
        }
        Ok(mask)
    }

    /// Compares `a` and `b` fieldwise and returns the difference mask.
    ///
    /// Bit `i` is set iff field `i` differs. Composites compare by value one
    /// level deep via their registered codec.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FieldMismatch`] if either record's field access
    /// disagrees with the layout.
    pub fn diff<T: Replicated>(&self, a: &T, b: &T) -> CodecResult<u32> {
        let mut mask = 0u32;
        for (index, field) in self.fields.iter().enumerate() {
            let (Some(left), Some(right)) = (a.field(index), b.field(index)) else {
                return Err(self.mismatch(field));
            };
            let equal = match (&field.op, left, right) {
                (FieldOp::Bool, FieldRef::Bool(x), FieldRef::Bool(y)) => x == y,
                (FieldOp::U8, FieldRef::U8(x), FieldRef::U8(y)) => x == y,
                (FieldOp::I8, FieldRef::I8(x), FieldRef::I8(y)) => x == y,
                (FieldOp::U16, FieldRef::U16(x), FieldRef::U16(y)) => x == y,
                (FieldOp::I16, FieldRef::I16(x), FieldRef::I16(y)) => x == y,
                (FieldOp::U32, FieldRef::U32(x), FieldRef::U32(y)) => x == y,
                (FieldOp::I32, FieldRef::I32(x), FieldRef::I32(y)) => x == y,
                (FieldOp::U64, FieldRef::U64(x), FieldRef::U64(y)) => x == y,
                (FieldOp::I64, FieldRef::I64(x), FieldRef::I64(y)) => x == y,
                (FieldOp::Enum { .. }, FieldRef::Enum(x), FieldRef::Enum(y)) => x == y,
                (FieldOp::Composite { codec }, FieldRef::Composite(x), FieldRef::Composite(y)) => {
                    codec.values_eq(x, y)?
                }
                _ => return Err(self.mismatch(field)),
            };
            if !equal {
                mask |= 1 << index;
            }
        }
        Ok(mask)
    }

    fn write_field<T: Replicated>(
        &self,
        sink: &mut dyn BitSink,
        value: &T,
        index: usize,
        field: &PlannedField,
    ) -> CodecResult<()> {
        let Some(view) = value.field(index) else {
            return Err(self.mismatch(field));
        };
        match (&field.op, view) {
            (FieldOp::Bool, FieldRef::Bool(v)) => sink.write_bits(u32::from(v), 1)?,
            (FieldOp::U8, FieldRef::U8(v)) => sink.write_bits(u32::from(v), 8)?,
            (FieldOp::I8, FieldRef::I8(v)) => sink.write_bits(u32::from(v as u8), 8)?,
            (FieldOp::U16, FieldRef::U16(v)) => sink.write_bits(u32::from(v), 16)?,
            (FieldOp::I16, FieldRef::I16(v)) => sink.write_bits(u32::from(v as u16), 16)?,
            (FieldOp::U32, FieldRef::U32(v)) => sink.write_bits(v, 32)?,
            (FieldOp::I32, FieldRef::I32(v)) => sink.write_bits(v as u32, 32)?,
            (FieldOp::U64, FieldRef::U64(v)) => write_u64(sink, v)?,
            (FieldOp::I64, FieldRef::I64(v)) => write_u64(sink, v as u64)?,
            (FieldOp::Enum { bits }, FieldRef::Enum(v)) => {
                if *bits > 0 {
                    sink.write_bits(truncate(v, *bits), *bits)?;
                }
            }
            (FieldOp::Composite { codec }, FieldRef::Composite(v)) => {
                codec.write_value(sink, v)?;
            }
            _ => return Err(self.mismatch(field)),
        }
        Ok(())
    }

    /// Low N bits of the mask address fields; everything above is undefined
    /// on the wire and must not be sent.
    fn mask_limit(&self) -> u32 {
        let n = self.fields.len();
        if n >= 32 {
            u32::MAX
        } else {
            (1u32 << n) - 1
        }
    }

    fn mismatch(&self, field: &PlannedField) -> CodecError {
        CodecError::FieldMismatch {
            record: self.type_name,
            field: field.name,
        }
    }
}

/// 64-bit values ride the 32-bit port as two halves, high word first.
fn write_u64(sink: &mut dyn BitSink, value: u64) -> CodecResult<()> {
    sink.write_bits((value >> 32) as u32, 32)?;
    sink.write_bits(value as u32, 32)?;
    Ok(())
}

fn read_u64(source: &mut dyn BitSource) -> CodecResult<u64> {
    let hi = source.read_bits(32)?;
    let lo = source.read_bits(32)?;
    Ok((u64::from(hi) << 32) | u64::from(lo))
}

/// The write side truncates to the wire width; the read side places the low
/// bits without sign extension.
const fn truncate(value: u32, bits: u32) -> u32 {
    if bits >= 32 {
        value
    } else {
        value & ((1u32 << bits) - 1)
    }
}

fn read_field(source: &mut dyn BitSource, field: &PlannedField) -> CodecResult<FieldValue> {
    Ok(match &field.op {
        FieldOp::Bool => FieldValue::Bool(source.read_bits(1)? != 0),
        FieldOp::U8 => FieldValue::U8(source.read_bits(8)? as u8),
        FieldOp::I8 => FieldValue::I8(source.read_bits(8)? as u8 as i8),
        FieldOp::U16 => FieldValue::U16(source.read_bits(16)? as u16),
        FieldOp::I16 => FieldValue::I16(source.read_bits(16)? as u16 as i16),
        FieldOp::U32 => FieldValue::U32(source.read_bits(32)?),
        FieldOp::I32 => FieldValue::I32(source.read_bits(32)? as i32),
        FieldOp::U64 => FieldValue::U64(read_u64(source)?),
        FieldOp::I64 => FieldValue::I64(read_u64(source)? as i64),
        FieldOp::Enum { bits } => FieldValue::Enum(if *bits == 0 {
            0
        } else {
            source.read_bits(*bits)?
        }),
        FieldOp::Composite { codec } => codec.read_value(source)?,
    })
}
