//! Externally supplied codecs for composite field types.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use bitstream::{BitResult, BitSink, BitSource};
use layout::{FieldDef, FieldValue};

use crate::error::{BuildError, BuildResult, CodecError, CodecResult};

/// A user-supplied bit codec for a composite value type.
///
/// Composites appear as single fields inside records; their wire format is
/// entirely this codec's business. `FIELDS` declares the composite's own
/// primitive sub-layout so that nesting violations are caught when the
/// serializer is registered, before any record referencing it is built.
pub trait BitSerializer: PartialEq + Sized + 'static {
    /// Name the serializer is registered under; composite fields reference it.
    const NAME: &'static str;

    /// The composite's own sub-fields. Must not contain composites.
    const FIELDS: &'static [FieldDef];

    /// Writes `value` to the bit port.
    ///
    /// # Errors
    ///
    /// Propagates port errors.
    fn write(sink: &mut dyn BitSink, value: &Self) -> BitResult<()>;

    /// Reads a value from the bit port.
    ///
    /// # Errors
    ///
    /// Propagates port errors.
    fn read(source: &mut dyn BitSource) -> BitResult<Self>;
}

/// A resolved, type-erased composite codec entry.
#[derive(Clone, Copy)]
pub struct CompositeCodec {
    type_name: &'static str,
    fields: &'static [FieldDef],
    write: fn(&mut dyn BitSink, &dyn Any) -> CodecResult<()>,
    read: fn(&mut dyn BitSource) -> CodecResult<FieldValue>,
    eq: fn(&dyn Any, &dyn Any) -> CodecResult<bool>,
}

impl CompositeCodec {
    fn of<C: BitSerializer>() -> Self {
        Self {
            type_name: C::NAME,
            fields: C::FIELDS,
            write: write_erased::<C>,
            read: read_erased::<C>,
            eq: eq_erased::<C>,
        }
    }

    /// Returns the registered composite type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the composite's declared sub-fields.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub(crate) fn write_value(&self, sink: &mut dyn BitSink, value: &dyn Any) -> CodecResult<()> {
        (self.write)(sink, value)
    }

    pub(crate) fn read_value(&self, source: &mut dyn BitSource) -> CodecResult<FieldValue> {
        (self.read)(source)
    }

    pub(crate) fn values_eq(&self, a: &dyn Any, b: &dyn Any) -> CodecResult<bool> {
        (self.eq)(a, b)
    }
}

impl fmt::Debug for CompositeCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeCodec")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.len())
            .finish()
    }
}

fn write_erased<C: BitSerializer>(sink: &mut dyn BitSink, value: &dyn Any) -> CodecResult<()> {
    let value = value
        .downcast_ref::<C>()
        .ok_or(CodecError::CompositeType { composite: C::NAME })?;
    C::write(sink, value)?;
    Ok(())
}

fn read_erased<C: BitSerializer>(source: &mut dyn BitSource) -> CodecResult<FieldValue> {
    let value = C::read(source)?;
    Ok(FieldValue::Composite(Box::new(value)))
}

fn eq_erased<C: BitSerializer>(a: &dyn Any, b: &dyn Any) -> CodecResult<bool> {
    match (a.downcast_ref::<C>(), b.downcast_ref::<C>()) {
        (Some(a), Some(b)) => Ok(a == b),
        _ => Err(CodecError::CompositeType { composite: C::NAME }),
    }
}

/// Registry of composite serializers, keyed by type name.
#[derive(Debug, Default)]
pub struct SerializerRegistry {
    by_name: HashMap<&'static str, CompositeCodec>,
}

impl SerializerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the serializer for `C` under [`BitSerializer::NAME`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NestedComposite`] if `C` declares a composite
    /// sub-field, or [`BuildError::DuplicateSerializer`] if the name is
    /// already taken.
    pub fn register<C: BitSerializer>(&mut self) -> BuildResult<()> {
        if let Some(field) = C::FIELDS.iter().find(|f| f.ty.is_composite()) {
            return Err(BuildError::NestedComposite {
                composite: C::NAME,
                field: field.name,
            });
        }
        if self.by_name.contains_key(C::NAME) {
            return Err(BuildError::DuplicateSerializer { composite: C::NAME });
        }
        self.by_name.insert(C::NAME, CompositeCodec::of::<C>());
        Ok(())
    }

    /// Looks up a registered codec by composite type name.
    #[must_use]
    pub fn lookup(&self, type_name: &str) -> Option<&CompositeCodec> {
        self.by_name.get(type_name)
    }

    /// Returns the number of registered serializers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if no serializer has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::{BitReader, BitWriter};
    use layout::FieldType;

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    struct Pair {
        x: i16,
        y: i16,
    }

    impl BitSerializer for Pair {
        const NAME: &'static str = "Pair";
        const FIELDS: &'static [FieldDef] = &[
            FieldDef::new("x", FieldType::I16),
            FieldDef::new("y", FieldType::I16),
        ];

        fn write(sink: &mut dyn BitSink, value: &Self) -> BitResult<()> {
            sink.write_bits(u32::from(value.x as u16), 16)?;
            sink.write_bits(u32::from(value.y as u16), 16)?;
            Ok(())
        }

        fn read(source: &mut dyn BitSource) -> BitResult<Self> {
            let x = source.read_bits(16)? as u16 as i16;
            let y = source.read_bits(16)? as u16 as i16;
            Ok(Self { x, y })
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Nested;

    impl BitSerializer for Nested {
        const NAME: &'static str = "Nested";
        const FIELDS: &'static [FieldDef] =
            &[FieldDef::new("inner", FieldType::composite("Pair"))];

        fn write(_: &mut dyn BitSink, _: &Self) -> BitResult<()> {
            Ok(())
        }

        fn read(_: &mut dyn BitSource) -> BitResult<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = SerializerRegistry::new();
        registry.register::<Pair>().unwrap();
        assert_eq!(registry.len(), 1);

        let codec = registry.lookup("Pair").unwrap();
        assert_eq!(codec.type_name(), "Pair");
        assert_eq!(codec.fields().len(), 2);
        assert!(registry.lookup("Missing").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = SerializerRegistry::new();
        registry.register::<Pair>().unwrap();
        let err = registry.register::<Pair>().unwrap_err();
        assert!(matches!(
            err,
            BuildError::DuplicateSerializer { composite: "Pair" }
        ));
    }

    #[test]
    fn nested_composite_is_rejected() {
        let mut registry = SerializerRegistry::new();
        let err = registry.register::<Nested>().unwrap_err();
        assert!(matches!(
            err,
            BuildError::NestedComposite {
                composite: "Nested",
                field: "inner",
            }
        ));
    }

    #[test]
    fn erased_roundtrip_preserves_value() {
        let mut registry = SerializerRegistry::new();
        registry.register::<Pair>().unwrap();
        let codec = *registry.lookup("Pair").unwrap();

        let value = Pair { x: 1, y: -2 };
        let mut writer = BitWriter::new();
        codec.write_value(&mut writer, &value).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 4);

        let mut reader = BitReader::new(&bytes);
        let read_back = codec.read_value(&mut reader).unwrap();
        match read_back {
            FieldValue::Composite(boxed) => {
                assert_eq!(*boxed.downcast::<Pair>().unwrap(), value);
            }
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn erased_eq_compares_by_value() {
        let mut registry = SerializerRegistry::new();
        registry.register::<Pair>().unwrap();
        let codec = *registry.lookup("Pair").unwrap();

        let a = Pair { x: 1, y: 2 };
        let b = Pair { x: 1, y: 2 };
        let c = Pair { x: 1, y: 3 };
        assert!(codec.values_eq(&a, &b).unwrap());
        assert!(!codec.values_eq(&a, &c).unwrap());
    }

    #[test]
    fn erased_eq_rejects_foreign_values() {
        let mut registry = SerializerRegistry::new();
        registry.register::<Pair>().unwrap();
        let codec = *registry.lookup("Pair").unwrap();

        let a = Pair { x: 1, y: 2 };
        let not_a_pair = 7u32;
        let err = codec.values_eq(&a, &not_a_pair).unwrap_err();
        assert!(matches!(
            err,
            CodecError::CompositeType { composite: "Pair" }
        ));
    }
}
