//! Property checks for the masked wire form and the difference mask.

use bitstream::{BitReader, BitResult, BitSink, BitSource, BitWriter};
use codec::{BitSerializer, RecordCodec, SerializerRegistry};
use layout::{FieldDef, FieldRef, FieldType, FieldValue, RecordLayout, Replicated};
use proptest::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Angles {
    pitch: i8,
    yaw: i8,
}

impl BitSerializer for Angles {
    const NAME: &'static str = "Angles";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("pitch", FieldType::I8),
        FieldDef::new("yaw", FieldType::I8),
    ];

    fn write(sink: &mut dyn BitSink, value: &Self) -> BitResult<()> {
        sink.write_bits(u32::from(value.pitch as u8), 8)?;
        sink.write_bits(u32::from(value.yaw as u8), 8)?;
        Ok(())
    }

    fn read(source: &mut dyn BitSource) -> BitResult<Self> {
        let pitch = source.read_bits(8)? as u8 as i8;
        let yaw = source.read_bits(8)? as u8 as i8;
        Ok(Self { pitch, yaw })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Probe {
    flag: bool,
    level: u8,
    delta: i16,
    mode: u32,
    aim: Angles,
}

const PROBE_FIELDS: usize = 5;

impl Replicated for Probe {
    fn layout() -> RecordLayout {
        const FIELDS: [FieldDef; PROBE_FIELDS] = [
            FieldDef::new("flag", FieldType::Bool),
            FieldDef::new("level", FieldType::U8),
            FieldDef::new("delta", FieldType::I16),
            FieldDef::new("mode", FieldType::enumeration(5)),
            FieldDef::new("aim", FieldType::composite("Angles")),
        ];
        RecordLayout::new("Probe", &FIELDS)
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::Bool(self.flag)),
            1 => Some(FieldRef::U8(self.level)),
            2 => Some(FieldRef::I16(self.delta)),
            3 => Some(FieldRef::Enum(self.mode)),
            4 => Some(FieldRef::Composite(&self.aim)),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: FieldValue) {
        match (index, value) {
            (0, FieldValue::Bool(v)) => self.flag = v,
            (1, FieldValue::U8(v)) => self.level = v,
            (2, FieldValue::I16(v)) => self.delta = v,
            (3, FieldValue::Enum(v)) => self.mode = v,
            (4, FieldValue::Composite(boxed)) => {
                if let Ok(v) = boxed.downcast::<Angles>() {
                    self.aim = *v;
                }
            }
            _ => {}
        }
    }
}

fn probe_codec() -> RecordCodec {
    let mut serializers = SerializerRegistry::new();
    serializers.register::<Angles>().unwrap();
    RecordCodec::build(&Probe::layout(), &serializers).unwrap()
}

fn probe_strategy() -> impl Strategy<Value = Probe> {
    (
        any::<bool>(),
        any::<u8>(),
        any::<i16>(),
        0u32..5,
        any::<i8>(),
        any::<i8>(),
    )
        .prop_map(|(flag, level, delta, mode, pitch, yaw)| Probe {
            flag,
            level,
            delta,
            mode,
            aim: Angles { pitch, yaw },
        })
}

proptest! {
    #[test]
    fn prop_full_roundtrip(value in probe_strategy()) {
        let codec = probe_codec();

        let mut writer = BitWriter::new();
        codec.serialize_full(&mut writer, &value).unwrap();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let decoded: Probe = codec.deserialize_full(&mut reader).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn prop_masked_roundtrip_merges_fields(
        current in probe_strategy(),
        previous in probe_strategy(),
        mask in 0u32..(1 << PROBE_FIELDS),
    ) {
        let codec = probe_codec();

        let mut writer = BitWriter::new();
        codec.serialize_masked(&mut writer, &current, mask).unwrap();
        let bytes = writer.finish();

        let mut merged = previous;
        let mut reader = BitReader::new(&bytes);
        let returned = codec.deserialize_masked_into(&mut reader, &mut merged).unwrap();
        prop_assert_eq!(returned, mask);

        for index in 0..PROBE_FIELDS {
            let source = if (mask >> index) & 1 == 1 { &current } else { &previous };
            let expected_bit = codec.diff(&merged, source).unwrap() & (1 << index);
            prop_assert_eq!(expected_bit, 0, "field {} must come from the expected side", index);
        }
    }

    #[test]
    fn prop_diff_is_zero_iff_equal(a in probe_strategy(), b in probe_strategy()) {
        let codec = probe_codec();
        let mask = codec.diff(&a, &b).unwrap();
        prop_assert_eq!(mask == 0, a == b);
        prop_assert_eq!(codec.diff(&a, &a).unwrap(), 0);
    }

    #[test]
    fn prop_diff_then_masked_apply_converges(a in probe_strategy(), b in probe_strategy()) {
        let codec = probe_codec();
        let mask = codec.diff(&a, &b).unwrap();

        let mut writer = BitWriter::new();
        codec.serialize_masked(&mut writer, &b, mask).unwrap();
        let bytes = writer.finish();

        let mut target = a;
        let mut reader = BitReader::new(&bytes);
        let applied = codec.deserialize_masked_into(&mut reader, &mut target).unwrap();
        prop_assert_eq!(applied, mask);
        prop_assert_eq!(target, b);
    }

    #[test]
    fn prop_full_width_matches_bits_written(value in probe_strategy()) {
        let codec = probe_codec();
        let mut writer = BitWriter::new();
        codec.serialize_full(&mut writer, &value).unwrap();
        // bool(1) + u8(8) + i16(16) + enum5(3) + Angles(16)
        prop_assert_eq!(writer.bits_written(), 1 + 8 + 16 + 3 + 16);
    }
}
