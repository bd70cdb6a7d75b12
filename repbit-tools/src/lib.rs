//! Introspection and debugging tools for the repbit codec.
//!
//! This crate provides utilities for inspecting the generated record set:
//!
//! - Emit the type-id assignment table both endpoints must share
//! - Decode a record's full-form payload into structured JSON
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use anyhow::{anyhow, bail, Context, Result};
use bitstream::BitReader;
use codec::Registry;
use demo_types::{ComponentStore, MoveInput, OrbState, PingEvent, PlayerState, TurretState};
use layout::Replicated;
use serde::Serialize;

/// One row of the id assignment table.
#[derive(Debug, Clone, Serialize)]
pub struct IdRow {
    pub id: u16,
    pub role: &'static str,
    pub record: &'static str,
    pub fields: usize,
    /// Exact full-form width in bits, absent for records with opaque
    /// composites.
    pub full_width_bits: Option<u32>,
}

/// Collects the assignment table of `registry` in id order.
#[must_use]
pub fn id_table(registry: &Registry<ComponentStore>) -> Vec<IdRow> {
    registry
        .entries()
        .iter()
        .map(|entry| IdRow {
            id: entry.id(),
            role: entry.role().name(),
            record: entry.type_name(),
            fields: entry.codec().field_count(),
            full_width_bits: entry.codec().full_width_bits(),
        })
        .collect()
}

/// Formats the assignment table as aligned text.
#[must_use]
pub fn format_id_table(rows: &[IdRow]) -> String {
    let mut out = String::from("id  role       record        fields  width\n");
    for row in rows {
        let width = row
            .full_width_bits
            .map_or_else(|| "opaque".to_string(), |bits| format!("{bits} bits"));
        out.push_str(&format!(
            "{:<3} {:<10} {:<13} {:<7} {width}\n",
            row.id, row.role, row.record, row.fields
        ));
    }
    out
}

/// Decodes a full-form payload of the named demo record into JSON.
///
/// # Errors
///
/// Fails for unknown record names and for payloads the codec rejects.
pub fn decode_record_json(
    registry: &Registry<ComponentStore>,
    record: &str,
    bytes: &[u8],
) -> Result<serde_json::Value> {
    match record {
        "PlayerState" => decode_as::<PlayerState>(registry, bytes),
        "OrbState" => decode_as::<OrbState>(registry, bytes),
        "TurretState" => decode_as::<TurretState>(registry, bytes),
        "MoveInput" => decode_as::<MoveInput>(registry, bytes),
        "PingEvent" => decode_as::<PingEvent>(registry, bytes),
        other => Err(anyhow!("unknown record {other}")),
    }
}

fn decode_as<T: Replicated + Serialize>(
    registry: &Registry<ComponentStore>,
    bytes: &[u8],
) -> Result<serde_json::Value> {
    let mut reader = BitReader::new(bytes);
    let value: T = registry
        .deserialize_full(&mut reader)
        .with_context(|| format!("decode {}", T::layout().type_name))?;
    let json = serde_json::json!({
        "record": T::layout().type_name,
        "bits_consumed": reader.bit_position(),
        "value": value,
    });
    Ok(json)
}

/// Parses a hex string (whitespace tolerated) into bytes.
///
/// # Errors
///
/// Fails on odd digit counts and non-hex characters.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0]
                .to_digit(16)
                .ok_or_else(|| anyhow!("invalid hex digit {:?}", pair[0]))?;
            let lo = pair[1]
                .to_digit(16)
                .ok_or_else(|| anyhow!("invalid hex digit {:?}", pair[1]))?;
            Ok((hi * 16 + lo) as u8)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::BitWriter;
    use demo_types::{demo_registry, Stance, Vec3Q};

    #[test]
    fn id_table_lists_every_record() {
        let registry = demo_registry().unwrap();
        let rows = id_table(&registry);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].record, "PlayerState");
        assert_eq!(rows[0].role, "predicted");
        assert_eq!(rows[0].full_width_bits, None, "composite is opaque");
        assert_eq!(rows[1].full_width_bits, Some(16 + 8 + 1));
        assert_eq!(rows[4].record, "PingEvent");
        assert_eq!(rows[4].role, "event");
    }

    #[test]
    fn formatted_table_mentions_every_row() {
        let registry = demo_registry().unwrap();
        let text = format_id_table(&id_table(&registry));
        for name in [
            "PlayerState",
            "OrbState",
            "TurretState",
            "MoveInput",
            "PingEvent",
        ] {
            assert!(text.contains(name), "table should list {name}");
        }
        assert!(text.contains("opaque"));
    }

    #[test]
    fn decode_round_trips_through_json() {
        let registry = demo_registry().unwrap();
        let value = PlayerState {
            energy: -3,
            stance: Stance::Running,
            position: Vec3Q { x: 1, y: 2, z: 3 },
        };

        let mut writer = BitWriter::new();
        registry.serialize_full(&mut writer, &value).unwrap();
        let bytes = writer.finish();

        let json = decode_record_json(&registry, "PlayerState", &bytes).unwrap();
        assert_eq!(json["record"], "PlayerState");
        assert_eq!(json["value"]["energy"], -3);
        assert_eq!(json["value"]["stance"], "Running");
        assert_eq!(json["value"]["position"]["y"], 2);
    }

    #[test]
    fn decode_rejects_unknown_record() {
        let registry = demo_registry().unwrap();
        let err = decode_record_json(&registry, "Nope", &[]).unwrap_err();
        assert!(err.to_string().contains("Nope"));
    }

    #[test]
    fn parse_hex_accepts_spaced_pairs() {
        assert_eq!(parse_hex("ff 00 A5").unwrap(), vec![0xFF, 0x00, 0xA5]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn parse_hex_rejects_bad_input() {
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }
}
