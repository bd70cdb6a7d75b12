//! Low-level bit packing primitives for the repbit codec.
//!
//! This crate provides the bit-port contract consumed by the codec engine —
//! the [`BitSink`] and [`BitSource`] traits — together with the concrete
//! [`BitWriter`] and [`BitReader`] used by tests, tools, and demos.
//!
//! Bits are packed MSB-first and tightly across byte boundaries; the final
//! byte of a finished buffer is zero-padded on the right. Message framing is
//! a caller concern: this crate knows nothing about records, masks, or ids.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitSink, BitSource, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_bits(42, 7).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;

/// Maximum number of bits a single port operation may move.
pub const MAX_BITS_PER_OP: u32 = 32;

/// Write side of the bit port.
///
/// Values wider than 32 bits are the caller's problem: the codec engine
/// splits 64-bit fields into two 32-bit operations.
pub trait BitSink {
    /// Writes the low `bits` bits of `value`, MSB-first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 32`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    fn write_bits(&mut self, value: u32, bits: u32) -> BitResult<()>;
}

/// Read side of the bit port.
pub trait BitSource {
    /// Reads `bits` bits, MSB-first, zero-extended into a `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 32`.
    /// Returns [`BitError::UnexpectedEof`] if insufficient bits remain.
    fn read_bits(&mut self, bits: u32) -> BitResult<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let writer = BitWriter::new();
        let bytes = writer.finish();
        assert!(bytes.is_empty());

        let reader = BitReader::new(&bytes);
        assert!(reader.is_empty());
    }

    #[test]
    fn single_bit_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
    }

    #[test]
    fn mixed_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b1010, 4).unwrap();
        writer.write_bit(false);
        writer.write_bits(0xFF, 8).unwrap();
        writer.write_bits(42, 7).unwrap();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
        assert_eq!(reader.read_bits(7).unwrap(), 42);
    }

    #[test]
    fn port_traits_are_object_safe() {
        let mut writer = BitWriter::new();
        {
            let sink: &mut dyn BitSink = &mut writer;
            sink.write_bits(0xAB, 8).unwrap();
        }
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let source: &mut dyn BitSource = &mut reader;
        assert_eq!(source.read_bits(8).unwrap(), 0xAB);
    }
}
