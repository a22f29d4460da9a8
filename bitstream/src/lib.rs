//! Low-level bit packing primitives for the ghostline codec.
//!
//! This crate provides [`BitWriter`] and [`BitReader`] for bit-level encoding
//! and decoding, plus the shared [`CompressionModel`] used to pack small
//! integer deltas into variable-length bit sequences.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads/writes are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about ghosts, fields, or ticks.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter, CompressionModel};
//!
//! let model = CompressionModel::default();
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_packed_i32_delta(12, 10, &model).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_packed_i32_delta(10, &model).unwrap(), 12);
//! ```

mod error;
mod model;
mod packed;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use model::{
    CompressionModel, BUCKET_COUNT, BUCKET_OFFSETS, BUCKET_SIZES, DEFAULT_CODE_LENGTHS,
    MAX_CODE_LEN,
};
pub use packed::{zigzag_decode, zigzag_encode};
pub use reader::BitReader;
pub use writer::BitWriter;

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
    fn multiple_bits_roundtrip() {
        let mut writer = BitWriter::new();
        for bit in [true, false, true, true, false] {
            writer.write_bit(bit);
        }
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        for bit in [true, false, true, true, false] {
            assert_eq!(reader.read_bit().unwrap(), bit);
        }
    }

    #[test]
    fn mixed_raw_and_packed_roundtrip() {
        let model = CompressionModel::default();
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b1010, 4).unwrap();
        writer.write_packed_u32(300, &model).unwrap();
        writer.write_packed_i32(-7, &model).unwrap();
        writer.write_f32(0.5).unwrap();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
        assert_eq!(reader.read_packed_u32(&model).unwrap(), 300);
        assert_eq!(reader.read_packed_i32(&model).unwrap(), -7);
        assert_eq!(reader.read_f32().unwrap(), 0.5);
    }
}
