//! Packed integer and float encoding through a [`CompressionModel`].

use crate::error::BitResult;
use crate::model::{CompressionModel, BUCKET_OFFSETS, BUCKET_SIZES};
use crate::{BitReader, BitWriter};

/// Maps signed integers onto unsigned ones so small magnitudes stay small.
#[must_use]
pub const fn zigzag_encode(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode`].
#[must_use]
pub const fn zigzag_decode(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

impl BitWriter {
    /// Writes `value` as a bucket code followed by its in-bucket offset.
    pub fn write_packed_u32(&mut self, value: u32, model: &CompressionModel) -> BitResult<()> {
        let bucket = CompressionModel::bucket_for(value);
        self.write_bits(
            u64::from(model.code(bucket)),
            model.code_length(bucket),
        )?;
        self.write_bits(
            u64::from(value - BUCKET_OFFSETS[bucket]),
            BUCKET_SIZES[bucket],
        )
    }

    /// Writes a zigzag-encoded signed value.
    pub fn write_packed_i32(&mut self, value: i32, model: &CompressionModel) -> BitResult<()> {
        self.write_packed_u32(zigzag_encode(value), model)
    }

    /// Writes the wrapping difference `value - baseline` as a packed signed value.
    pub fn write_packed_i32_delta(
        &mut self,
        value: i32,
        baseline: i32,
        model: &CompressionModel,
    ) -> BitResult<()> {
        self.write_packed_i32(value.wrapping_sub(baseline), model)
    }

    /// Writes the wrapping difference `value - baseline` as a packed signed value.
    pub fn write_packed_u32_delta(
        &mut self,
        value: u32,
        baseline: u32,
        model: &CompressionModel,
    ) -> BitResult<()> {
        self.write_packed_i32(value.wrapping_sub(baseline) as i32, model)
    }

    /// Writes one bit when `value` is bit-identical to `baseline`, otherwise a
    /// set bit followed by the raw 32-bit pattern.
    pub fn write_packed_f32_delta(&mut self, value: f32, baseline: f32) -> BitResult<()> {
        if value.to_bits() == baseline.to_bits() {
            self.write_bit(false);
            return Ok(());
        }
        self.write_bit(true);
        self.write_bits(u64::from(value.to_bits()), 32)
    }

    /// Writes a raw IEEE-754 `f32`.
    pub fn write_f32(&mut self, value: f32) -> BitResult<()> {
        self.write_bits(u64::from(value.to_bits()), 32)
    }
}

impl BitReader<'_> {
    /// Reads a value written by [`BitWriter::write_packed_u32`].
    pub fn read_packed_u32(&mut self, model: &CompressionModel) -> BitResult<u32> {
        let bucket = model.decode_bucket(self)?;
        let offset = self.read_bits(BUCKET_SIZES[bucket])?;
        // The last bucket spans the tail of the u32 range; wrap rather than
        // panic on a hostile offset.
        Ok(BUCKET_OFFSETS[bucket].wrapping_add(offset as u32))
    }

    /// Reads a value written by [`BitWriter::write_packed_i32`].
    pub fn read_packed_i32(&mut self, model: &CompressionModel) -> BitResult<i32> {
        Ok(zigzag_decode(self.read_packed_u32(model)?))
    }

    /// Reads a value written by [`BitWriter::write_packed_i32_delta`].
    pub fn read_packed_i32_delta(
        &mut self,
        baseline: i32,
        model: &CompressionModel,
    ) -> BitResult<i32> {
        Ok(baseline.wrapping_add(self.read_packed_i32(model)?))
    }

    /// Reads a value written by [`BitWriter::write_packed_u32_delta`].
    pub fn read_packed_u32_delta(
        &mut self,
        baseline: u32,
        model: &CompressionModel,
    ) -> BitResult<u32> {
        Ok(baseline.wrapping_add(self.read_packed_i32(model)? as u32))
    }

    /// Reads a value written by [`BitWriter::write_packed_f32_delta`].
    pub fn read_packed_f32_delta(&mut self, baseline: f32) -> BitResult<f32> {
        if !self.read_bit()? {
            return Ok(baseline);
        }
        self.read_f32()
    }

    /// Reads a raw IEEE-754 `f32`.
    pub fn read_f32(&mut self) -> BitResult<f32> {
        Ok(f32::from_bits(self.read_bits(32)? as u32))
    }
}
