//! Bucketed prefix-code model for packing small integers.
//!
//! A `u32` is split into a bucket index and an offset inside the bucket. The
//! bucket index is written as a canonical prefix code (short codes for the
//! small buckets), followed by the offset in exactly `BUCKET_SIZES[bucket]`
//! raw bits. Values near zero therefore cost two or three bits.

use crate::error::{BitError, BitResult};

/// Number of buckets in the model.
pub const BUCKET_COUNT: usize = 16;

/// Longest prefix code accepted by [`CompressionModel::with_code_lengths`].
pub const MAX_CODE_LEN: u8 = 15;

/// Raw offset bits stored after each bucket code.
pub const BUCKET_SIZES: [u8; BUCKET_COUNT] =
    [0, 0, 1, 2, 3, 4, 6, 8, 10, 12, 15, 18, 21, 24, 27, 32];

/// First value covered by each bucket.
pub const BUCKET_OFFSETS: [u32; BUCKET_COUNT] = bucket_offsets();

/// Code lengths of the default model, tuned for deltas that are mostly tiny.
pub const DEFAULT_CODE_LENGTHS: [u8; BUCKET_COUNT] =
    [2, 3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6, 6, 6, 6];

const fn bucket_offsets() -> [u32; BUCKET_COUNT] {
    let mut offsets = [0u32; BUCKET_COUNT];
    let mut i = 1;
    while i < BUCKET_COUNT {
        offsets[i] = offsets[i - 1] + (1u32 << BUCKET_SIZES[i - 1]);
        i += 1;
    }
    offsets
}

/// Shared, read-only table used by every packed read and write.
///
/// Build one per session and pass it by reference; it is `Send + Sync` and
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionModel {
    code_lengths: [u8; BUCKET_COUNT],
    codes: [u16; BUCKET_COUNT],
    /// Number of codes of each length, indexed by length.
    length_counts: [u16; MAX_CODE_LEN as usize + 1],
    /// Bucket indices sorted by (code length, bucket).
    sorted_buckets: [u8; BUCKET_COUNT],
}

impl Default for CompressionModel {
    fn default() -> Self {
        Self::build(DEFAULT_CODE_LENGTHS)
    }
}

impl CompressionModel {
    /// Creates the default model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model from per-bucket code lengths.
    ///
    /// The lengths must describe a complete prefix code so that every bit
    /// sequence decodes to some bucket.
    pub fn with_code_lengths(code_lengths: [u8; BUCKET_COUNT]) -> BitResult<Self> {
        let full = 1u32 << MAX_CODE_LEN;
        let mut kraft = 0u32;
        for &len in &code_lengths {
            if len == 0 || len > MAX_CODE_LEN {
                return Err(BitError::InvalidModel {
                    reason: "code length must be between 1 and 15",
                });
            }
            kraft += 1u32 << (MAX_CODE_LEN - len);
        }
        if kraft > full {
            return Err(BitError::InvalidModel {
                reason: "code lengths oversubscribed",
            });
        }
        if kraft < full {
            return Err(BitError::InvalidModel {
                reason: "code lengths incomplete",
            });
        }
        Ok(Self::build(code_lengths))
    }

    fn build(code_lengths: [u8; BUCKET_COUNT]) -> Self {
        let mut sorted_buckets = [0u8; BUCKET_COUNT];
        for (slot, bucket) in sorted_buckets.iter_mut().zip(0u8..) {
            *slot = bucket;
        }
        sorted_buckets.sort_by_key(|&bucket| (code_lengths[bucket as usize], bucket));

        let mut codes = [0u16; BUCKET_COUNT];
        let mut length_counts = [0u16; MAX_CODE_LEN as usize + 1];
        let mut code = 0u16;
        let mut prev_len = 0u8;
        for (i, &bucket) in sorted_buckets.iter().enumerate() {
            let len = code_lengths[bucket as usize];
            if i > 0 {
                code += 1;
            }
            code <<= len - prev_len;
            codes[bucket as usize] = code;
            length_counts[len as usize] += 1;
            prev_len = len;
        }

        Self {
            code_lengths,
            codes,
            length_counts,
            sorted_buckets,
        }
    }

    /// Returns the bucket covering `value`.
    #[must_use]
    pub fn bucket_for(value: u32) -> usize {
        BUCKET_OFFSETS.partition_point(|&offset| offset <= value) - 1
    }

    /// Returns the prefix code length for `bucket`.
    #[must_use]
    pub fn code_length(&self, bucket: usize) -> u8 {
        self.code_lengths[bucket]
    }

    /// Returns the prefix code for `bucket`.
    #[must_use]
    pub fn code(&self, bucket: usize) -> u16 {
        self.codes[bucket]
    }

    /// Number of bits a packed `value` occupies.
    #[must_use]
    pub fn packed_bits(&self, value: u32) -> usize {
        let bucket = Self::bucket_for(value);
        usize::from(self.code_lengths[bucket]) + usize::from(BUCKET_SIZES[bucket])
    }

    pub(crate) fn decode_bucket(&self, reader: &mut crate::BitReader<'_>) -> BitResult<usize> {
        let start = reader.bit_position();
        let mut code = 0u32;
        let mut first = 0u32;
        let mut index = 0usize;
        for len in 1..=MAX_CODE_LEN as usize {
            code |= u32::from(reader.read_bit()?);
            let count = u32::from(self.length_counts[len]);
            if code >= first && code - first < count {
                return Ok(self.sorted_buckets[index + (code - first) as usize] as usize);
            }
            index += count as usize;
            first = (first + count) << 1;
            code <<= 1;
        }
        Err(BitError::InvalidPackedCode {
            bit_position: start,
        })
    }
}
