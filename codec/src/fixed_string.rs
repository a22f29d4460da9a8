//! Inline UTF-8 string with 64-byte storage.

use std::fmt;

use schema::FIXED_STRING_MAX_BYTES;

use crate::error::ValueReason;

/// A UTF-8 string of at most [`FIXED_STRING_MAX_BYTES`] bytes, stored inline.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedString64 {
    len: u8,
    bytes: [u8; FIXED_STRING_MAX_BYTES],
}

impl FixedString64 {
    pub const EMPTY: Self = Self {
        len: 0,
        bytes: [0; FIXED_STRING_MAX_BYTES],
    };

    /// Creates a string, truncating on a char boundary to `max_bytes`.
    ///
    /// `max_bytes` is capped at [`FIXED_STRING_MAX_BYTES`].
    #[must_use]
    pub fn truncated(value: &str, max_bytes: usize) -> Self {
        let mut end = value.len().min(max_bytes).min(FIXED_STRING_MAX_BYTES);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        let mut bytes = [0; FIXED_STRING_MAX_BYTES];
        bytes[..end].copy_from_slice(&value.as_bytes()[..end]);
        Self {
            len: end as u8,
            bytes,
        }
    }

    /// Creates a string, truncating on a char boundary if needed.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self::truncated(value, FIXED_STRING_MAX_BYTES)
    }

    /// Validates raw bytes read from the wire.
    pub fn from_utf8(bytes: &[u8]) -> Result<Self, ValueReason> {
        if bytes.len() > FIXED_STRING_MAX_BYTES {
            return Err(ValueReason::StringTooLong {
                len: bytes.len(),
                max: FIXED_STRING_MAX_BYTES,
            });
        }
        let value = std::str::from_utf8(bytes).map_err(|_| ValueReason::InvalidUtf8)?;
        Ok(Self::new(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // Contents are validated on construction.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for FixedString64 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<&str> for FixedString64 {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for FixedString64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedString64({:?})", self.as_str())
    }
}

impl fmt::Display for FixedString64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
