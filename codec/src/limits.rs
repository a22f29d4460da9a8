//! Limits for codec-level encoding and decoding.

use schema::FIXED_STRING_MAX_BYTES;

/// Codec-specific limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Byte budget for an encoded snapshot packet, header included.
    pub packet_byte_budget: usize,
    /// Maximum number of ghost records in one packet.
    pub max_ghosts_per_packet: usize,
    /// Number of snapshots kept per ghost on the receive side.
    pub history_capacity: usize,
    /// Maximum decoded fixed string length. Never above 61.
    pub max_string_bytes: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            packet_byte_budget: 1200,
            max_ghosts_per_packet: 1024,
            history_capacity: 32,
            max_string_bytes: FIXED_STRING_MAX_BYTES,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            packet_byte_budget: 256,
            max_ghosts_per_packet: 32,
            history_capacity: 8,
            max_string_bytes: FIXED_STRING_MAX_BYTES,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            packet_byte_budget: usize::MAX,
            max_ghosts_per_packet: u16::MAX as usize,
            history_capacity: 64,
            max_string_bytes: FIXED_STRING_MAX_BYTES,
        }
    }

    /// Wire limits matching these codec limits.
    #[must_use]
    pub fn wire_limits(&self) -> wire::Limits {
        wire::Limits {
            max_packet_bytes: self.packet_byte_budget,
            max_records_per_packet: self.max_ghosts_per_packet,
        }
    }

    pub(crate) fn string_limit(&self) -> usize {
        self.max_string_bytes.min(FIXED_STRING_MAX_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_fit_a_datagram() {
        let limits = CodecLimits::default();
        assert!(limits.packet_byte_budget <= wire::Limits::default().max_packet_bytes);
        assert!(limits.history_capacity >= 2);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = CodecLimits::for_testing();
        let default_limits = CodecLimits::default();
        assert!(test_limits.packet_byte_budget < default_limits.packet_byte_budget);
        assert!(test_limits.history_capacity < default_limits.history_capacity);
    }

    #[test]
    fn unlimited_limits() {
        let limits = CodecLimits::unlimited();
        assert_eq!(limits.packet_byte_budget, usize::MAX);
        assert_eq!(limits.max_ghosts_per_packet, usize::from(u16::MAX));
    }

    #[test]
    fn string_limit_is_capped() {
        let limits = CodecLimits {
            max_string_bytes: 1000,
            ..CodecLimits::default()
        };
        assert_eq!(limits.string_limit(), FIXED_STRING_MAX_BYTES);

        let limits = CodecLimits {
            max_string_bytes: 8,
            ..CodecLimits::default()
        };
        assert_eq!(limits.string_limit(), 8);
    }

    #[test]
    fn wire_limits_mirror_codec_limits() {
        let wire = CodecLimits::for_testing().wire_limits();
        assert_eq!(wire.max_packet_bytes, 256);
        assert_eq!(wire.max_records_per_packet, 32);
    }
}
