//! Configurable limits for bounded decoding.

/// Wire-level limits for packet decoding.
///
/// These limits are enforced before any payload parsing to bound memory use.
/// Per-field limits belong to higher layers (codec/schema).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum packet size in bytes.
    pub max_packet_bytes: usize,

    /// Maximum number of ghost or RPC records in a packet.
    pub max_records_per_packet: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // A single datagram; snapshot packets are budgeted below the MTU.
            max_packet_bytes: 1400,
            max_records_per_packet: 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_packet_bytes: 512,
            max_records_per_packet: 64,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_packet_bytes: usize::MAX,
            max_records_per_packet: usize::MAX,
        }
    }
}
