//! Error types for codec operations.

use std::fmt;

use crate::NetworkTick;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during ghost serialization and packet coding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Wire format error.
    Wire(wire::DecodeError),

    /// Wire encoding error.
    Encode(wire::EncodeError),

    /// Bitstream error.
    Bitstream(bitstream::BitError),

    /// Collection definition failed validation.
    Schema(schema::SchemaError),

    /// Snapshot history rejected an insert.
    History(HistoryError),

    /// Collection hash mismatch.
    SchemaMismatch { expected: u64, found: u64 },

    /// Ghost type index outside the collection.
    InvalidGhostType { index: usize, len: usize },

    /// Number of values does not match the ghost type.
    FieldCountMismatch { expected: usize, actual: usize },

    /// Invalid value for a field.
    InvalidValue { field: usize, reason: ValueReason },

    /// A record references a baseline the receiver does not have.
    BaselineNotFound { ghost_id: i32, tick: NetworkTick },

    /// Packet kind does not match the decoder.
    UnexpectedPacketKind { flags: u16 },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A single ghost does not fit in an empty packet.
    GhostTooLarge {
        ghost_id: i32,
        bytes: usize,
        budget: usize,
    },

    /// Payload had whole bytes left after the last record.
    TrailingData { remaining_bits: usize },
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    PacketBytes,
    GhostsPerPacket,
}

/// Details for invalid value errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueReason {
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    BoolOutOfRange {
        value: u32,
    },
    StringTooLong {
        len: usize,
        max: usize,
    },
    InvalidUtf8,
}

/// Errors that can occur when inserting into a snapshot history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// Ticks must be strictly newer than the latest entry.
    OutOfOrder {
        last_tick: NetworkTick,
        new_tick: NetworkTick,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::Encode(e) => write!(f, "wire encode error: {e}"),
            Self::Bitstream(e) => write!(f, "bitstream error: {e}"),
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::History(e) => write!(f, "history error: {e}"),
            Self::SchemaMismatch { expected, found } => {
                write!(
                    f,
                    "collection hash mismatch: expected 0x{expected:016X}, found 0x{found:016X}"
                )
            }
            Self::InvalidGhostType { index, len } => {
                write!(f, "ghost type index {index} out of range (collection has {len})")
            }
            Self::FieldCountMismatch { expected, actual } => {
                write!(f, "expected {expected} field values, got {actual}")
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid value for field {field}: {reason}")
            }
            Self::BaselineNotFound { ghost_id, tick } => {
                write!(f, "baseline tick {tick} not found for ghost {ghost_id}")
            }
            Self::UnexpectedPacketKind { flags } => {
                write!(f, "unexpected packet kind (flags 0x{flags:04X})")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::GhostTooLarge {
                ghost_id,
                bytes,
                budget,
            } => {
                write!(
                    f,
                    "ghost {ghost_id} needs {bytes} bytes but the packet budget is {budget}"
                )
            }
            Self::TrailingData { remaining_bits } => {
                write!(f, "trailing data after last record: {remaining_bits} bits")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PacketBytes => "packet bytes",
            Self::GhostsPerPacket => "ghosts per packet",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for ValueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected} but got {found}")
            }
            Self::BoolOutOfRange { value } => {
                write!(f, "bool value {value} is not 0 or 1")
            }
            Self::StringTooLong { len, max } => {
                write!(f, "string of {len} bytes exceeds {max}")
            }
            Self::InvalidUtf8 => write!(f, "string is not valid UTF-8"),
        }
    }
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrder {
                last_tick,
                new_tick,
            } => {
                write!(f, "tick {new_tick} is not newer than {last_tick}")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Bitstream(e) => Some(e),
            Self::Schema(e) => Some(e),
            Self::History(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for HistoryError {}

impl From<wire::DecodeError> for CodecError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Wire(err)
    }
}

impl From<wire::EncodeError> for CodecError {
    fn from(err: wire::EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl From<bitstream::BitError> for CodecError {
    fn from(err: bitstream::BitError) -> Self {
        Self::Bitstream(err)
    }
}

impl From<schema::SchemaError> for CodecError {
    fn from(err: schema::SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<HistoryError> for CodecError {
    fn from(err: HistoryError) -> Self {
        Self::History(err)
    }
}
