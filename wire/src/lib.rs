//! Wire framing for ghostline packets.
//!
//! This crate handles the fixed packet header and limit enforcement. It does
//! not know about ghosts or fields, only where the payload starts and how long
//! it is.
//!
//! # Design Principles
//!
//! - **Stable wire format** - The format is versioned and changes bump [`VERSION`].
//! - **Bounded decoding** - Lengths and counts are validated against limits before use.
//! - **No domain knowledge** - This crate handles framing, not game logic.

mod error;
mod header;
mod limits;

pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use header::{
    decode_packet, encode_header, encode_packet, PacketFlags, PacketHeader, WirePacket,
    HEADER_SIZE, MAGIC, VERSION,
};
pub use limits::Limits;
