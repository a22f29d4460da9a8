//! Packet header types and constants.

use crate::error::{DecodeError, EncodeError, LimitKind, WireResult};
use crate::limits::Limits;

/// Magic number identifying ghostline packets.
///
/// This value is fixed and must never change across versions.
pub const MAGIC: u32 = 0x4748_5354; // "GHST" in ASCII

/// Current wire format version.
pub const VERSION: u16 = 1;

/// Header size in bytes (26 total).
pub const HEADER_SIZE: usize = 4 + 2 + 2 + 8 + 4 + 2 + 4;

/// Packet flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PacketFlags(u16);

impl PacketFlags {
    /// Flag indicating a ghost snapshot packet.
    pub const SNAPSHOT: u16 = 1 << 0;

    /// Flag indicating a one-shot RPC packet.
    pub const RPC: u16 = 1 << 1;

    /// Reserved bits mask (must be zero in version 1).
    const RESERVED_MASK: u16 = !0b11;

    /// Creates new flags from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns `true` if this is a snapshot packet.
    #[must_use]
    pub const fn is_snapshot(self) -> bool {
        self.0 & Self::SNAPSHOT != 0
    }

    /// Returns `true` if this is an RPC packet.
    #[must_use]
    pub const fn is_rpc(self) -> bool {
        self.0 & Self::RPC != 0
    }

    /// Returns `true` if exactly one packet kind is set and no reserved bits are.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        let has_reserved = self.0 & Self::RESERVED_MASK != 0;
        (self.is_snapshot() ^ self.is_rpc()) && !has_reserved
    }

    /// Creates flags for a snapshot packet.
    #[must_use]
    pub const fn snapshot() -> Self {
        Self(Self::SNAPSHOT)
    }

    /// Creates flags for an RPC packet.
    #[must_use]
    pub const fn rpc() -> Self {
        Self(Self::RPC)
    }
}

/// Packet header.
///
/// This struct represents the header fields *after* the magic number.
/// The magic number is validated separately during decoding and is not
/// stored in this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Wire format version.
    pub version: u16,
    /// Packet flags.
    pub flags: PacketFlags,
    /// Ghost collection hash; both peers must agree on the layout.
    pub collection_hash: u64,
    /// Server tick this packet was produced at.
    pub tick: u32,
    /// Number of ghost (or RPC) records in the payload.
    pub record_count: u16,
    /// Payload length in bytes.
    pub payload_len: u32,
}

impl PacketHeader {
    /// Creates a new header for a snapshot packet.
    #[must_use]
    pub const fn snapshot(
        collection_hash: u64,
        tick: u32,
        record_count: u16,
        payload_len: u32,
    ) -> Self {
        Self {
            version: VERSION,
            flags: PacketFlags::snapshot(),
            collection_hash,
            tick,
            record_count,
            payload_len,
        }
    }

    /// Creates a new header for an RPC packet.
    #[must_use]
    pub const fn rpc(collection_hash: u64, tick: u32, record_count: u16, payload_len: u32) -> Self {
        Self {
            version: VERSION,
            flags: PacketFlags::rpc(),
            collection_hash,
            tick,
            record_count,
            payload_len,
        }
    }
}

/// A decoded packet: validated header plus the raw payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WirePacket<'a> {
    pub header: PacketHeader,
    pub payload: &'a [u8],
}

/// Encodes a header into the first [`HEADER_SIZE`] bytes of `out`.
pub fn encode_header(header: &PacketHeader, out: &mut [u8]) -> Result<(), EncodeError> {
    if out.len() < HEADER_SIZE {
        return Err(EncodeError::BufferTooSmall {
            needed: HEADER_SIZE,
            available: out.len(),
        });
    }
    out[0..4].copy_from_slice(&MAGIC.to_le_bytes());
    out[4..6].copy_from_slice(&header.version.to_le_bytes());
    out[6..8].copy_from_slice(&header.flags.raw().to_le_bytes());
    out[8..16].copy_from_slice(&header.collection_hash.to_le_bytes());
    out[16..20].copy_from_slice(&header.tick.to_le_bytes());
    out[20..22].copy_from_slice(&header.record_count.to_le_bytes());
    out[22..26].copy_from_slice(&header.payload_len.to_le_bytes());
    Ok(())
}

/// Builds a complete packet: header followed by `payload`.
pub fn encode_packet(
    header: &PacketHeader,
    payload: &[u8],
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| EncodeError::LengthOverflow {
        length: payload.len(),
    })?;
    if payload_len != header.payload_len {
        return Err(EncodeError::LengthMismatch {
            header_len: header.payload_len,
            actual_len: payload.len(),
        });
    }
    let start = out.len();
    out.resize(start + HEADER_SIZE, 0);
    encode_header(header, &mut out[start..])?;
    out.extend_from_slice(payload);
    Ok(())
}

/// Decodes and validates a packet header, returning the payload slice.
pub fn decode_packet<'a>(buf: &'a [u8], limits: &Limits) -> WireResult<WirePacket<'a>> {
    if buf.len() < HEADER_SIZE {
        return Err(DecodeError::PacketTooSmall {
            actual: buf.len(),
            required: HEADER_SIZE,
        });
    }
    if buf.len() > limits.max_packet_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::PacketBytes,
            limit: limits.max_packet_bytes,
            actual: buf.len(),
        });
    }

    let magic = read_u32(buf, 0);
    if magic != MAGIC {
        return Err(DecodeError::InvalidMagic { found: magic });
    }

    let version = read_u16(buf, 4);
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }

    let flags_raw = read_u16(buf, 6);
    let flags = PacketFlags::from_raw(flags_raw);
    if !flags.is_valid() {
        return Err(DecodeError::InvalidFlags { flags: flags_raw });
    }

    let collection_hash = read_u64(buf, 8);
    let tick = read_u32(buf, 16);
    let record_count = read_u16(buf, 20);
    let payload_len = read_u32(buf, 22);

    if usize::from(record_count) > limits.max_records_per_packet {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::RecordCount,
            limit: limits.max_records_per_packet,
            actual: usize::from(record_count),
        });
    }

    let actual_payload_len = buf.len() - HEADER_SIZE;
    if payload_len as usize != actual_payload_len {
        return Err(DecodeError::PayloadLengthMismatch {
            header_len: payload_len,
            actual_len: actual_payload_len,
        });
    }

    Ok(WirePacket {
        header: PacketHeader {
            version,
            flags,
            collection_hash,
            tick,
            record_count,
            payload_len,
        },
        payload: &buf[HEADER_SIZE..],
    })
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn read_u64(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_packet(payload: &[u8]) -> Vec<u8> {
        let header = PacketHeader::snapshot(0x1234_5678_9ABC_DEF0, 100, 2, payload.len() as u32);
        let mut out = Vec::new();
        encode_packet(&header, payload, &mut out).unwrap();
        out
    }

    #[test]
    fn magic_is_ghst_ascii() {
        assert_eq!(&MAGIC.to_be_bytes(), b"GHST");
    }

    #[test]
    fn header_size_is_correct() {
        // magic(4) + version(2) + flags(2) + hash(8) + tick(4) + records(2) + payload_len(4)
        assert_eq!(HEADER_SIZE, 26);
    }

    #[test]
    fn flags_validity() {
        assert!(PacketFlags::snapshot().is_valid());
        assert!(PacketFlags::rpc().is_valid());
        assert!(!PacketFlags::from_raw(0).is_valid());
        assert!(!PacketFlags::from_raw(0b11).is_valid());
        assert!(!PacketFlags::from_raw(0b101).is_valid());
        assert!(!PacketFlags::default().is_valid());
    }

    #[test]
    fn header_roundtrip() {
        let bytes = sample_packet(&[0xAA, 0xBB, 0xCC]);
        let packet = decode_packet(&bytes, &Limits::for_testing()).unwrap();
        assert_eq!(packet.header.version, VERSION);
        assert!(packet.header.flags.is_snapshot());
        assert_eq!(packet.header.collection_hash, 0x1234_5678_9ABC_DEF0);
        assert_eq!(packet.header.tick, 100);
        assert_eq!(packet.header.record_count, 2);
        assert_eq!(packet.payload, &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn golden_header_bytes() {
        let bytes = sample_packet(&[]);
        let mut expected = Vec::new();
        expected.extend_from_slice(&MAGIC.to_le_bytes());
        expected.extend_from_slice(&VERSION.to_le_bytes());
        expected.extend_from_slice(&PacketFlags::SNAPSHOT.to_le_bytes());
        expected.extend_from_slice(&0x1234_5678_9ABC_DEF0u64.to_le_bytes());
        expected.extend_from_slice(&100u32.to_le_bytes());
        expected.extend_from_slice(&2u16.to_le_bytes());
        expected.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let err = decode_packet(&[0u8; 10], &Limits::default()).unwrap_err();
        assert!(matches!(err, DecodeError::PacketTooSmall { actual: 10, .. }));
    }

    #[test]
    fn decode_rejects_bad_magic() {
        let mut bytes = sample_packet(&[]);
        bytes[0] ^= 0xFF;
        let err = decode_packet(&bytes, &Limits::default()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidMagic { .. }));
    }

    #[test]
    fn decode_rejects_bad_version() {
        let mut bytes = sample_packet(&[]);
        bytes[4] = 9;
        let err = decode_packet(&bytes, &Limits::default()).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedVersion { found: 9 });
    }

    #[test]
    fn decode_rejects_invalid_flags() {
        let mut bytes = sample_packet(&[]);
        bytes[6] = 0b11;
        let err = decode_packet(&bytes, &Limits::default()).unwrap_err();
        assert_eq!(err, DecodeError::InvalidFlags { flags: 0b11 });
    }

    #[test]
    fn decode_rejects_payload_mismatch() {
        let mut bytes = sample_packet(&[1, 2, 3]);
        bytes.push(4);
        let err = decode_packet(&bytes, &Limits::default()).unwrap_err();
        assert!(matches!(err, DecodeError::PayloadLengthMismatch { .. }));
    }

    #[test]
    fn decode_enforces_limits() {
        let bytes = sample_packet(&[0u8; 64]);
        let limits = Limits {
            max_packet_bytes: 32,
            ..Limits::default()
        };
        let err = decode_packet(&bytes, &limits).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LimitsExceeded {
                kind: LimitKind::PacketBytes,
                ..
            }
        ));

        let limits = Limits {
            max_records_per_packet: 1,
            ..Limits::default()
        };
        let err = decode_packet(&sample_packet(&[]), &limits).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LimitsExceeded {
                kind: LimitKind::RecordCount,
                ..
            }
        ));
    }

    #[test]
    fn encode_packet_rejects_length_mismatch() {
        let header = PacketHeader::snapshot(0, 1, 0, 5);
        let mut out = Vec::new();
        let err = encode_packet(&header, &[0u8; 3], &mut out).unwrap_err();
        assert!(matches!(err, EncodeError::LengthMismatch { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn encode_header_rejects_small_buffer() {
        let header = PacketHeader::rpc(0, 1, 1, 0);
        let mut out = [0u8; HEADER_SIZE - 1];
        let err = encode_header(&header, &mut out).unwrap_err();
        assert!(matches!(err, EncodeError::BufferTooSmall { .. }));
    }

    #[test]
    fn header_const_constructible() {
        const HEADER: PacketHeader = PacketHeader::snapshot(0, 0, 0, 0);
        assert_eq!(HEADER.tick, 0);
    }
}
