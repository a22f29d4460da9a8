//! Snapshot and RPC packet encoding/decoding.
//!
//! A snapshot packet is a [`wire::PacketHeader`] followed by a bit-packed
//! payload of ghost records. Each record is:
//!
//! - packed type index
//! - packed ghost id
//! - packed `tick - spawn_tick`
//! - packed `tick - baseline1` (0 when there is no baseline)
//! - packed `tick - baseline2` (0 when absent; only present with a baseline1)
//! - the serializer payload (change mask, then changed fields)
//!
//! Records are not byte aligned; the payload is zero-padded to a whole byte.

use bitstream::{BitReader, BitWriter, CompressionModel};
use rayon::prelude::*;
use tracing::{debug, trace};
use wire::{decode_packet, encode_packet, PacketHeader, WirePacket, HEADER_SIZE};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::field::SnapshotValue;
use crate::{
    BaselineSource, Baselines, CodecLimits, GhostCollection, GhostRef, NetworkTick, Snapshot,
};

/// One ghost queued for a snapshot packet.
#[derive(Debug, Clone, Copy)]
pub struct GhostSendEntry<'a> {
    pub ghost: GhostRef,
    pub type_index: usize,
    pub snapshot: &'a Snapshot,
    pub baselines: Baselines<'a>,
}

/// Result of encoding a snapshot packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPacket {
    /// Complete packet, header included.
    pub bytes: Vec<u8>,
    /// Number of leading entries written.
    pub sent: usize,
    /// Indices of entries that did not fit, in order.
    pub deferred: Vec<usize>,
}

/// A ghost record read from a snapshot packet.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGhost {
    pub ghost: GhostRef,
    pub type_index: usize,
    pub snapshot: Snapshot,
}

/// A decoded snapshot packet.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPacket {
    pub tick: NetworkTick,
    pub ghosts: Vec<DecodedGhost>,
}

/// Encodes ghost records into one packet, deferring what does not fit.
///
/// Records are serialized in parallel, each into its own writer, then
/// appended in order while the packet stays within
/// [`CodecLimits::packet_byte_budget`]. The first record that does not fit
/// and every record after it are deferred. A ghost that does not fit in an
/// otherwise empty packet is an error.
pub fn encode_snapshot_packet(
    collection: &GhostCollection,
    tick: NetworkTick,
    entries: &[GhostSendEntry<'_>],
    model: &CompressionModel,
    limits: &CodecLimits,
) -> CodecResult<EncodedPacket> {
    let max_records = limits.max_ghosts_per_packet.min(usize::from(u16::MAX));
    let candidates = &entries[..entries.len().min(max_records)];

    let records = candidates
        .par_iter()
        .map(|entry| encode_record(collection, tick, entry, model))
        .collect::<CodecResult<Vec<BitWriter>>>()?;

    let mut payload = BitWriter::new();
    let mut sent = 0;
    for (entry, record) in candidates.iter().zip(&records) {
        let bits = payload.bits_written() + record.bits_written();
        let packet_bytes = HEADER_SIZE + bits.div_ceil(8);
        if packet_bytes > limits.packet_byte_budget {
            if sent == 0 {
                return Err(CodecError::GhostTooLarge {
                    ghost_id: entry.ghost.ghost_id,
                    bytes: packet_bytes,
                    budget: limits.packet_byte_budget,
                });
            }
            break;
        }
        payload.append(record);
        sent += 1;
    }

    let deferred: Vec<usize> = (sent..entries.len()).collect();
    if !deferred.is_empty() {
        debug!(
            tick = tick.raw(),
            sent,
            deferred = deferred.len(),
            budget = limits.packet_byte_budget,
            "snapshot packet full, deferring ghosts"
        );
    }

    let payload = payload.finish();
    let header = PacketHeader::snapshot(
        collection.hash(),
        tick.raw(),
        sent as u16,
        payload_len(&payload)?,
    );
    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    encode_packet(&header, &payload, &mut bytes)?;

    Ok(EncodedPacket {
        bytes,
        sent,
        deferred,
    })
}

fn encode_record(
    collection: &GhostCollection,
    tick: NetworkTick,
    entry: &GhostSendEntry<'_>,
    model: &CompressionModel,
) -> CodecResult<BitWriter> {
    let serializer = collection.serializer(entry.type_index)?;
    let baselines = usable_baselines(entry.ghost, tick, entry.baselines);

    let mut writer = BitWriter::new();
    writer.write_packed_u32(entry.type_index as u32, model)?;
    writer.write_packed_i32(entry.ghost.ghost_id, model)?;
    writer.write_packed_u32(tick.raw().wrapping_sub(entry.ghost.spawn_tick.raw()), model)?;
    match baselines.baseline1 {
        Some(b1) => {
            writer.write_packed_u32(tick.raw().wrapping_sub(b1.tick.raw()), model)?;
            let d2 = baselines
                .baseline2
                .map_or(0, |b2| tick.raw().wrapping_sub(b2.tick.raw()));
            writer.write_packed_u32(d2, model)?;
        }
        None => writer.write_packed_u32(0, model)?,
    }

    // The receiver predicts from the packet tick.
    let retimed;
    let snapshot = if entry.snapshot.tick == tick {
        entry.snapshot
    } else {
        retimed = Snapshot::new(tick, entry.snapshot.values.clone());
        &retimed
    };
    serializer.serialize(&mut writer, snapshot, &baselines, model)?;
    Ok(writer)
}

/// Drops baselines that are not strictly older than `tick`, in order.
fn usable_baselines<'a>(
    ghost: GhostRef,
    tick: NetworkTick,
    baselines: Baselines<'a>,
) -> Baselines<'a> {
    let Some(b1) = baselines.baseline1 else {
        return Baselines::none();
    };
    if !tick.is_newer_than(b1.tick) {
        trace!(
            ghost_id = ghost.ghost_id,
            tick = tick.raw(),
            baseline = b1.tick.raw(),
            "baseline not older than snapshot, sending without baseline"
        );
        return Baselines::none();
    }
    match baselines.baseline2 {
        Some(b2) if b1.tick.is_newer_than(b2.tick) => Baselines::two(b1, b2),
        _ => Baselines::one(b1),
    }
}

/// Decodes a snapshot packet, fetching baselines from `source`.
pub fn decode_snapshot_packet(
    collection: &GhostCollection,
    bytes: &[u8],
    model: &CompressionModel,
    limits: &CodecLimits,
    source: &impl BaselineSource,
) -> CodecResult<DecodedPacket> {
    let packet = decode_packet(bytes, &limits.wire_limits())?;
    decode_snapshot_packet_from_packet(collection, &packet, model, source)
}

/// Decodes a snapshot packet from a parsed wire packet.
pub fn decode_snapshot_packet_from_packet(
    collection: &GhostCollection,
    packet: &WirePacket<'_>,
    model: &CompressionModel,
    source: &impl BaselineSource,
) -> CodecResult<DecodedPacket> {
    let header = packet.header;
    if !header.flags.is_snapshot() {
        return Err(CodecError::UnexpectedPacketKind {
            flags: header.flags.raw(),
        });
    }
    check_hash(collection, &header)?;

    let tick = NetworkTick::new(header.tick);
    let mut reader = BitReader::new(packet.payload);
    let mut ghosts = Vec::with_capacity(usize::from(header.record_count));
    for _ in 0..header.record_count {
        ghosts.push(decode_record(collection, tick, &mut reader, model, source)?);
    }
    check_trailing(&reader)?;

    Ok(DecodedPacket { tick, ghosts })
}

/// Record fields preceding the serializer payload.
struct RecordHeader {
    type_index: usize,
    ghost: GhostRef,
    baseline1: Option<NetworkTick>,
    baseline2: Option<NetworkTick>,
}

fn read_record_header(
    tick: NetworkTick,
    reader: &mut BitReader<'_>,
    model: &CompressionModel,
) -> CodecResult<RecordHeader> {
    let type_index = reader.read_packed_u32(model)? as usize;
    let ghost_id = reader.read_packed_i32(model)?;
    let spawn_tick = tick.wrapping_sub(reader.read_packed_u32(model)?);

    let mut baseline1 = None;
    let mut baseline2 = None;
    let d1 = reader.read_packed_u32(model)?;
    if d1 != 0 {
        baseline1 = Some(tick.wrapping_sub(d1));
        let d2 = reader.read_packed_u32(model)?;
        if d2 != 0 {
            baseline2 = Some(tick.wrapping_sub(d2));
        }
    }

    Ok(RecordHeader {
        type_index,
        ghost: GhostRef::new(ghost_id, spawn_tick),
        baseline1,
        baseline2,
    })
}

fn decode_record(
    collection: &GhostCollection,
    tick: NetworkTick,
    reader: &mut BitReader<'_>,
    model: &CompressionModel,
    source: &impl BaselineSource,
) -> CodecResult<DecodedGhost> {
    let header = read_record_header(tick, reader, model)?;
    let baselines = Baselines {
        baseline1: header
            .baseline1
            .map(|b1| lookup(source, header.ghost, b1))
            .transpose()?,
        baseline2: header
            .baseline2
            .map(|b2| lookup(source, header.ghost, b2))
            .transpose()?,
    };

    let snapshot = collection.deserialize(header.type_index, reader, tick, &baselines, model)?;
    Ok(DecodedGhost {
        ghost: header.ghost,
        type_index: header.type_index,
        snapshot,
    })
}

fn lookup(
    source: &impl BaselineSource,
    ghost: GhostRef,
    tick: NetworkTick,
) -> CodecResult<&Snapshot> {
    source
        .baseline(ghost, tick)
        .ok_or(CodecError::BaselineNotFound {
            ghost_id: ghost.ghost_id,
            tick,
        })
}

/// A snapshot record that may not have been decodable.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotRecord {
    Decoded(DecodedGhost),
    /// Delta-encoded against a baseline the source does not hold.
    MissingBaseline {
        ghost: GhostRef,
        type_index: usize,
        tick: NetworkTick,
    },
}

/// Reads every record of a snapshot packet, keeping going past records
/// whose baselines `source` does not hold.
///
/// Field widths do not depend on predicted values, so such a record is
/// parsed against zero baselines to find where the next one starts, and
/// its values are discarded.
pub fn decode_snapshot_records(
    collection: &GhostCollection,
    packet: &WirePacket<'_>,
    model: &CompressionModel,
    source: &impl BaselineSource,
) -> CodecResult<Vec<SnapshotRecord>> {
    let header = packet.header;
    if !header.flags.is_snapshot() {
        return Err(CodecError::UnexpectedPacketKind {
            flags: header.flags.raw(),
        });
    }
    check_hash(collection, &header)?;

    let tick = NetworkTick::new(header.tick);
    let mut reader = BitReader::new(packet.payload);
    let mut records = Vec::with_capacity(usize::from(header.record_count));
    for _ in 0..header.record_count {
        let record = read_record_header(tick, &mut reader, model)?;
        let missing = [record.baseline1, record.baseline2]
            .into_iter()
            .flatten()
            .find(|&baseline| source.baseline(record.ghost, baseline).is_none());
        let baselines = match missing {
            Some(_) => Baselines::none(),
            None => Baselines {
                baseline1: record
                    .baseline1
                    .and_then(|b1| source.baseline(record.ghost, b1)),
                baseline2: record
                    .baseline2
                    .and_then(|b2| source.baseline(record.ghost, b2)),
            },
        };
        let snapshot =
            collection.deserialize(record.type_index, &mut reader, tick, &baselines, model)?;
        records.push(match missing {
            Some(baseline) => {
                trace!(
                    ghost_id = record.ghost.ghost_id,
                    baseline = baseline.raw(),
                    "skipping record with unknown baseline"
                );
                SnapshotRecord::MissingBaseline {
                    ghost: record.ghost,
                    type_index: record.type_index,
                    tick: baseline,
                }
            }
            None => SnapshotRecord::Decoded(DecodedGhost {
                ghost: record.ghost,
                type_index: record.type_index,
                snapshot,
            }),
        });
    }
    check_trailing(&reader)?;

    Ok(records)
}

/// A full-value record for an RPC packet.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRecord {
    pub type_index: usize,
    pub values: Vec<SnapshotValue>,
}

/// A decoded RPC packet.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRpcPacket {
    pub tick: NetworkTick,
    pub records: Vec<RpcRecord>,
}

const RPC_TYPE_INDEX_BITS: u8 = 16;

/// Encodes RPC records: a raw 16-bit type index, then every field in full.
///
/// RPC records are never deferred; exceeding the budget is an error.
pub fn encode_rpc_packet(
    collection: &GhostCollection,
    tick: NetworkTick,
    records: &[RpcRecord],
    limits: &CodecLimits,
) -> CodecResult<Vec<u8>> {
    let max_records = limits.max_ghosts_per_packet.min(usize::from(u16::MAX));
    if records.len() > max_records {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::GhostsPerPacket,
            limit: max_records,
            actual: records.len(),
        });
    }

    let mut writer = BitWriter::new();
    for record in records {
        let serializer = collection.serializer(record.type_index)?;
        writer.write_bits(record.type_index as u64, RPC_TYPE_INDEX_BITS)?;
        serializer.serialize_rpc(&mut writer, &record.values)?;
    }
    let payload = writer.finish();
    if HEADER_SIZE + payload.len() > limits.packet_byte_budget {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::PacketBytes,
            limit: limits.packet_byte_budget,
            actual: HEADER_SIZE + payload.len(),
        });
    }

    let header = PacketHeader::rpc(
        collection.hash(),
        tick.raw(),
        records.len() as u16,
        payload_len(&payload)?,
    );
    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    encode_packet(&header, &payload, &mut bytes)?;
    Ok(bytes)
}

pub fn decode_rpc_packet(
    collection: &GhostCollection,
    bytes: &[u8],
    limits: &CodecLimits,
) -> CodecResult<DecodedRpcPacket> {
    let packet = decode_packet(bytes, &limits.wire_limits())?;
    let header = packet.header;
    if !header.flags.is_rpc() {
        return Err(CodecError::UnexpectedPacketKind {
            flags: header.flags.raw(),
        });
    }
    check_hash(collection, &header)?;

    let mut reader = BitReader::new(packet.payload);
    let mut records = Vec::with_capacity(usize::from(header.record_count));
    for _ in 0..header.record_count {
        let type_index = reader.read_bits(RPC_TYPE_INDEX_BITS)? as usize;
        let values = collection
            .serializer(type_index)?
            .deserialize_rpc(&mut reader)?;
        records.push(RpcRecord { type_index, values });
    }
    check_trailing(&reader)?;

    Ok(DecodedRpcPacket {
        tick: NetworkTick::new(header.tick),
        records,
    })
}

fn check_hash(collection: &GhostCollection, header: &PacketHeader) -> CodecResult<()> {
    if header.collection_hash != collection.hash() {
        return Err(CodecError::SchemaMismatch {
            expected: collection.hash(),
            found: header.collection_hash,
        });
    }
    Ok(())
}

fn check_trailing(reader: &BitReader<'_>) -> CodecResult<()> {
    let remaining_bits = reader.bits_remaining();
    if remaining_bits >= 8 {
        return Err(CodecError::TrailingData { remaining_bits });
    }
    Ok(())
}

fn payload_len(payload: &[u8]) -> CodecResult<u32> {
    u32::try_from(payload.len()).map_err(|_| {
        CodecError::Encode(wire::EncodeError::LengthOverflow {
            length: payload.len(),
        })
    })
}
