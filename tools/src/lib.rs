//! Introspection and debugging tools for the ghostline codec.
//!
//! This crate provides utilities for inspecting and understanding encoded packets:
//!
//! - Decode and print packet headers and ghost records
//! - Print collection hashes for comparing peers
//! - Print the compression model bucket table

use std::fmt::Write as _;

use anyhow::{Context, Result};
use bitstream::{CompressionModel, BUCKET_COUNT, BUCKET_OFFSETS, BUCKET_SIZES};
use codec::{
    decode_rpc_packet, decode_snapshot_records, ClientGhostHistory, CodecError, CodecLimits,
    GhostCollection, NetworkTick, SnapshotRecord, SnapshotValue,
};
use schema::GhostCollectionDef;
use serde::Serialize;
use std::num::NonZeroUsize;

/// Parses and validates a ghost collection definition from JSON.
pub fn load_collection(json: &str) -> Result<GhostCollectionDef> {
    let def: GhostCollectionDef = serde_json::from_str(json).context("parse collection json")?;
    def.validate().context("collection validation failed")?;
    Ok(def)
}

/// Packet kind from the header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    Snapshot,
    Rpc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderSummary {
    pub version: u16,
    pub flags: u16,
    pub collection_hash: String,
    pub tick: u32,
    pub record_count: u16,
    pub payload_len: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub codec: &'static str,
    pub value: String,
}

/// One decoded record. RPC records carry no ghost identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub ghost_id: Option<i32>,
    pub spawn_tick: Option<u32>,
    pub type_index: usize,
    pub type_name: String,
    pub fields: Vec<FieldSummary>,
}

/// Baseline a record was encoded against, which the inspector does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissingBaseline {
    pub ghost_id: i32,
    pub tick: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub packet_bytes: usize,
    pub kind: PacketKind,
    pub header: HeaderSummary,
    pub records: Vec<RecordSummary>,
    /// Records delta-encoded against snapshots the inspector does not have.
    pub missing_baselines: Vec<MissingBaseline>,
}

/// Decodes a packet with no prior history.
///
/// Snapshot records encoded against a baseline cannot be decoded in
/// isolation; they are listed in `missing_baselines` and every other
/// record is decoded.
pub fn inspect_packet(
    bytes: &[u8],
    collection: &GhostCollection,
    model: &CompressionModel,
    limits: &CodecLimits,
) -> Result<InspectReport, CodecError> {
    let packet = wire::decode_packet(bytes, &limits.wire_limits())?;
    let header = packet.header;
    let summary = HeaderSummary {
        version: header.version,
        flags: header.flags.raw(),
        collection_hash: format!("0x{:016x}", header.collection_hash),
        tick: header.tick,
        record_count: header.record_count,
        payload_len: header.payload_len,
    };

    if header.flags.is_rpc() {
        let decoded = decode_rpc_packet(collection, bytes, limits)?;
        let records = decoded
            .records
            .iter()
            .map(|record| summarize(collection, None, record.type_index, &record.values))
            .collect::<Result<_, _>>()?;
        return Ok(InspectReport {
            packet_bytes: bytes.len(),
            kind: PacketKind::Rpc,
            header: summary,
            records,
            missing_baselines: Vec::new(),
        });
    }

    let history = ClientGhostHistory::new(NonZeroUsize::MIN);
    let mut records = Vec::new();
    let mut missing_baselines = Vec::new();
    for record in decode_snapshot_records(collection, &packet, model, &history)? {
        match record {
            SnapshotRecord::Decoded(ghost) => records.push(summarize(
                collection,
                Some((ghost.ghost.ghost_id, ghost.ghost.spawn_tick)),
                ghost.type_index,
                &ghost.snapshot.values,
            )?),
            SnapshotRecord::MissingBaseline { ghost, tick, .. } => {
                missing_baselines.push(MissingBaseline {
                    ghost_id: ghost.ghost_id,
                    tick: tick.raw(),
                });
            }
        }
    }

    Ok(InspectReport {
        packet_bytes: bytes.len(),
        kind: PacketKind::Snapshot,
        header: summary,
        records,
        missing_baselines,
    })
}

fn summarize(
    collection: &GhostCollection,
    ghost: Option<(i32, NetworkTick)>,
    type_index: usize,
    values: &[SnapshotValue],
) -> Result<RecordSummary, CodecError> {
    let serializer = collection.serializer(type_index)?;
    let fields = serializer
        .field_names()
        .iter()
        .zip(serializer.fields())
        .zip(values)
        .map(|((name, kind), value)| FieldSummary {
            name: name.clone(),
            codec: kind.name(),
            value: value.to_string(),
        })
        .collect();
    Ok(RecordSummary {
        ghost_id: ghost.map(|(id, _)| id),
        spawn_tick: ghost.map(|(_, tick)| tick.raw()),
        type_index,
        type_name: serializer.name().to_string(),
        fields,
    })
}

/// Human-readable rendering of an [`InspectReport`].
#[must_use]
pub fn format_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    let header = &report.header;
    let _ = writeln!(
        out,
        "{:?} packet, {} bytes (payload {} bytes)",
        report.kind, report.packet_bytes, header.payload_len
    );
    let _ = writeln!(
        out,
        "version: {} flags: 0x{:04x} collection_hash: {}",
        header.version, header.flags, header.collection_hash
    );
    let _ = writeln!(out, "tick: {} records: {}", header.tick, header.record_count);
    for missing in &report.missing_baselines {
        let _ = writeln!(
            out,
            "  ghost {} skipped (delta against baseline tick {})",
            missing.ghost_id, missing.tick
        );
    }
    for record in &report.records {
        match (record.ghost_id, record.spawn_tick) {
            (Some(id), Some(spawn)) => {
                let _ = writeln!(out, "  ghost {id}@{spawn} {}", record.type_name);
            }
            _ => {
                let _ = writeln!(out, "  rpc {}", record.type_name);
            }
        }
        for field in &record.fields {
            let _ = writeln!(out, "    {} ({}): {}", field.name, field.codec, field.value);
        }
    }
    out
}

/// One row of the compression model table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketRow {
    pub bucket: usize,
    pub first_value: u32,
    pub offset_bits: u8,
    pub code_length: u8,
    pub code: u16,
}

#[must_use]
pub fn model_rows(model: &CompressionModel) -> Vec<BucketRow> {
    (0..BUCKET_COUNT)
        .map(|bucket| BucketRow {
            bucket,
            first_value: BUCKET_OFFSETS[bucket],
            offset_bits: BUCKET_SIZES[bucket],
            code_length: model.code_length(bucket),
            code: model.code(bucket),
        })
        .collect()
}

#[must_use]
pub fn format_model(rows: &[BucketRow]) -> String {
    let mut out = String::from("bucket  first_value  offset_bits  code\n");
    for row in rows {
        let code = format!("{:0width$b}", row.code, width = usize::from(row.code_length));
        let _ = writeln!(
            out,
            "{:>6}  {:>11}  {:>11}  {code}",
            row.bucket, row.first_value, row.offset_bits
        );
    }
    out
}
