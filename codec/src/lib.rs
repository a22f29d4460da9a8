//! Ghost snapshot encoding/decoding for the ghostline codec.
//!
//! This is the main codec crate that ties together bitstream, wire, and schema
//! to turn per-ghost field values into compact, baseline-predicted packets.
//!
//! # Features
//!
//! - Per-field-type codecs (bool, int, uint, float, quantized float, float3,
//!   fixed strings, entity references)
//! - Linear prediction from two acknowledged baselines
//! - Change masks with one bit per field
//! - Tick-indexed snapshot history with modular tick ordering
//! - Budgeted snapshot packets with parallel per-ghost serialization
//!
//! # Example
//!
//! ```
//! use bitstream::CompressionModel;
//! use codec::{
//!     decode_snapshot_packet, encode_snapshot_packet, Baselines, ClientGhostHistory, CodecLimits,
//!     GhostCollection, GhostRef, GhostSendEntry, NetworkTick, Snapshot, SnapshotValue,
//! };
//! use schema::{FieldCodec, FieldDef, GhostCollectionDef, GhostTypeDef};
//! use std::num::NonZeroUsize;
//!
//! let def = GhostCollectionDef::builder()
//!     .ghost_type(GhostTypeDef::new("Door").field(FieldDef::new("open", FieldCodec::Bool)))
//!     .build()
//!     .unwrap();
//! let collection = GhostCollection::new(&def).unwrap();
//! let model = CompressionModel::default();
//! let limits = CodecLimits::default();
//!
//! let tick = NetworkTick::new(10);
//! let snapshot = Snapshot::new(tick, vec![SnapshotValue::Bool(1)]);
//! let entry = GhostSendEntry {
//!     ghost: GhostRef::new(1, NetworkTick::new(2)),
//!     type_index: 0,
//!     snapshot: &snapshot,
//!     baselines: Baselines::none(),
//! };
//! let packet = encode_snapshot_packet(&collection, tick, &[entry], &model, &limits).unwrap();
//!
//! let history = ClientGhostHistory::new(NonZeroUsize::new(limits.history_capacity).unwrap());
//! let decoded =
//!     decode_snapshot_packet(&collection, &packet.bytes, &model, &limits, &history).unwrap();
//! assert_eq!(decoded.ghosts[0].snapshot, snapshot);
//! ```

mod change_mask;
mod collection;
mod error;
mod field;
mod fixed_string;
mod ghost_map;
mod history;
mod limits;
mod packet;
mod predictor;
mod serializer;
mod snapshot;
mod types;

pub use change_mask::ChangeMask;
pub use collection::GhostCollection;
pub use error::{CodecError, CodecResult, HistoryError, LimitKind, ValueReason};
pub use field::{
    BoolField, EntityRefField, FieldCodec, FieldError, FieldKind, FixedStringField, Float3Field,
    FloatField, IntField, LiveValue, QuantizedFloat3Field, QuantizedFloatField, SmoothingConfig,
    SnapshotValue, UIntField,
};
pub use fixed_string::FixedString64;
pub use ghost_map::GhostMap;
pub use history::{BaselineSource, ClientGhostHistory, InterpolationPair, SnapshotHistory};
pub use limits::CodecLimits;
pub use packet::{
    decode_rpc_packet, decode_snapshot_packet, decode_snapshot_packet_from_packet,
    decode_snapshot_records, encode_rpc_packet, encode_snapshot_packet, DecodedGhost,
    DecodedPacket, DecodedRpcPacket, EncodedPacket, GhostSendEntry, RpcRecord, SnapshotRecord,
};
pub use predictor::DeltaPredictor;
pub use serializer::GhostSerializer;
pub use snapshot::{Baselines, Snapshot};
pub use types::{Entity, GhostRef, NetworkTick};
pub use wire::Limits as WireLimits;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = NetworkTick::new(0);
        let _ = GhostRef::NULL;
        let _ = Entity::new(0, 0);
        let _ = CodecLimits::default();
        let _ = FixedString64::EMPTY;
        let _ = GhostMap::new();
        let _ = ChangeMask::new(0);
        let _ = DeltaPredictor::disabled();
        let _ = Baselines::none();
        let _: WireLimits = CodecLimits::default().wire_limits();
    }

    #[test]
    fn shared_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GhostCollection>();
        assert_send_sync::<bitstream::CompressionModel>();
        assert_send_sync::<Snapshot>();
        assert_send_sync::<CodecError>();
    }
}
