#![no_main]

use std::num::NonZeroUsize;

use bitstream::CompressionModel;
use codec::{
    decode_rpc_packet, decode_snapshot_packet, ClientGhostHistory, CodecLimits, GhostCollection,
};
use libfuzzer_sys::fuzz_target;
use schema::{FieldCodec, FieldDef, GhostCollectionDef, GhostTypeDef};

fn collection() -> Option<GhostCollection> {
    let def = GhostCollectionDef::builder()
        .ghost_type(
            GhostTypeDef::new("Ship")
                .field(FieldDef::new("alive", FieldCodec::Bool))
                .field(FieldDef::new("hull", FieldCodec::Int))
                .field(FieldDef::new("pos", FieldCodec::quantized_float3(100)))
                .field(FieldDef::new("pilot", FieldCodec::FixedString64))
                .field(FieldDef::new("target", FieldCodec::Entity)),
        )
        .build()
        .ok()?;
    GhostCollection::new(&def).ok()
}

fuzz_target!(|data: &[u8]| {
    let Some(collection) = collection() else {
        return;
    };
    let model = CompressionModel::default();
    let limits = CodecLimits::for_testing();
    let history = ClientGhostHistory::new(NonZeroUsize::MIN);

    // Patch in the real collection hash so fuzzing reaches the record decoder.
    let mut packet = data.to_vec();
    if packet.len() >= wire::HEADER_SIZE {
        packet[8..16].copy_from_slice(&collection.hash().to_le_bytes());
    }

    let _ = decode_snapshot_packet(&collection, &packet, &model, &limits, &history);
    let _ = decode_rpc_packet(&collection, &packet, &limits);
    let _ = decode_snapshot_packet(&collection, data, &model, &limits, &history);
});
