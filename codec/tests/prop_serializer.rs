use bitstream::{BitReader, BitWriter, CompressionModel};
use codec::{
    Baselines, FixedString64, GhostCollection, GhostRef, NetworkTick, Snapshot, SnapshotValue,
};
use proptest::prelude::*;
use schema::{FieldCodec, FieldDef, GhostCollectionDef, GhostTypeDef};

fn collection() -> GhostCollection {
    let def = GhostCollectionDef::builder()
        .ghost_type(
            GhostTypeDef::new("Everything")
                .field(FieldDef::new("flag", FieldCodec::Bool))
                .field(FieldDef::new("i", FieldCodec::Int))
                .field(FieldDef::new("u", FieldCodec::UInt))
                .field(FieldDef::new("f", FieldCodec::Float))
                .field(FieldDef::new("q", FieldCodec::quantized_float(100)))
                .field(FieldDef::new("v", FieldCodec::Float3))
                .field(FieldDef::new("qv", FieldCodec::quantized_float3(1000)))
                .field(FieldDef::new("s", FieldCodec::FixedString64))
                .field(FieldDef::new("e", FieldCodec::Entity)),
        )
        .build()
        .unwrap();
    GhostCollection::new(&def).unwrap()
}

fn finite() -> impl Strategy<Value = f32> {
    -1.0e6f32..1.0e6f32
}

fn values() -> impl Strategy<Value = Vec<SnapshotValue>> {
    (
        0u32..=1,
        any::<i32>(),
        any::<u32>(),
        finite(),
        any::<i32>(),
        [finite(), finite(), finite()],
        any::<[i32; 3]>(),
        "[a-z0-9é ]{0,24}",
        (any::<i32>(), any::<u32>()),
    )
        .prop_map(|(flag, i, u, f, q, v, qv, s, (id, spawn))| {
            vec![
                SnapshotValue::Bool(flag),
                SnapshotValue::Int(i),
                SnapshotValue::UInt(u),
                SnapshotValue::Float(f),
                SnapshotValue::Quantized(q),
                SnapshotValue::Float3(v),
                SnapshotValue::Quantized3(qv),
                SnapshotValue::String(FixedString64::new(&s)),
                SnapshotValue::Entity(GhostRef::new(id, NetworkTick::new(spawn))),
            ]
        })
}

proptest! {
    #[test]
    fn prop_serializer_roundtrip(
        current in values(),
        b1 in values(),
        b2 in values(),
        tick in any::<u32>(),
        gap1 in 1u32..16,
        gap2 in 1u32..16,
        baseline_count in 0usize..=2,
    ) {
        let collection = collection();
        let serializer = collection.serializer(0).unwrap();
        let model = CompressionModel::default();

        let tick = NetworkTick::new(tick);
        let current = Snapshot::new(tick, current);
        let b1 = Snapshot::new(tick.wrapping_sub(gap1), b1);
        let b2 = Snapshot::new(b1.tick.wrapping_sub(gap2), b2);
        let baselines = match baseline_count {
            0 => Baselines::none(),
            1 => Baselines::one(&b1),
            _ => Baselines::two(&b1, &b2),
        };

        let mut writer = BitWriter::new();
        serializer.serialize(&mut writer, &current, &baselines, &model).unwrap();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let decoded = serializer.deserialize(&mut reader, tick, &baselines, &model).unwrap();
        prop_assert_eq!(decoded, current);
        prop_assert!(reader.bits_remaining() < 8);
    }

    #[test]
    fn prop_rpc_roundtrip(current in values()) {
        let collection = collection();
        let serializer = collection.serializer(0).unwrap();

        let mut writer = BitWriter::new();
        serializer.serialize_rpc(&mut writer, &current).unwrap();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(serializer.deserialize_rpc(&mut reader).unwrap(), current);
    }
}
