use std::hint::black_box;
use std::num::NonZeroUsize;

use bitstream::CompressionModel;
use codec::{
    decode_snapshot_packet, encode_snapshot_packet, Baselines, ClientGhostHistory, CodecLimits,
    FixedString64, GhostCollection, GhostRef, GhostSendEntry, NetworkTick, Snapshot,
    SnapshotValue,
};
use criterion::*;
use schema::{FieldCodec, FieldDef, GhostCollectionDef, GhostTypeDef};

const GHOSTS: usize = 256;

fn collection() -> GhostCollection {
    let def = GhostCollectionDef::builder()
        .ghost_type(
            GhostTypeDef::new("Unit")
                .field(FieldDef::new("hp", FieldCodec::Int))
                .field(FieldDef::interpolated("pos", FieldCodec::quantized_float3(100)))
                .field(FieldDef::interpolated("yaw", FieldCodec::quantized_float(100)))
                .field(FieldDef::new("name", FieldCodec::FixedString64))
                .field(FieldDef::new("target", FieldCodec::Entity)),
        )
        .build()
        .expect("valid collection");
    GhostCollection::new(&def).expect("collection builds")
}

fn unit(tick: u32, id: i32) -> Snapshot {
    let step = tick as i32;
    Snapshot::new(
        NetworkTick::new(tick),
        vec![
            SnapshotValue::Int(100),
            SnapshotValue::Quantized3([id * 100 + step * 5, 0, step * 3]),
            SnapshotValue::Quantized(step * 7 % 628),
            SnapshotValue::String(FixedString64::new("grunt")),
            SnapshotValue::Entity(GhostRef::NULL),
        ],
    )
}

fn packet_benchmark(c: &mut Criterion) {
    let collection = collection();
    let model = CompressionModel::default();
    let limits = CodecLimits::unlimited();

    let b2: Vec<Snapshot> = (0..GHOSTS).map(|i| unit(8, i as i32)).collect();
    let b1: Vec<Snapshot> = (0..GHOSTS).map(|i| unit(9, i as i32)).collect();
    let current: Vec<Snapshot> = (0..GHOSTS).map(|i| unit(10, i as i32)).collect();

    let mut group = c.benchmark_group("snapshot_packet");

    let full: Vec<GhostSendEntry<'_>> = current
        .iter()
        .enumerate()
        .map(|(i, snapshot)| GhostSendEntry {
            ghost: GhostRef::new(i as i32, NetworkTick::new(1)),
            type_index: 0,
            snapshot,
            baselines: Baselines::none(),
        })
        .collect();
    group.bench_function("encode_256_no_baseline", |b| {
        b.iter(|| {
            let packet =
                encode_snapshot_packet(&collection, NetworkTick::new(10), &full, &model, &limits)
                    .expect("encode");
            black_box(packet);
        });
    });

    let predicted: Vec<GhostSendEntry<'_>> = current
        .iter()
        .enumerate()
        .map(|(i, snapshot)| GhostSendEntry {
            ghost: GhostRef::new(i as i32, NetworkTick::new(1)),
            type_index: 0,
            snapshot,
            baselines: Baselines::two(&b1[i], &b2[i]),
        })
        .collect();
    group.bench_function("encode_256_predicted", |b| {
        b.iter(|| {
            let packet = encode_snapshot_packet(
                &collection,
                NetworkTick::new(10),
                &predicted,
                &model,
                &limits,
            )
            .expect("encode");
            black_box(packet);
        });
    });

    let mut history = ClientGhostHistory::new(NonZeroUsize::new(4).expect("non-zero"));
    for (i, (old, new)) in b2.iter().zip(&b1).enumerate() {
        let ghost = GhostRef::new(i as i32, NetworkTick::new(1));
        history.insert(ghost, old.clone()).expect("in order");
        history.insert(ghost, new.clone()).expect("in order");
    }
    let bytes =
        encode_snapshot_packet(&collection, NetworkTick::new(10), &predicted, &model, &limits)
            .expect("encode")
            .bytes;
    group.bench_function("decode_256_predicted", |b| {
        b.iter(|| {
            let decoded = decode_snapshot_packet(&collection, &bytes, &model, &limits, &history)
                .expect("decode");
            black_box(decoded);
        });
    });

    group.finish();
}

criterion_group!(benches, packet_benchmark);
criterion_main!(benches);
