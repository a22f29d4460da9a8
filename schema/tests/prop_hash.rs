use proptest::prelude::*;
use schema::{collection_hash, FieldCodec, FieldDef, GhostCollectionDef, GhostTypeDef};

fn codec() -> impl Strategy<Value = FieldCodec> {
    prop_oneof![
        Just(FieldCodec::Bool),
        Just(FieldCodec::Int),
        Just(FieldCodec::UInt),
        Just(FieldCodec::Float),
        (1u32..10_000).prop_map(FieldCodec::quantized_float),
        Just(FieldCodec::Float3),
        (1u32..10_000).prop_map(FieldCodec::quantized_float3),
        Just(FieldCodec::FixedString64),
        Just(FieldCodec::Entity),
    ]
}

fn collection(codecs: &[FieldCodec], suffix: &str) -> GhostCollectionDef {
    let ghost = codecs
        .iter()
        .enumerate()
        .fold(GhostTypeDef::new("Ghost"), |ghost, (i, codec)| {
            ghost.field(FieldDef::new(format!("f{i}{suffix}"), *codec))
        });
    GhostCollectionDef::builder().ghost_type(ghost).build().unwrap()
}

proptest! {
    #[test]
    fn prop_hash_is_deterministic(codecs in proptest::collection::vec(codec(), 1..12)) {
        prop_assert_eq!(
            collection_hash(&collection(&codecs, "")),
            collection_hash(&collection(&codecs, ""))
        );
    }

    #[test]
    fn prop_hash_tracks_field_names(codecs in proptest::collection::vec(codec(), 1..12)) {
        prop_assert_ne!(
            collection_hash(&collection(&codecs, "")),
            collection_hash(&collection(&codecs, "_renamed"))
        );
    }
}
