#![cfg(feature = "serde")]

use schema::{collection_hash, FieldCodec, GhostCollectionDef, Smoothing};

const PLAYER_JSON: &str = r#"{
    "ghost_types": [
        {
            "name": "Player",
            "fields": [
                { "name": "alive", "codec": { "type": "bool" } },
                {
                    "name": "position",
                    "codec": { "type": "quantized_float3", "scale": 100 },
                    "smoothing": "interpolate",
                    "max_smoothing_distance": 10.0
                },
                { "name": "target", "codec": { "type": "entity" } }
            ]
        }
    ]
}"#;

#[test]
fn loads_collection_from_json() {
    let collection: GhostCollectionDef = serde_json::from_str(PLAYER_JSON).unwrap();
    collection.validate().unwrap();

    let player = &collection.ghost_types[0];
    assert_eq!(player.fields.len(), 3);
    assert_eq!(player.fields[0].smoothing, Smoothing::Clamp);
    assert_eq!(player.fields[1].codec, FieldCodec::quantized_float3(100));
    assert_eq!(player.fields[1].max_smoothing_distance, Some(10.0));
    assert_eq!(player.fields[2].codec, FieldCodec::Entity);
}

#[test]
fn json_roundtrip_preserves_hash() {
    let collection: GhostCollectionDef = serde_json::from_str(PLAYER_JSON).unwrap();
    let text = serde_json::to_string(&collection).unwrap();
    let reloaded: GhostCollectionDef = serde_json::from_str(&text).unwrap();
    assert_eq!(collection_hash(&collection), collection_hash(&reloaded));
}

#[test]
fn invalid_json_collection_fails_validation() {
    let json = r#"{ "ghost_types": [
        { "name": "P", "fields": [
            { "name": "hp", "codec": { "type": "int" }, "smoothing": "interpolate" }
        ] }
    ] }"#;
    let collection: GhostCollectionDef = serde_json::from_str(json).unwrap();
    assert!(collection.validate().is_err());
}
