//! Deterministic collection hashing.

use blake3::Hasher;

use crate::{FieldCodec, FieldDef, GhostCollectionDef, Smoothing};

/// Computes a deterministic hash of a ghost collection layout.
///
/// Both peers compare this value from the packet header before decoding.
/// Field names are included; renaming a field changes the hash.
#[must_use]
pub fn collection_hash(collection: &GhostCollectionDef) -> u64 {
    let mut hasher = Hasher::new();
    write_len(&mut hasher, collection.ghost_types.len());

    for ghost in &collection.ghost_types {
        write_str(&mut hasher, &ghost.name);
        write_len(&mut hasher, ghost.fields.len());

        for field in &ghost.fields {
            write_field(&mut hasher, field);
        }
    }

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

fn write_field(hasher: &mut Hasher, field: &FieldDef) {
    write_str(hasher, &field.name);
    write_codec(hasher, field.codec);
    write_u8(
        hasher,
        match field.smoothing {
            Smoothing::Clamp => 0,
            Smoothing::Interpolate => 1,
        },
    );
    match field.max_smoothing_distance {
        None => write_u8(hasher, 0),
        Some(distance) => {
            write_u8(hasher, 1);
            write_u32(hasher, distance.to_bits());
        }
    }
}

fn write_codec(hasher: &mut Hasher, codec: FieldCodec) {
    match codec {
        FieldCodec::Bool => write_u8(hasher, 0),
        FieldCodec::Int => write_u8(hasher, 1),
        FieldCodec::UInt => write_u8(hasher, 2),
        FieldCodec::Float => write_u8(hasher, 3),
        FieldCodec::QuantizedFloat { scale } => {
            write_u8(hasher, 4);
            write_u32(hasher, scale);
        }
        FieldCodec::Float3 => write_u8(hasher, 5),
        FieldCodec::QuantizedFloat3 { scale } => {
            write_u8(hasher, 6);
            write_u32(hasher, scale);
        }
        FieldCodec::FixedString64 => write_u8(hasher, 7),
        FieldCodec::Entity => write_u8(hasher, 8),
    }
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn write_len(hasher: &mut Hasher, len: usize) {
    hasher.update(&(len as u64).to_le_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}
