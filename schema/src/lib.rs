//! Ghost type and field codec definitions for the ghostline codec.
//!
//! This crate defines how ghost state is laid out for replication:
//! - Ghost types as ordered lists of named fields
//! - Field codecs (bool, integers, floats, quantized floats, float3, fixed strings, entity refs)
//! - Presentation smoothing per field
//! - Deterministic collection hashing
//!
//! # Design Principles
//!
//! - **Runtime-first** - Collections are built at runtime (or loaded from JSON with `serde`).
//! - **Validated once** - A [`GhostCollectionDef`] is checked on construction and never mutated.
//! - **Deterministic hashing** - The hash is stable given the same definition.
//!
//! # Example
//!
//! ```
//! use schema::{collection_hash, FieldCodec, FieldDef, GhostCollectionDef, GhostTypeDef};
//!
//! let collection = GhostCollectionDef::builder()
//!     .ghost_type(
//!         GhostTypeDef::new("Player")
//!             .field(FieldDef::interpolated("position", FieldCodec::quantized_float3(100)))
//!             .field(FieldDef::new("health", FieldCodec::Int)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_ne!(collection_hash(&collection), 0);
//! ```

mod error;
mod field;
mod ghost;
mod hash;

pub use error::{SchemaError, SchemaResult};
pub use field::{
    FieldCodec, FieldDef, Smoothing, FIXED_STRING_CAPACITY, FIXED_STRING_MAX_BYTES,
};
pub use ghost::{
    GhostCollectionBuilder, GhostCollectionDef, GhostTypeDef, MAX_FIELDS_PER_GHOST,
    MAX_GHOST_TYPES,
};
pub use hash::collection_hash;
