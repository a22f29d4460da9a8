//! Ghost type dispatch table.

use bitstream::{BitReader, BitWriter, CompressionModel};
use schema::{collection_hash, GhostCollectionDef};

use crate::error::{CodecError, CodecResult};
use crate::field::LiveValue;
use crate::{
    Baselines, CodecLimits, Entity, GhostMap, GhostRef, GhostSerializer, NetworkTick, Snapshot,
};

/// Serializers for every ghost type in a collection, indexed by type index.
///
/// Built once from a validated definition and read-only afterwards.
#[derive(Debug, Clone)]
pub struct GhostCollection {
    serializers: Vec<GhostSerializer>,
    error_offsets: Vec<usize>,
    hash: u64,
}

impl GhostCollection {
    /// Builds a collection with default limits.
    pub fn new(def: &GhostCollectionDef) -> CodecResult<Self> {
        Self::with_limits(def, &CodecLimits::default())
    }

    /// Validates `def` and builds one serializer per ghost type.
    pub fn with_limits(def: &GhostCollectionDef, limits: &CodecLimits) -> CodecResult<Self> {
        def.validate()?;
        let serializers: Vec<GhostSerializer> = def
            .ghost_types
            .iter()
            .map(|ghost| GhostSerializer::from_def(ghost, limits))
            .collect();
        let mut error_offsets = Vec::with_capacity(serializers.len());
        let mut offset = 0;
        for serializer in &serializers {
            error_offsets.push(offset);
            offset += serializer.field_count();
        }
        Ok(Self {
            serializers,
            error_offsets,
            hash: collection_hash(def),
        })
    }

    /// Number of ghost types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }

    /// Layout hash carried in packet headers.
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn serializers(&self) -> impl ExactSizeIterator<Item = &GhostSerializer> {
        self.serializers.iter()
    }

    /// Returns the serializer for `index`, or [`CodecError::InvalidGhostType`].
    pub fn serializer(&self, index: usize) -> CodecResult<&GhostSerializer> {
        self.serializers
            .get(index)
            .ok_or(CodecError::InvalidGhostType {
                index,
                len: self.serializers.len(),
            })
    }

    pub fn serialize(
        &self,
        index: usize,
        writer: &mut BitWriter,
        snapshot: &Snapshot,
        baselines: &Baselines<'_>,
        model: &CompressionModel,
    ) -> CodecResult<()> {
        self.serializer(index)?
            .serialize(writer, snapshot, baselines, model)
    }

    pub fn deserialize(
        &self,
        index: usize,
        reader: &mut BitReader<'_>,
        tick: NetworkTick,
        baselines: &Baselines<'_>,
        model: &CompressionModel,
    ) -> CodecResult<Snapshot> {
        self.serializer(index)?
            .deserialize(reader, tick, baselines, model)
    }

    /// Registers a newly received ghost and returns its initial live values.
    ///
    /// The ghost is mapped before its fields are applied, so a reference to
    /// itself resolves.
    pub fn spawn(
        &self,
        index: usize,
        ghost: GhostRef,
        entity: Entity,
        snapshot: &Snapshot,
        ghosts: &mut GhostMap,
    ) -> CodecResult<Vec<LiveValue>> {
        let serializer = self.serializer(index)?;
        ghosts.insert(ghost, entity);
        serializer.apply(snapshot, ghosts)
    }

    /// Total number of prediction error slots across all ghost types.
    #[must_use]
    pub fn prediction_error_count(&self) -> usize {
        self.serializers.iter().map(GhostSerializer::field_count).sum()
    }

    /// Comma-separated `Type.field` names, in error slot order.
    #[must_use]
    pub fn prediction_error_names(&self) -> String {
        self.serializers
            .iter()
            .flat_map(GhostSerializer::prediction_error_names)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Folds one ghost's prediction errors into the collection-wide slots.
    ///
    /// `errors` holds [`GhostCollection::prediction_error_count`] slots.
    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    pub fn report_prediction_errors(
        &self,
        index: usize,
        predicted: &[LiveValue],
        backup: &[LiveValue],
        errors: &mut [f32],
    ) -> CodecResult<()> {
        let serializer = self.serializer(index)?;
        let total = self.prediction_error_count();
        if errors.len() != total {
            return Err(CodecError::FieldCountMismatch {
                expected: total,
                actual: errors.len(),
            });
        }
        let start = self.error_offsets[index];
        let slots = &mut errors[start..start + serializer.field_count()];
        serializer.report_prediction_errors(predicted, backup, slots)
    }
}
