//! Per-ghost-type serializer.

use bitstream::{BitReader, BitWriter, CompressionModel};
use schema::GhostTypeDef;

use crate::change_mask::ChangeMask;
use crate::error::{CodecError, CodecResult};
use crate::field::{FieldKind, LiveValue, SnapshotValue};
use crate::{Baselines, CodecLimits, GhostMap, NetworkTick, Snapshot};

/// Encodes and decodes snapshots for one ghost type.
///
/// Holds one [`FieldKind`] per field, in definition order.
#[derive(Debug, Clone)]
pub struct GhostSerializer {
    name: String,
    fields: Vec<FieldKind>,
    field_names: Vec<String>,
}

impl GhostSerializer {
    /// Builds the serializer for a ghost type definition.
    #[must_use]
    pub fn from_def(def: &GhostTypeDef, limits: &CodecLimits) -> Self {
        let max_string_bytes = limits.string_limit();
        Self {
            name: def.name.clone(),
            fields: def
                .fields
                .iter()
                .map(|field| FieldKind::from_def(field, max_string_bytes))
                .collect(),
            field_names: def.fields.iter().map(|field| field.name.clone()).collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldKind] {
        &self.fields
    }

    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Snapshot with every field at its zero value.
    #[must_use]
    pub fn zero_snapshot(&self, tick: NetworkTick) -> Snapshot {
        Snapshot::new(tick, self.fields.iter().map(FieldKind::zero).collect())
    }

    /// Captures live field values into a snapshot at `tick`.
    pub fn capture(
        &self,
        tick: NetworkTick,
        live: &[LiveValue],
        ghosts: &GhostMap,
    ) -> CodecResult<Snapshot> {
        self.check_len(live.len())?;
        let values = self
            .fields
            .iter()
            .zip(live)
            .enumerate()
            .map(|(index, (field, value))| field.capture(value, ghosts).map_err(|e| e.at(index)))
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Snapshot::new(tick, values))
    }

    /// Converts a snapshot back into live field values.
    pub fn apply(&self, snapshot: &Snapshot, ghosts: &GhostMap) -> CodecResult<Vec<LiveValue>> {
        self.check_len(snapshot.values.len())?;
        self.fields
            .iter()
            .zip(&snapshot.values)
            .enumerate()
            .map(|(index, (field, value))| field.apply(value, ghosts).map_err(|e| e.at(index)))
            .collect()
    }

    /// Presentation values between two snapshots.
    pub fn interpolate(
        &self,
        before: &Snapshot,
        after: &Snapshot,
        factor: f32,
        ghosts: &GhostMap,
    ) -> CodecResult<Vec<LiveValue>> {
        self.check_len(before.values.len())?;
        self.check_len(after.values.len())?;
        self.fields
            .iter()
            .zip(before.values.iter().zip(&after.values))
            .enumerate()
            .map(|(index, (field, (b, a)))| {
                field
                    .interpolate(b, a, factor, ghosts)
                    .map_err(|e| e.at(index))
            })
            .collect()
    }

    /// Predicted values for a snapshot at `tick`.
    ///
    /// Without `baseline1` every field predicts its zero value. Without a
    /// usable `baseline2` every field copies `baseline1`.
    pub fn predict(
        &self,
        tick: NetworkTick,
        baselines: &Baselines<'_>,
    ) -> CodecResult<Vec<SnapshotValue>> {
        let Some(baseline1) = baselines.baseline1 else {
            return Ok(self.fields.iter().map(FieldKind::zero).collect());
        };
        self.check_len(baseline1.values.len())?;
        let predictor = baselines.predictor(tick);
        let baseline2 = match baselines.baseline2 {
            Some(b2) if predictor.is_valid() => {
                self.check_len(b2.values.len())?;
                &b2.values
            }
            _ => &baseline1.values,
        };
        self.fields
            .iter()
            .zip(baseline1.values.iter().zip(baseline2))
            .enumerate()
            .map(|(index, (field, (b1, b2)))| {
                field.predict(&predictor, b1, b2).map_err(|e| e.at(index))
            })
            .collect()
    }

    /// Writes a snapshot as a change mask followed by the changed fields.
    ///
    /// The mask is computed against the predicted values, so a field that
    /// moved exactly as extrapolated costs one mask bit.
    pub fn serialize(
        &self,
        writer: &mut BitWriter,
        snapshot: &Snapshot,
        baselines: &Baselines<'_>,
        model: &CompressionModel,
    ) -> CodecResult<()> {
        let predicted = self.predict(snapshot.tick, baselines)?;
        let mask = ChangeMask::compute(&self.fields, &snapshot.values, &predicted)?;
        mask.write(writer)?;
        for (index, field) in self.fields.iter().enumerate() {
            if mask.get(index) {
                field
                    .write_delta(writer, &snapshot.values[index], &predicted[index], model)
                    .map_err(|e| e.at(index))?;
            }
        }
        Ok(())
    }

    /// Reads a snapshot written by [`GhostSerializer::serialize`].
    ///
    /// `baselines` must be the same snapshots the sender used.
    pub fn deserialize(
        &self,
        reader: &mut BitReader<'_>,
        tick: NetworkTick,
        baselines: &Baselines<'_>,
        model: &CompressionModel,
    ) -> CodecResult<Snapshot> {
        let predicted = self.predict(tick, baselines)?;
        let mask = ChangeMask::read(reader, self.fields.len())?;
        let values = self
            .fields
            .iter()
            .zip(predicted)
            .enumerate()
            .map(|(index, (field, predicted))| {
                if mask.get(index) {
                    field
                        .read_delta(reader, &predicted, model)
                        .map_err(|e| e.at(index))
                } else {
                    Ok(predicted)
                }
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Snapshot::new(tick, values))
    }

    /// Writes every field in full, with no baseline and no model.
    pub fn serialize_rpc(
        &self,
        writer: &mut BitWriter,
        values: &[SnapshotValue],
    ) -> CodecResult<()> {
        self.check_len(values.len())?;
        for (index, (field, value)) in self.fields.iter().zip(values).enumerate() {
            field.write_rpc(writer, value).map_err(|e| e.at(index))?;
        }
        Ok(())
    }

    pub fn deserialize_rpc(&self, reader: &mut BitReader<'_>) -> CodecResult<Vec<SnapshotValue>> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| field.read_rpc(reader).map_err(|e| e.at(index)))
            .collect()
    }

    /// Overwrites live values from a rollback backup.
    pub fn restore_from_backup(
        &self,
        live: &mut [LiveValue],
        backup: &[LiveValue],
    ) -> CodecResult<()> {
        self.check_len(live.len())?;
        self.check_len(backup.len())?;
        for (index, (field, (value, saved))) in
            self.fields.iter().zip(live.iter_mut().zip(backup)).enumerate()
        {
            field.restore(value, saved).map_err(|e| e.at(index))?;
        }
        Ok(())
    }

    /// Folds per-field prediction errors into `errors`, keeping the maximum.
    ///
    /// `errors` holds one slot per field.
    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    pub fn report_prediction_errors(
        &self,
        predicted: &[LiveValue],
        backup: &[LiveValue],
        errors: &mut [f32],
    ) -> CodecResult<()> {
        self.check_len(predicted.len())?;
        self.check_len(backup.len())?;
        self.check_len(errors.len())?;
        for (index, field) in self.fields.iter().enumerate() {
            let error = field
                .prediction_error(&predicted[index], &backup[index])
                .map_err(|e| e.at(index))?;
            errors[index] = errors[index].max(error);
        }
        Ok(())
    }

    /// `Type.field` names, one per field, matching the error slots.
    pub fn prediction_error_names(&self) -> impl Iterator<Item = String> + '_ {
        self.field_names
            .iter()
            .map(move |field| format!("{}.{field}", self.name))
    }

    fn check_len(&self, actual: usize) -> CodecResult<()> {
        if actual == self.fields.len() {
            Ok(())
        } else {
            Err(CodecError::FieldCountMismatch {
                expected: self.fields.len(),
                actual,
            })
        }
    }
}
