//! Per-field-type codecs.
//!
//! Each codec converts one field between its live (component-side) form,
//! its snapshot form, and the wire. [`FieldKind`] dispatches to the concrete
//! codec chosen by a [`schema::FieldDef`].

use std::fmt;

use bitstream::{BitError, BitReader, BitResult, BitWriter, CompressionModel};
use schema::{FieldCodec as CodecDef, FieldDef, Smoothing, FIXED_STRING_MAX_BYTES};
use tracing::trace;

use crate::error::{CodecError, ValueReason};
use crate::{DeltaPredictor, Entity, FixedString64, GhostMap, GhostRef, NetworkTick};

/// Live (component-side) value of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiveValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Float3([f32; 3]),
    String(FixedString64),
    /// `None` when the referenced ghost has no local entity.
    Entity(Option<Entity>),
}

impl LiveValue {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Float3(_) => "float3",
            Self::String(_) => "string",
            Self::Entity(_) => "entity",
        }
    }
}

/// Snapshot-side value of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapshotValue {
    /// 0 or 1.
    Bool(u32),
    Int(i32),
    UInt(u32),
    Float(f32),
    Quantized(i32),
    Float3([f32; 3]),
    Quantized3([i32; 3]),
    String(FixedString64),
    Entity(GhostRef),
}

impl SnapshotValue {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Quantized(_) => "quantized",
            Self::Float3(_) => "float3",
            Self::Quantized3(_) => "quantized3",
            Self::String(_) => "string",
            Self::Entity(_) => "entity",
        }
    }
}

impl fmt::Display for SnapshotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) | Self::UInt(v) => write!(f, "{v}"),
            Self::Int(v) | Self::Quantized(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Float3([x, y, z]) => write!(f, "({x}, {y}, {z})"),
            Self::Quantized3([x, y, z]) => write!(f, "({x}, {y}, {z})"),
            Self::String(s) => write!(f, "{:?}", s.as_str()),
            Self::Entity(ghost) if ghost.is_null() => write!(f, "null"),
            Self::Entity(ghost) => write!(f, "{ghost}"),
        }
    }
}

/// Failure inside a single field codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Bits(BitError),
    Value(ValueReason),
}

impl FieldError {
    /// Attaches the field index.
    #[must_use]
    pub fn at(self, field: usize) -> CodecError {
        match self {
            Self::Bits(err) => CodecError::Bitstream(err),
            Self::Value(reason) => CodecError::InvalidValue { field, reason },
        }
    }
}

impl From<BitError> for FieldError {
    fn from(err: BitError) -> Self {
        Self::Bits(err)
    }
}

impl From<ValueReason> for FieldError {
    fn from(reason: ValueReason) -> Self {
        Self::Value(reason)
    }
}

/// Converts one field between live, snapshot and wire form.
pub trait FieldCodec {
    type Live: Copy;
    type Snap: Copy + PartialEq + Default;

    /// Reads the live value into snapshot form.
    fn capture(&self, live: &Self::Live, ghosts: &GhostMap) -> Self::Snap;

    /// Converts a snapshot value back to live form.
    fn apply(&self, snap: &Self::Snap, ghosts: &GhostMap) -> Self::Live;

    /// Presentation value between two snapshots. Defaults to `before`.
    fn interpolate(
        &self,
        before: &Self::Snap,
        after: &Self::Snap,
        factor: f32,
        ghosts: &GhostMap,
    ) -> Self::Live {
        let _ = (after, factor);
        self.apply(before, ghosts)
    }

    /// Predicted value from two baselines. Defaults to copying `baseline1`.
    fn predict(
        &self,
        predictor: &DeltaPredictor,
        baseline1: &Self::Snap,
        baseline2: &Self::Snap,
    ) -> Self::Snap {
        let _ = (predictor, baseline2);
        *baseline1
    }

    /// Change bit for this field.
    fn changed(&self, current: &Self::Snap, baseline: &Self::Snap) -> bool {
        current != baseline
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &Self::Snap,
        predicted: &Self::Snap,
        model: &CompressionModel,
    ) -> BitResult<()>;

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        predicted: &Self::Snap,
        model: &CompressionModel,
    ) -> Result<Self::Snap, FieldError>;

    /// Full value, no baseline and no model.
    fn write_rpc(&self, writer: &mut BitWriter, value: &Self::Snap) -> BitResult<()>;

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<Self::Snap, FieldError>;

    /// Overwrites the live value from a rollback backup.
    fn restore(&self, live: &mut Self::Live, backup: &Self::Live) {
        *live = *backup;
    }

    /// Magnitude of the divergence between a predicted value and its backup.
    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &Self::Live, backup: &Self::Live) -> f32;
}

/// Presentation smoothing settings for float-like codecs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothingConfig {
    pub mode: Smoothing,
    pub max_distance: Option<f32>,
}

impl SmoothingConfig {
    fn from_def(def: &FieldDef) -> Self {
        Self {
            mode: def.smoothing,
            max_distance: def.max_smoothing_distance,
        }
    }

    fn snaps(&self, distance: f32) -> bool {
        self.max_distance.is_some_and(|max| distance > max)
    }

    fn blend(&self, before: f32, after: f32, factor: f32) -> f32 {
        match self.mode {
            Smoothing::Clamp => before,
            Smoothing::Interpolate if self.snaps((after - before).abs()) => after,
            Smoothing::Interpolate => lerp(before, after, clamp_factor(factor)),
        }
    }

    fn blend3(&self, before: [f32; 3], after: [f32; 3], factor: f32) -> [f32; 3] {
        match self.mode {
            Smoothing::Clamp => before,
            Smoothing::Interpolate if self.snaps(distance3(before, after)) => after,
            Smoothing::Interpolate => {
                let t = clamp_factor(factor);
                [
                    lerp(before[0], after[0], t),
                    lerp(before[1], after[1], t),
                    lerp(before[2], after[2], t),
                ]
            }
        }
    }
}

fn clamp_factor(factor: f32) -> f32 {
    if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, 1.0)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn distance3(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

fn quantize(value: f32, scale: u32) -> i32 {
    (value * scale as f32).round() as i32
}

fn dequantize(value: i32, scale: u32) -> f32 {
    value as f32 / scale as f32
}

fn bits_differ3(a: [f32; 3], b: [f32; 3]) -> bool {
    a.iter().zip(b).any(|(x, y)| x.to_bits() != y.to_bits())
}

fn write_raw_i32(writer: &mut BitWriter, value: i32) -> BitResult<()> {
    writer.write_bits(u64::from(value as u32), 32)
}

fn read_raw_u32(reader: &mut BitReader<'_>) -> BitResult<u32> {
    Ok(reader.read_bits(32)? as u32)
}

/// Boolean, stored as 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoolField;

impl FieldCodec for BoolField {
    type Live = bool;
    type Snap = u32;

    fn capture(&self, live: &bool, _ghosts: &GhostMap) -> u32 {
        u32::from(*live)
    }

    fn apply(&self, snap: &u32, _ghosts: &GhostMap) -> bool {
        *snap != 0
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &u32,
        _predicted: &u32,
        model: &CompressionModel,
    ) -> BitResult<()> {
        writer.write_packed_u32(*value, model)
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        _predicted: &u32,
        model: &CompressionModel,
    ) -> Result<u32, FieldError> {
        let value = reader.read_packed_u32(model)?;
        if value > 1 {
            return Err(ValueReason::BoolOutOfRange { value }.into());
        }
        Ok(value)
    }

    fn write_rpc(&self, writer: &mut BitWriter, value: &u32) -> BitResult<()> {
        writer.write_bit(*value != 0);
        Ok(())
    }

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<u32, FieldError> {
        Ok(u32::from(reader.read_bit()?))
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &bool, backup: &bool) -> f32 {
        if predicted == backup {
            0.0
        } else {
            1.0
        }
    }
}

/// Signed integer, extrapolated and delta-packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntField;

impl FieldCodec for IntField {
    type Live = i32;
    type Snap = i32;

    fn capture(&self, live: &i32, _ghosts: &GhostMap) -> i32 {
        *live
    }

    fn apply(&self, snap: &i32, _ghosts: &GhostMap) -> i32 {
        *snap
    }

    fn predict(&self, predictor: &DeltaPredictor, baseline1: &i32, baseline2: &i32) -> i32 {
        predictor.predict_i32(*baseline1, *baseline2)
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &i32,
        predicted: &i32,
        model: &CompressionModel,
    ) -> BitResult<()> {
        writer.write_packed_i32_delta(*value, *predicted, model)
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        predicted: &i32,
        model: &CompressionModel,
    ) -> Result<i32, FieldError> {
        Ok(reader.read_packed_i32_delta(*predicted, model)?)
    }

    fn write_rpc(&self, writer: &mut BitWriter, value: &i32) -> BitResult<()> {
        write_raw_i32(writer, *value)
    }

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<i32, FieldError> {
        Ok(read_raw_u32(reader)? as i32)
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &i32, backup: &i32) -> f32 {
        (i64::from(*predicted) - i64::from(*backup)).abs() as f32
    }
}

/// Unsigned integer, extrapolated and delta-packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UIntField;

impl FieldCodec for UIntField {
    type Live = u32;
    type Snap = u32;

    fn capture(&self, live: &u32, _ghosts: &GhostMap) -> u32 {
        *live
    }

    fn apply(&self, snap: &u32, _ghosts: &GhostMap) -> u32 {
        *snap
    }

    fn predict(&self, predictor: &DeltaPredictor, baseline1: &u32, baseline2: &u32) -> u32 {
        predictor.predict_u32(*baseline1, *baseline2)
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &u32,
        predicted: &u32,
        model: &CompressionModel,
    ) -> BitResult<()> {
        writer.write_packed_u32_delta(*value, *predicted, model)
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        predicted: &u32,
        model: &CompressionModel,
    ) -> Result<u32, FieldError> {
        Ok(reader.read_packed_u32_delta(*predicted, model)?)
    }

    fn write_rpc(&self, writer: &mut BitWriter, value: &u32) -> BitResult<()> {
        writer.write_bits(u64::from(*value), 32)
    }

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<u32, FieldError> {
        Ok(read_raw_u32(reader)?)
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &u32, backup: &u32) -> f32 {
        predicted.abs_diff(*backup) as f32
    }
}

/// Unquantized float. Never extrapolated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatField {
    pub smoothing: SmoothingConfig,
}

impl FieldCodec for FloatField {
    type Live = f32;
    type Snap = f32;

    fn capture(&self, live: &f32, _ghosts: &GhostMap) -> f32 {
        *live
    }

    fn apply(&self, snap: &f32, _ghosts: &GhostMap) -> f32 {
        *snap
    }

    fn interpolate(&self, before: &f32, after: &f32, factor: f32, _ghosts: &GhostMap) -> f32 {
        self.smoothing.blend(*before, *after, factor)
    }

    fn changed(&self, current: &f32, baseline: &f32) -> bool {
        current.to_bits() != baseline.to_bits()
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &f32,
        predicted: &f32,
        _model: &CompressionModel,
    ) -> BitResult<()> {
        writer.write_packed_f32_delta(*value, *predicted)
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        predicted: &f32,
        _model: &CompressionModel,
    ) -> Result<f32, FieldError> {
        Ok(reader.read_packed_f32_delta(*predicted)?)
    }

    fn write_rpc(&self, writer: &mut BitWriter, value: &f32) -> BitResult<()> {
        writer.write_f32(*value)
    }

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<f32, FieldError> {
        Ok(reader.read_f32()?)
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &f32, backup: &f32) -> f32 {
        (predicted - backup).abs()
    }
}

/// Float stored as `round(value * scale)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizedFloatField {
    pub scale: u32,
    pub smoothing: SmoothingConfig,
}

impl FieldCodec for QuantizedFloatField {
    type Live = f32;
    type Snap = i32;

    fn capture(&self, live: &f32, _ghosts: &GhostMap) -> i32 {
        quantize(*live, self.scale)
    }

    fn apply(&self, snap: &i32, _ghosts: &GhostMap) -> f32 {
        dequantize(*snap, self.scale)
    }

    fn interpolate(&self, before: &i32, after: &i32, factor: f32, _ghosts: &GhostMap) -> f32 {
        self.smoothing.blend(
            dequantize(*before, self.scale),
            dequantize(*after, self.scale),
            factor,
        )
    }

    fn predict(&self, predictor: &DeltaPredictor, baseline1: &i32, baseline2: &i32) -> i32 {
        predictor.predict_i32(*baseline1, *baseline2)
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &i32,
        predicted: &i32,
        model: &CompressionModel,
    ) -> BitResult<()> {
        writer.write_packed_i32_delta(*value, *predicted, model)
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        predicted: &i32,
        model: &CompressionModel,
    ) -> Result<i32, FieldError> {
        Ok(reader.read_packed_i32_delta(*predicted, model)?)
    }

    fn write_rpc(&self, writer: &mut BitWriter, value: &i32) -> BitResult<()> {
        write_raw_i32(writer, *value)
    }

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<i32, FieldError> {
        Ok(read_raw_u32(reader)? as i32)
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &f32, backup: &f32) -> f32 {
        (predicted - backup).abs()
    }
}

/// Unquantized 3-component vector. Never extrapolated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Float3Field {
    pub smoothing: SmoothingConfig,
}

impl FieldCodec for Float3Field {
    type Live = [f32; 3];
    type Snap = [f32; 3];

    fn capture(&self, live: &[f32; 3], _ghosts: &GhostMap) -> [f32; 3] {
        *live
    }

    fn apply(&self, snap: &[f32; 3], _ghosts: &GhostMap) -> [f32; 3] {
        *snap
    }

    fn interpolate(
        &self,
        before: &[f32; 3],
        after: &[f32; 3],
        factor: f32,
        _ghosts: &GhostMap,
    ) -> [f32; 3] {
        self.smoothing.blend3(*before, *after, factor)
    }

    fn changed(&self, current: &[f32; 3], baseline: &[f32; 3]) -> bool {
        bits_differ3(*current, *baseline)
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &[f32; 3],
        predicted: &[f32; 3],
        _model: &CompressionModel,
    ) -> BitResult<()> {
        for (v, p) in value.iter().zip(predicted) {
            writer.write_packed_f32_delta(*v, *p)?;
        }
        Ok(())
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        predicted: &[f32; 3],
        _model: &CompressionModel,
    ) -> Result<[f32; 3], FieldError> {
        let mut out = [0.0; 3];
        for (slot, p) in out.iter_mut().zip(predicted) {
            *slot = reader.read_packed_f32_delta(*p)?;
        }
        Ok(out)
    }

    fn write_rpc(&self, writer: &mut BitWriter, value: &[f32; 3]) -> BitResult<()> {
        value.iter().try_for_each(|v| writer.write_f32(*v))
    }

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<[f32; 3], FieldError> {
        Ok([reader.read_f32()?, reader.read_f32()?, reader.read_f32()?])
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &[f32; 3], backup: &[f32; 3]) -> f32 {
        distance3(*predicted, *backup)
    }
}

/// 3-component vector, each component stored as `round(value * scale)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizedFloat3Field {
    pub scale: u32,
    pub smoothing: SmoothingConfig,
}

impl FieldCodec for QuantizedFloat3Field {
    type Live = [f32; 3];
    type Snap = [i32; 3];

    fn capture(&self, live: &[f32; 3], _ghosts: &GhostMap) -> [i32; 3] {
        live.map(|v| quantize(v, self.scale))
    }

    fn apply(&self, snap: &[i32; 3], _ghosts: &GhostMap) -> [f32; 3] {
        snap.map(|v| dequantize(v, self.scale))
    }

    fn interpolate(
        &self,
        before: &[i32; 3],
        after: &[i32; 3],
        factor: f32,
        _ghosts: &GhostMap,
    ) -> [f32; 3] {
        self.smoothing.blend3(
            before.map(|v| dequantize(v, self.scale)),
            after.map(|v| dequantize(v, self.scale)),
            factor,
        )
    }

    fn predict(
        &self,
        predictor: &DeltaPredictor,
        baseline1: &[i32; 3],
        baseline2: &[i32; 3],
    ) -> [i32; 3] {
        [
            predictor.predict_i32(baseline1[0], baseline2[0]),
            predictor.predict_i32(baseline1[1], baseline2[1]),
            predictor.predict_i32(baseline1[2], baseline2[2]),
        ]
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &[i32; 3],
        predicted: &[i32; 3],
        model: &CompressionModel,
    ) -> BitResult<()> {
        for (v, p) in value.iter().zip(predicted) {
            writer.write_packed_i32_delta(*v, *p, model)?;
        }
        Ok(())
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        predicted: &[i32; 3],
        model: &CompressionModel,
    ) -> Result<[i32; 3], FieldError> {
        let mut out = [0; 3];
        for (slot, p) in out.iter_mut().zip(predicted) {
            *slot = reader.read_packed_i32_delta(*p, model)?;
        }
        Ok(out)
    }

    fn write_rpc(&self, writer: &mut BitWriter, value: &[i32; 3]) -> BitResult<()> {
        value.iter().try_for_each(|v| write_raw_i32(writer, *v))
    }

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<[i32; 3], FieldError> {
        let mut out = [0; 3];
        for slot in &mut out {
            *slot = read_raw_u32(reader)? as i32;
        }
        Ok(out)
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &[f32; 3], backup: &[f32; 3]) -> f32 {
        distance3(*predicted, *backup)
    }
}

/// UTF-8 string in 64-byte storage, always sent whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStringField {
    pub max_bytes: usize,
}

impl Default for FixedStringField {
    fn default() -> Self {
        Self {
            max_bytes: FIXED_STRING_MAX_BYTES,
        }
    }
}

impl FixedStringField {
    fn write_bytes(writer: &mut BitWriter, value: &FixedString64) -> BitResult<()> {
        value
            .as_bytes()
            .iter()
            .try_for_each(|byte| writer.write_bits(u64::from(*byte), 8))
    }

    fn read_bytes(
        &self,
        reader: &mut BitReader<'_>,
        len: usize,
    ) -> Result<FixedString64, FieldError> {
        let max = self.max_bytes.min(FIXED_STRING_MAX_BYTES);
        if len > max {
            return Err(ValueReason::StringTooLong { len, max }.into());
        }
        let mut buf = [0u8; FIXED_STRING_MAX_BYTES];
        for slot in &mut buf[..len] {
            *slot = reader.read_bits(8)? as u8;
        }
        Ok(FixedString64::from_utf8(&buf[..len])?)
    }
}

impl FieldCodec for FixedStringField {
    type Live = FixedString64;
    type Snap = FixedString64;

    fn capture(&self, live: &FixedString64, _ghosts: &GhostMap) -> FixedString64 {
        FixedString64::truncated(live.as_str(), self.max_bytes)
    }

    fn apply(&self, snap: &FixedString64, _ghosts: &GhostMap) -> FixedString64 {
        *snap
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &FixedString64,
        _predicted: &FixedString64,
        model: &CompressionModel,
    ) -> BitResult<()> {
        writer.write_packed_u32(value.len() as u32, model)?;
        Self::write_bytes(writer, value)
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        _predicted: &FixedString64,
        model: &CompressionModel,
    ) -> Result<FixedString64, FieldError> {
        let len = reader.read_packed_u32(model)? as usize;
        self.read_bytes(reader, len)
    }

    fn write_rpc(&self, writer: &mut BitWriter, value: &FixedString64) -> BitResult<()> {
        writer.write_bits(value.len() as u64, 8)?;
        Self::write_bytes(writer, value)
    }

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<FixedString64, FieldError> {
        let len = reader.read_bits(8)? as usize;
        self.read_bytes(reader, len)
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &FixedString64, backup: &FixedString64) -> f32 {
        if predicted == backup {
            0.0
        } else {
            1.0
        }
    }
}

/// Reference to another ghost, keyed by ghost id and spawn tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityRefField;

impl FieldCodec for EntityRefField {
    type Live = Option<Entity>;
    type Snap = GhostRef;

    fn capture(&self, live: &Option<Entity>, ghosts: &GhostMap) -> GhostRef {
        live.and_then(|entity| ghosts.ghost_for_entity(&entity))
            .unwrap_or(GhostRef::NULL)
    }

    fn apply(&self, snap: &GhostRef, ghosts: &GhostMap) -> Option<Entity> {
        let entity = ghosts.entity_for_ghost(snap);
        if entity.is_none() && !snap.is_null() {
            trace!(
                ghost_id = snap.ghost_id,
                spawn_tick = snap.spawn_tick.raw(),
                "entity reference target not found"
            );
        }
        entity
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &GhostRef,
        predicted: &GhostRef,
        model: &CompressionModel,
    ) -> BitResult<()> {
        writer.write_packed_i32_delta(value.ghost_id, predicted.ghost_id, model)?;
        writer.write_packed_u32_delta(
            value.spawn_tick.raw(),
            predicted.spawn_tick.raw(),
            model,
        )
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        predicted: &GhostRef,
        model: &CompressionModel,
    ) -> Result<GhostRef, FieldError> {
        let ghost_id = reader.read_packed_i32_delta(predicted.ghost_id, model)?;
        let spawn_tick = reader.read_packed_u32_delta(predicted.spawn_tick.raw(), model)?;
        Ok(GhostRef::new(ghost_id, NetworkTick::new(spawn_tick)))
    }

    fn write_rpc(&self, writer: &mut BitWriter, value: &GhostRef) -> BitResult<()> {
        write_raw_i32(writer, value.ghost_id)?;
        writer.write_bits(u64::from(value.spawn_tick.raw()), 32)
    }

    fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<GhostRef, FieldError> {
        let ghost_id = read_raw_u32(reader)? as i32;
        let spawn_tick = read_raw_u32(reader)?;
        Ok(GhostRef::new(ghost_id, NetworkTick::new(spawn_tick)))
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    fn prediction_error(&self, predicted: &Option<Entity>, backup: &Option<Entity>) -> f32 {
        if predicted == backup {
            0.0
        } else {
            1.0
        }
    }
}

/// Bridges a concrete codec to the dynamic value enums.
trait Erased: FieldCodec {
    const NAME: &'static str;

    fn live_in(value: &LiveValue) -> Option<Self::Live>;
    fn live_out(value: Self::Live) -> LiveValue;
    fn snap_in(value: &SnapshotValue) -> Option<Self::Snap>;
    fn snap_out(value: Self::Snap) -> SnapshotValue;

    fn live_arg(&self, value: &LiveValue) -> Result<Self::Live, ValueReason> {
        Self::live_in(value).ok_or(ValueReason::TypeMismatch {
            expected: Self::NAME,
            found: value.type_name(),
        })
    }

    fn snap_arg(&self, value: &SnapshotValue) -> Result<Self::Snap, ValueReason> {
        Self::snap_in(value).ok_or(ValueReason::TypeMismatch {
            expected: Self::NAME,
            found: value.type_name(),
        })
    }

    fn live_ret(&self, value: Self::Live) -> LiveValue {
        Self::live_out(value)
    }

    fn snap_ret(&self, value: Self::Snap) -> SnapshotValue {
        Self::snap_out(value)
    }
}

macro_rules! erased {
    ($codec:ty, $name:literal, $live:ident, $snap:ident) => {
        impl Erased for $codec {
            const NAME: &'static str = $name;

            fn live_in(value: &LiveValue) -> Option<Self::Live> {
                match value {
                    LiveValue::$live(v) => Some(*v),
                    _ => None,
                }
            }

            fn live_out(value: Self::Live) -> LiveValue {
                LiveValue::$live(value)
            }

            fn snap_in(value: &SnapshotValue) -> Option<Self::Snap> {
                match value {
                    SnapshotValue::$snap(v) => Some(*v),
                    _ => None,
                }
            }

            fn snap_out(value: Self::Snap) -> SnapshotValue {
                SnapshotValue::$snap(value)
            }
        }
    };
}

erased!(BoolField, "bool", Bool, Bool);
erased!(IntField, "int", Int, Int);
erased!(UIntField, "uint", UInt, UInt);
erased!(FloatField, "float", Float, Float);
erased!(QuantizedFloatField, "quantized_float", Float, Quantized);
erased!(Float3Field, "float3", Float3, Float3);
erased!(QuantizedFloat3Field, "quantized_float3", Float3, Quantized3);
erased!(FixedStringField, "fixed_string64", String, String);
erased!(EntityRefField, "entity", Entity, Entity);

/// Runtime selection of a field codec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Bool(BoolField),
    Int(IntField),
    UInt(UIntField),
    Float(FloatField),
    QuantizedFloat(QuantizedFloatField),
    Float3(Float3Field),
    QuantizedFloat3(QuantizedFloat3Field),
    FixedString(FixedStringField),
    EntityRef(EntityRefField),
}

macro_rules! dispatch {
    ($kind:expr, $c:ident => $body:expr) => {
        match $kind {
            FieldKind::Bool($c) => $body,
            FieldKind::Int($c) => $body,
            FieldKind::UInt($c) => $body,
            FieldKind::Float($c) => $body,
            FieldKind::QuantizedFloat($c) => $body,
            FieldKind::Float3($c) => $body,
            FieldKind::QuantizedFloat3($c) => $body,
            FieldKind::FixedString($c) => $body,
            FieldKind::EntityRef($c) => $body,
        }
    };
}

impl FieldKind {
    /// Selects the codec for a field definition.
    #[must_use]
    pub fn from_def(def: &FieldDef, max_string_bytes: usize) -> Self {
        let smoothing = SmoothingConfig::from_def(def);
        match def.codec {
            CodecDef::Bool => Self::Bool(BoolField),
            CodecDef::Int => Self::Int(IntField),
            CodecDef::UInt => Self::UInt(UIntField),
            CodecDef::Float => Self::Float(FloatField { smoothing }),
            CodecDef::QuantizedFloat { scale } => {
                Self::QuantizedFloat(QuantizedFloatField { scale, smoothing })
            }
            CodecDef::Float3 => Self::Float3(Float3Field { smoothing }),
            CodecDef::QuantizedFloat3 { scale } => {
                Self::QuantizedFloat3(QuantizedFloat3Field { scale, smoothing })
            }
            CodecDef::FixedString64 => Self::FixedString(FixedStringField {
                max_bytes: max_string_bytes,
            }),
            CodecDef::Entity => Self::EntityRef(EntityRefField),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        fn name_of<C: Erased>(_: &C) -> &'static str {
            C::NAME
        }
        dispatch!(self, c => name_of(c))
    }

    /// Snapshot value used when no baseline exists.
    #[must_use]
    pub fn zero(&self) -> SnapshotValue {
        dispatch!(self, c => c.snap_ret(Default::default()))
    }

    pub fn capture(
        &self,
        live: &LiveValue,
        ghosts: &GhostMap,
    ) -> Result<SnapshotValue, FieldError> {
        dispatch!(self, c => {
            let live = c.live_arg(live)?;
            Ok(c.snap_ret(c.capture(&live, ghosts)))
        })
    }

    pub fn apply(&self, snap: &SnapshotValue, ghosts: &GhostMap) -> Result<LiveValue, FieldError> {
        dispatch!(self, c => {
            let snap = c.snap_arg(snap)?;
            Ok(c.live_ret(c.apply(&snap, ghosts)))
        })
    }

    pub fn interpolate(
        &self,
        before: &SnapshotValue,
        after: &SnapshotValue,
        factor: f32,
        ghosts: &GhostMap,
    ) -> Result<LiveValue, FieldError> {
        dispatch!(self, c => {
            let before = c.snap_arg(before)?;
            let after = c.snap_arg(after)?;
            Ok(c.live_ret(c.interpolate(&before, &after, factor, ghosts)))
        })
    }

    pub fn predict(
        &self,
        predictor: &DeltaPredictor,
        baseline1: &SnapshotValue,
        baseline2: &SnapshotValue,
    ) -> Result<SnapshotValue, FieldError> {
        dispatch!(self, c => {
            let b1 = c.snap_arg(baseline1)?;
            let b2 = c.snap_arg(baseline2)?;
            Ok(c.snap_ret(c.predict(predictor, &b1, &b2)))
        })
    }

    pub fn changed(
        &self,
        current: &SnapshotValue,
        baseline: &SnapshotValue,
    ) -> Result<bool, FieldError> {
        dispatch!(self, c => {
            let current = c.snap_arg(current)?;
            let baseline = c.snap_arg(baseline)?;
            Ok(c.changed(&current, &baseline))
        })
    }

    pub fn write_delta(
        &self,
        writer: &mut BitWriter,
        value: &SnapshotValue,
        predicted: &SnapshotValue,
        model: &CompressionModel,
    ) -> Result<(), FieldError> {
        dispatch!(self, c => {
            let value = c.snap_arg(value)?;
            let predicted = c.snap_arg(predicted)?;
            Ok(c.write_delta(writer, &value, &predicted, model)?)
        })
    }

    pub fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        predicted: &SnapshotValue,
        model: &CompressionModel,
    ) -> Result<SnapshotValue, FieldError> {
        dispatch!(self, c => {
            let predicted = c.snap_arg(predicted)?;
            Ok(c.snap_ret(c.read_delta(reader, &predicted, model)?))
        })
    }

    pub fn write_rpc(
        &self,
        writer: &mut BitWriter,
        value: &SnapshotValue,
    ) -> Result<(), FieldError> {
        dispatch!(self, c => {
            let value = c.snap_arg(value)?;
            Ok(c.write_rpc(writer, &value)?)
        })
    }

    pub fn read_rpc(&self, reader: &mut BitReader<'_>) -> Result<SnapshotValue, FieldError> {
        dispatch!(self, c => Ok(c.snap_ret(c.read_rpc(reader)?)))
    }

    pub fn restore(&self, live: &mut LiveValue, backup: &LiveValue) -> Result<(), FieldError> {
        dispatch!(self, c => {
            let mut current = c.live_arg(live)?;
            c.restore(&mut current, &c.live_arg(backup)?);
            *live = c.live_ret(current);
            Ok(())
        })
    }

    #[cfg(any(debug_assertions, feature = "prediction-errors"))]
    pub fn prediction_error(
        &self,
        predicted: &LiveValue,
        backup: &LiveValue,
    ) -> Result<f32, FieldError> {
        dispatch!(self, c => {
            let predicted = c.live_arg(predicted)?;
            let backup = c.live_arg(backup)?;
            Ok(c.prediction_error(&predicted, &backup))
        })
    }
}
