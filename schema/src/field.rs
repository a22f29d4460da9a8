//! Field codec and smoothing definitions.

/// Storage size of a fixed string field, in bytes.
pub const FIXED_STRING_CAPACITY: usize = 64;

/// Maximum UTF-8 payload of a fixed string field.
///
/// The 64-byte storage also holds a length prefix and a terminator.
pub const FIXED_STRING_MAX_BYTES: usize = FIXED_STRING_CAPACITY - 3;

/// The encoding for a field (representation only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum FieldCodec {
    /// Boolean, stored as 0/1.
    Bool,

    /// Signed 32-bit integer, predicted and delta-packed.
    Int,

    /// Unsigned 32-bit integer, predicted and delta-packed.
    UInt,

    /// Unquantized 32-bit float; deltas are "same" bit or raw bits.
    Float,

    /// Float quantized to `round(value * scale)`.
    QuantizedFloat { scale: u32 },

    /// Unquantized 3-component vector.
    Float3,

    /// 3-component vector, each component quantized by `scale`.
    QuantizedFloat3 { scale: u32 },

    /// UTF-8 string of at most [`FIXED_STRING_MAX_BYTES`] bytes.
    FixedString64,

    /// Reference to another ghost (ghost id + spawn tick).
    Entity,
}

impl FieldCodec {
    /// Creates a quantized float codec.
    #[must_use]
    pub const fn quantized_float(scale: u32) -> Self {
        Self::QuantizedFloat { scale }
    }

    /// Creates a quantized float3 codec.
    #[must_use]
    pub const fn quantized_float3(scale: u32) -> Self {
        Self::QuantizedFloat3 { scale }
    }

    /// Returns the quantization scale, if this codec quantizes.
    #[must_use]
    pub const fn scale(self) -> Option<u32> {
        match self {
            Self::QuantizedFloat { scale } | Self::QuantizedFloat3 { scale } => Some(scale),
            _ => None,
        }
    }

    /// Returns `true` if values of this codec can be interpolated.
    #[must_use]
    pub const fn is_interpolatable(self) -> bool {
        matches!(
            self,
            Self::Float | Self::QuantizedFloat { .. } | Self::Float3 | Self::QuantizedFloat3 { .. }
        )
    }

    /// Short human-readable name, used by tooling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::QuantizedFloat { .. } => "quantized_float",
            Self::Float3 => "float3",
            Self::QuantizedFloat3 { .. } => "quantized_float3",
            Self::FixedString64 => "fixed_string64",
            Self::Entity => "entity",
        }
    }
}

/// Presentation smoothing for a field on the receiving side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Smoothing {
    /// Take the older snapshot's value.
    #[default]
    Clamp,
    /// Lerp between the bracketing snapshots.
    Interpolate,
}

/// Field definition within a ghost type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDef {
    pub name: String,
    pub codec: FieldCodec,
    #[cfg_attr(feature = "serde", serde(default))]
    pub smoothing: Smoothing,
    /// Snap instead of interpolating when the two values are further apart.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_smoothing_distance: Option<f32>,
}

impl FieldDef {
    /// Creates a field definition with clamp smoothing.
    #[must_use]
    pub fn new(name: impl Into<String>, codec: FieldCodec) -> Self {
        Self {
            name: name.into(),
            codec,
            smoothing: Smoothing::Clamp,
            max_smoothing_distance: None,
        }
    }

    /// Creates an interpolated field definition.
    #[must_use]
    pub fn interpolated(name: impl Into<String>, codec: FieldCodec) -> Self {
        Self::new(name, codec).smoothing(Smoothing::Interpolate)
    }

    /// Sets the smoothing mode.
    #[must_use]
    pub fn smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Sets the distance beyond which interpolation snaps.
    #[must_use]
    pub fn max_smoothing_distance(mut self, distance: f32) -> Self {
        self.max_smoothing_distance = Some(distance);
        self
    }
}
