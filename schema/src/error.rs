//! Schema validation errors.

use std::fmt;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating a ghost collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Too many ghost types in a collection.
    TooManyGhostTypes { count: usize, max: usize },

    /// A ghost type has an empty name.
    EmptyGhostTypeName { index: usize },

    /// Two ghost types share a name.
    DuplicateGhostType { name: String },

    /// Too many fields on one ghost type.
    TooManyFields {
        ghost_type: String,
        count: usize,
        max: usize,
    },

    /// A field has an empty name.
    EmptyFieldName { ghost_type: String, index: usize },

    /// Two fields of a ghost type share a name.
    DuplicateField { ghost_type: String, field: String },

    /// Quantization scale must be non-zero.
    InvalidQuantizationScale { ghost_type: String, field: String },

    /// Interpolation requested for a codec that cannot be interpolated.
    InvalidSmoothing {
        ghost_type: String,
        field: String,
        codec: &'static str,
    },

    /// Smoothing distance must be finite and positive.
    InvalidSmoothingDistance { ghost_type: String, field: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyGhostTypes { count, max } => {
                write!(f, "too many ghost types: {count} > {max}")
            }
            Self::EmptyGhostTypeName { index } => {
                write!(f, "ghost type {index} has an empty name")
            }
            Self::DuplicateGhostType { name } => {
                write!(f, "duplicate ghost type '{name}'")
            }
            Self::TooManyFields {
                ghost_type,
                count,
                max,
            } => {
                write!(f, "ghost type '{ghost_type}' has too many fields: {count} > {max}")
            }
            Self::EmptyFieldName { ghost_type, index } => {
                write!(f, "field {index} of '{ghost_type}' has an empty name")
            }
            Self::DuplicateField { ghost_type, field } => {
                write!(f, "duplicate field '{field}' in '{ghost_type}'")
            }
            Self::InvalidQuantizationScale { ghost_type, field } => {
                write!(f, "field '{ghost_type}.{field}' has a zero quantization scale")
            }
            Self::InvalidSmoothing {
                ghost_type,
                field,
                codec,
            } => {
                write!(
                    f,
                    "field '{ghost_type}.{field}' cannot interpolate {codec} values"
                )
            }
            Self::InvalidSmoothingDistance { ghost_type, field } => {
                write!(
                    f,
                    "field '{ghost_type}.{field}' has an invalid max smoothing distance"
                )
            }
        }
    }
}

impl std::error::Error for SchemaError {}
