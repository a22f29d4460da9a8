//! Ghost type and collection definitions and validation.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::{FieldDef, Smoothing};

/// Maximum number of replicated fields on one ghost type.
pub const MAX_FIELDS_PER_GHOST: usize = 256;

/// Maximum number of ghost types in a collection.
pub const MAX_GHOST_TYPES: usize = 1024;

/// A replicated archetype: an ordered list of fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GhostTypeDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl GhostTypeDef {
    /// Creates a ghost type with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a ghost type with the provided fields.
    #[must_use]
    pub fn with_fields(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Adds a field to the ghost type.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Finds a field index by name.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// An ordered set of ghost types shared by both peers.
///
/// The position of a ghost type in the collection is its wire type index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GhostCollectionDef {
    pub ghost_types: Vec<GhostTypeDef>,
}

impl GhostCollectionDef {
    /// Creates a collection from ghost types after validation.
    pub fn new(ghost_types: Vec<GhostTypeDef>) -> SchemaResult<Self> {
        let collection = Self { ghost_types };
        collection.validate()?;
        Ok(collection)
    }

    /// Creates a collection builder.
    #[must_use]
    pub fn builder() -> GhostCollectionBuilder {
        GhostCollectionBuilder {
            ghost_types: Vec::new(),
        }
    }

    /// Number of ghost types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ghost_types.len()
    }

    /// Returns `true` if the collection holds no ghost types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ghost_types.is_empty()
    }

    /// Finds a ghost type index by name.
    #[must_use]
    pub fn type_index(&self, name: &str) -> Option<usize> {
        self.ghost_types.iter().position(|ghost| ghost.name == name)
    }

    /// Validates collection invariants.
    pub fn validate(&self) -> SchemaResult<()> {
        if self.ghost_types.len() > MAX_GHOST_TYPES {
            return Err(SchemaError::TooManyGhostTypes {
                count: self.ghost_types.len(),
                max: MAX_GHOST_TYPES,
            });
        }

        let mut names = HashSet::new();
        for (index, ghost) in self.ghost_types.iter().enumerate() {
            if ghost.name.is_empty() {
                return Err(SchemaError::EmptyGhostTypeName { index });
            }
            if !names.insert(ghost.name.as_str()) {
                return Err(SchemaError::DuplicateGhostType {
                    name: ghost.name.clone(),
                });
            }
            validate_ghost_type(ghost)?;
        }
        Ok(())
    }
}

/// Builder for [`GhostCollectionDef`].
#[derive(Debug, Default)]
pub struct GhostCollectionBuilder {
    ghost_types: Vec<GhostTypeDef>,
}

impl GhostCollectionBuilder {
    /// Adds a ghost type definition.
    #[must_use]
    pub fn ghost_type(mut self, ghost: GhostTypeDef) -> Self {
        self.ghost_types.push(ghost);
        self
    }

    /// Builds the collection after validation.
    pub fn build(self) -> SchemaResult<GhostCollectionDef> {
        GhostCollectionDef::new(self.ghost_types)
    }
}

fn validate_ghost_type(ghost: &GhostTypeDef) -> SchemaResult<()> {
    if ghost.fields.len() > MAX_FIELDS_PER_GHOST {
        return Err(SchemaError::TooManyFields {
            ghost_type: ghost.name.clone(),
            count: ghost.fields.len(),
            max: MAX_FIELDS_PER_GHOST,
        });
    }

    let mut names = HashSet::new();
    for (index, field) in ghost.fields.iter().enumerate() {
        if field.name.is_empty() {
            return Err(SchemaError::EmptyFieldName {
                ghost_type: ghost.name.clone(),
                index,
            });
        }
        if !names.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                ghost_type: ghost.name.clone(),
                field: field.name.clone(),
            });
        }
        validate_field(&ghost.name, field)?;
    }
    Ok(())
}

fn validate_field(ghost_type: &str, field: &FieldDef) -> SchemaResult<()> {
    if field.codec.scale() == Some(0) {
        return Err(SchemaError::InvalidQuantizationScale {
            ghost_type: ghost_type.to_owned(),
            field: field.name.clone(),
        });
    }

    if field.smoothing == Smoothing::Interpolate && !field.codec.is_interpolatable() {
        return Err(SchemaError::InvalidSmoothing {
            ghost_type: ghost_type.to_owned(),
            field: field.name.clone(),
            codec: field.codec.name(),
        });
    }

    if let Some(distance) = field.max_smoothing_distance {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(SchemaError::InvalidSmoothingDistance {
                ghost_type: ghost_type.to_owned(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}
