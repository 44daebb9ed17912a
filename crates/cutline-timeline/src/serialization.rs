//! Composition serialization with versioning and migration.
//!
//! The persisted document is the composition itself with a top-level
//! `version` field, so files written by other tools load as-is.

use cutline_core::{CutlineError, Result};
use serde::{Deserialize, Serialize};

use crate::composition::Composition;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned composition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionFile {
    /// Schema version for migration.
    pub version: u32,
    #[serde(flatten)]
    pub composition: Composition,
}

impl CompositionFile {
    pub fn new(composition: Composition) -> Self {
        Self {
            version: CURRENT_VERSION,
            composition,
        }
    }

    /// Serialize to pretty JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            CutlineError::Serialization(format!("Failed to serialize composition: {}", e))
        })
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| {
            CutlineError::Serialization(format!("Failed to serialize composition: {}", e))
        })
    }

    /// Deserialize from JSON bytes, migrating and validating.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| CutlineError::Serialization(format!("Invalid JSON: {}", e)))?;
        Self::from_value(raw)
    }

    /// Deserialize an already-parsed document.
    pub fn from_value(raw: serde_json::Value) -> Result<Self> {
        if !raw.is_object() {
            return Err(CutlineError::Serialization(
                "Composition document must be a JSON object".to_string(),
            ));
        }
        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;

        if version > CURRENT_VERSION {
            return Err(CutlineError::Serialization(format!(
                "Composition version {} is newer than supported version {}",
                version, CURRENT_VERSION
            )));
        }

        let migrated = migrate(raw, version)?;
        let file: Self = serde_json::from_value(migrated).map_err(|e| {
            CutlineError::Serialization(format!("Failed to parse composition: {}", e))
        })?;
        file.composition.validate()?;
        Ok(file)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        tracing::debug!(path = %path.display(), "Composition saved");
        Ok(())
    }

    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    pub fn into_composition(self) -> Composition {
        self.composition
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 → v1: unversioned composition, stamp it
                if let Some(obj) = data.as_object_mut() {
                    obj.insert("version".to_string(), serde_json::json!(1));
                }
                version = 1;
            }
            _ => {
                return Err(CutlineError::Serialization(format!(
                    "No migration path from version {}",
                    version
                )));
            }
        }
    }

    Ok(data)
}
