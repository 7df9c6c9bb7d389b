//! Editor settings.
//!
//! Stored as JSON. Missing fields take their default, so an empty object is
//! a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

/// Settings of the curve editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo steps kept.
    pub undo_depth: usize,
    /// Whether successive interactive edits of the same keys collapse into
    /// one undo step.
    pub merge_interactive_edits: bool,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_depth: 200,
            merge_interactive_edits: true,
            log_filter: "info".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse from JSON bytes.
    pub fn from_json(data: &[u8]) -> EditResult<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| EditError::Config(format!("Invalid editor config: {}", e)))?;
        if config.undo_depth == 0 {
            return Err(EditError::Config("undo_depth must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> EditResult<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| EditError::Config(format!("Failed to serialize editor config: {}", e)))
    }

    /// Load from a file path.
    pub fn load_from_file(path: &Path) -> EditResult<Self> {
        let data = std::fs::read(path)
            .map_err(|e| EditError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&data)
    }
}

// ── Tests ───────────────────────────────────────────────────────
