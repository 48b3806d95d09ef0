//! Viewer configuration. Keeps the identifiers an embedder wires input
//! and output to, plus the present-layer bounds.

use std::path::Path;

use anyhow::Context;
use ocular_vr::LayerConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Identifier of the drawing surface the painter renders into.
    pub canvas_id: String,
    /// Identifier of the input element wired to `enter_vr`.
    pub enter_button_id: String,
    /// Per-eye viewport bounds as `[x, y, w, h]` fractions.
    pub left_bounds: [f32; 4],
    pub right_bounds: [f32; 4],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            canvas_id: "ocular-canvas".to_string(),
            enter_button_id: "enter-vr".to_string(),
            left_bounds: [0.0, 0.0, 0.5, 1.0],
            right_bounds: [0.5, 0.0, 0.5, 1.0],
        }
    }
}

impl ViewerConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn layer(&self) -> LayerConfig {
        LayerConfig {
            left_bounds: self.left_bounds,
            right_bounds: self.right_bounds,
        }
    }
}
