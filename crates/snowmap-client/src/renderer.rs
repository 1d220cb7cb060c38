//! Map renderer seam

use serde::{Deserialize, Serialize};
use snowmap_types::{GeoPoint, LayerDescriptor};

/// Draws the layers handed over by a derivation pass.
///
/// Receives the full, ordered layer list on every pass (bottom layer first)
/// and is responsible for diffing against what it already shows.
pub trait MapRenderer: Send + Sync {
    fn render(&self, layers: &[LayerDescriptor]);
}

/// Visible map area as reported by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
}
