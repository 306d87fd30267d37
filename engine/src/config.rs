use serde::{Serialize, Deserialize};

use crate::error::{EditorError, EditorResult};
use crate::geometry::ViewBox;
use crate::objects::Style;

/// Tunables of the editing session. Every field has a default, so a host
/// config only needs to name what it overrides.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo entries kept before the oldest is evicted.
    pub history_limit: usize,
    /// Offset added per successive paste, in document units on each axis.
    pub paste_step: f64,
    /// Alignment snap distance, in screen pixels.
    pub snap_tolerance_px: f64,
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Grab radius of the corner handles, in screen pixels.
    pub handle_radius_px: f64,
    /// Extra grab distance around elements when hit-testing, in screen pixels.
    pub hit_slop_px: f64,
    pub max_layer_name_len: usize,
    pub base_view: ViewBox,
    pub default_style: Style,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            paste_step: 10.0,
            snap_tolerance_px: 6.0,
            zoom_step: 1.125,
            min_zoom: 0.1,
            max_zoom: 10.0,
            handle_radius_px: 6.0,
            hit_slop_px: 3.0,
            max_layer_name_len: 30,
            base_view: ViewBox::new(0.0, 0.0, 512.0, 512.0),
            default_style: Style::new("#cccccc", "#333333", 1.0),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> EditorResult<Self> {
        serde_json::from_str(json).map_err(EditorError::Config)
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
