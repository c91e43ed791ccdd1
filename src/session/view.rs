// Presentation state for the result viewer: view mode and zoom. Pure
// state, no invariants beyond zoom clamping.

use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 4.0;
pub const ZOOM_STEP: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewMode {
    Split,
    ImageOnly,
    TextOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub mode: ViewMode,
    pub zoom: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: ViewMode::Split,
            zoom: MIN_ZOOM,
        }
    }
}

impl ViewState {
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
