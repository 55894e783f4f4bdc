//! Sidebar width and content zoom clamps

use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.8;
pub const MAX_ZOOM: f64 = 1.4;
const ZOOM_PER_WHEEL_UNIT: f64 = 0.0015;

/// Sidebar width, kept inside `[min, max]` while dragging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaneWidth {
    width: f64,
    min: f64,
    max: f64,
}

impl PaneWidth {
    pub fn new(initial: f64, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            width: initial.clamp(min, max),
            min,
            max,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Follow the drag handle to `x`, clamped
    pub fn drag_to(&mut self, x: f64) -> f64 {
        self.width = x.clamp(self.min, self.max);
        self.width
    }
}

impl Default for PaneWidth {
    fn default() -> Self {
        Self::new(280.0, 220.0, 420.0)
    }
}

/// Content zoom driven by ctrl + wheel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zoom(f64);

impl Zoom {
    pub fn factor(&self) -> f64 {
        self.0
    }

    /// Apply one wheel event; positive `delta_y` zooms out
    pub fn apply_wheel(&mut self, delta_y: f64) -> f64 {
        let next = (self.0 - delta_y * ZOOM_PER_WHEEL_UNIT).clamp(MIN_ZOOM, MAX_ZOOM);
        self.0 = (next * 100.0).round() / 100.0;
        self.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom(1.0)
    }
}
