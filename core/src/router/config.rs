//! Router configuration

use serde::{Deserialize, Serialize};

/// Scroll and smoothing settings (`[scroll]` in the page config)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Page pixels per second of timeline (default: 8000)
    #[serde(default = "default_pixels_per_second")]
    pub pixels_per_second: f64,
    /// Fraction of the remaining distance the smoothed position covers per frame (default: 0.1)
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    /// Progress added past a video's end when the user closes it (default: 0.001)
    #[serde(default = "default_close_overshoot")]
    pub close_overshoot: f64,
    /// Frame delta clamp in seconds, keeps clips from jumping after a stall (default: 0.1)
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: default_pixels_per_second(),
            smoothing: default_smoothing(),
            close_overshoot: default_close_overshoot(),
            max_frame_delta: default_max_frame_delta(),
        }
    }
}

impl ScrollConfig {
    /// Reason the settings are unusable, if any
    pub fn invalid_reason(&self) -> Option<&'static str> {
        if !self.pixels_per_second.is_finite() || self.pixels_per_second <= 0.0 {
            return Some("pixels_per_second must be positive");
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Some("smoothing must be in (0, 1]");
        }
        if !(0.0..1.0).contains(&self.close_overshoot) {
            return Some("close_overshoot must be in [0, 1)");
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Some("max_frame_delta must be positive");
        }
        None
    }
}

fn default_pixels_per_second() -> f64 {
    8000.0
}

fn default_smoothing() -> f64 {
    0.1
}

fn default_close_overshoot() -> f64 {
    0.001
}

fn default_max_frame_delta() -> f32 {
    0.1
}

/// Browser viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            (self.width / self.height) as f32
        } else {
            1.0
        }
    }
}
