#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The settings for the visibility indices.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VisibilitySettings {
    /// Fraction of the path visible on each side of the camera on a closed panorama
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_closed_panorama_half_window")
    )]
    pub closed_panorama_half_window: f64,
    /// Angle visible on each side of the camera on a closed spin, where the whole path is 360 degrees
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_closed_spin_half_window_degrees")
    )]
    pub closed_spin_half_window_degrees: f64,
    /// Fraction of the path visible on each side of the camera for every other capture
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_half_window")
    )]
    pub default_half_window: f64,
    /// Below this many visible cameras, the structural neighbors of the camera are forced visible
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_minimum_visible_cameras")
    )]
    pub minimum_visible_cameras: usize,
    /// The number of track files transferred at once.
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_loader_concurrency")
    )]
    pub loader_concurrency: usize,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            closed_panorama_half_window: default_closed_panorama_half_window(),
            closed_spin_half_window_degrees: default_closed_spin_half_window_degrees(),
            default_half_window: default_half_window(),
            minimum_visible_cameras: default_minimum_visible_cameras(),
            loader_concurrency: default_loader_concurrency(),
        }
    }
}

fn default_closed_panorama_half_window() -> f64 {
    0.25
}

fn default_closed_spin_half_window_degrees() -> f64 {
    30.0
}

fn default_half_window() -> f64 {
    0.05
}

fn default_minimum_visible_cameras() -> usize {
    2
}

fn default_loader_concurrency() -> usize {
    1
}
