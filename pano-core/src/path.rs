#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The capture path: an ordered sequence of `nb_points` quantized poses.
///
/// Only the length and closedness of the path matter for visibility, so the poses themselves
/// are not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Path {
    /// Number of quantized poses along the path.
    #[cfg_attr(feature = "serde-serialize", serde(rename = "nbPoints", alias = "nb_points"))]
    pub nb_points: usize,
    /// A closed path loops back from its last pose to its first.
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub closed: bool,
}

impl Path {
    pub fn new(nb_points: usize, closed: bool) -> Self {
        Self { nb_points, closed }
    }

    /// The index of the last pose, or `0.0` on an empty path.
    pub fn last(&self) -> f64 {
        self.nb_points.saturating_sub(1) as f64
    }

    /// Brings an arbitrary real path index back into `[0, nb_points - 1]`.
    ///
    /// A closed path wraps around (`-1` is the last pose, `nb_points` is the first one).
    /// An open path has nothing to wrap to, so the value is clamped to its ends.
    ///
    /// On a closed path the result is strictly below `nb_points` but may lie in the
    /// fractional gap `(nb_points - 1, nb_points)` between the last and first poses.
    pub fn fix_range(&self, value: f64) -> f64 {
        if self.nb_points == 0 || !value.is_finite() {
            return 0.0;
        }
        if self.closed {
            let wrapped = value.rem_euclid(self.nb_points as f64);
            // rem_euclid may round up to the modulus itself for tiny negative inputs.
            if wrapped >= self.nb_points as f64 {
                0.0
            } else {
                wrapped
            }
        } else {
            value.clamp(0.0, self.last())
        }
    }
}
