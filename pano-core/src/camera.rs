#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A camera of a captured scene.
///
/// The structural index of a camera is not stored here. It is the position of the camera in
/// [`Dataset::cameras`](crate::Dataset::cameras).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Camera {
    /// The image index of this camera, as referenced by point-cloud view lists.
    pub index: usize,
    /// The position of this camera along the capture path.
    #[cfg_attr(feature = "serde-serialize", serde(rename = "qIndex", alias = "q_index"))]
    pub q_index: i64,
}

impl Camera {
    pub fn new(index: usize, q_index: i64) -> Self {
        Self { index, q_index }
    }
}
