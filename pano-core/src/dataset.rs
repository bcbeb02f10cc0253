use crate::{Camera, Path};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The shape of a capture.
///
/// A panorama turns around a fixed point looking outwards, a spin turns around an object looking
/// inwards, walls and walks are linear captures. Whether the path is closed is a property of the
/// [`Path`], not of the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(rename_all = "lowercase"))]
pub enum Topology {
    Panorama,
    Spin,
    Wall,
    Walk,
    #[cfg_attr(feature = "serde-serialize", serde(other))]
    Unknown,
}

impl Default for Topology {
    fn default() -> Self {
        Topology::Unknown
    }
}

/// A captured scene, consumed read-only by the visibility indices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Dataset {
    /// Cameras ordered by structural index.
    pub cameras: Vec<Camera>,
    /// The capture path the cameras were quantized along.
    pub path: Path,
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub topology: Topology,
}

impl Dataset {
    pub fn new(cameras: Vec<Camera>, path: Path, topology: Topology) -> Self {
        Self {
            cameras,
            path,
            topology,
        }
    }

    /// Retrieves a camera by its structural index.
    pub fn camera(&self, structural: usize) -> Option<&Camera> {
        self.cameras.get(structural)
    }

    /// Finds the structural index of the camera with the given image index.
    pub fn structural_index(&self, image_index: usize) -> Option<usize> {
        self.cameras
            .iter()
            .position(|camera| camera.index == image_index)
    }

    pub fn is_closed(&self) -> bool {
        self.path.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_and_image_indices_differ() {
        let dataset = Dataset::new(
            vec![Camera::new(10, 0), Camera::new(11, 5), Camera::new(7, 9)],
            Path::new(10, false),
            Topology::Walk,
        );
        assert_eq!(dataset.camera(2), Some(&Camera::new(7, 9)));
        assert_eq!(dataset.camera(3), None);
        assert_eq!(dataset.structural_index(7), Some(2));
        assert_eq!(dataset.structural_index(3), None);
    }

    #[cfg(feature = "serde-serialize")]
    #[test]
    fn deserialize_metadata() {
        let dataset: Dataset = serde_json::from_str(
            r#"{
                "cameras": [{ "index": 0, "qIndex": 0 }, { "index": 1, "qIndex": 12 }],
                "path": { "nbPoints": 24, "closed": true },
                "topology": "spin"
            }"#,
        )
        .unwrap();
        assert_eq!(dataset.topology, Topology::Spin);
        assert_eq!(dataset.cameras[1].q_index, 12);
        assert!(dataset.is_closed());

        let topology: Topology = serde_json::from_str(r#""turntable""#).unwrap();
        assert_eq!(topology, Topology::Unknown);
    }
}
