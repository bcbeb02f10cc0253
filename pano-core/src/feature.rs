use derive_more::{Deref, From, Into};
use nalgebra::Point3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Names one vertex of one loaded point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FeatureRef {
    /// Index of the point cloud in the owning index (equal to its file index).
    pub point_cloud: usize,
    /// Index of the vertex inside that point cloud.
    pub vertex: usize,
}

impl FeatureRef {
    pub fn new(point_cloud: usize, vertex: usize) -> Self {
        Self {
            point_cloud,
            vertex,
        }
    }
}

/// A vertex observed from some camera, together with its position in world space.
///
/// Dereferences to its [`FeatureRef`] so it can be fed straight back into visibility queries.
#[derive(Debug, Clone, Copy, PartialEq, Deref, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VisibleFeature {
    pub position: Point3<f32>,
    #[deref]
    pub feature: FeatureRef,
}

impl VisibleFeature {
    pub fn new(position: Point3<f32>, feature: FeatureRef) -> Self {
        Self { position, feature }
    }

    /// The flat `(x, y, z, point cloud, vertex)` form handed to spatial indexing.
    pub fn to_tuple(&self) -> (f32, f32, f32, usize, usize) {
        (
            self.position.x,
            self.position.y,
            self.position.z,
            self.feature.point_cloud,
            self.feature.vertex,
        )
    }
}
