use crate::{
    Fetch, FallbackVisibilityIndex, LoadReport, PointCloudVisibilityIndex, VisibilitySettings,
};
use itertools::Itertools;
use log::*;
use pano_core::{Dataset, FeatureRef, VisibleFeature};

/// The visibility index of the scene on screen.
///
/// Captures with usable track files get exact answers from their point clouds, the others fall
/// back to the path window heuristic.
#[derive(Debug, Clone)]
pub enum AnnotationVisibility<'a> {
    PointCloud {
        index: PointCloudVisibilityIndex,
        dataset: &'a Dataset,
    },
    Fallback(FallbackVisibilityIndex<'a>),
}

impl<'a> AnnotationVisibility<'a> {
    /// Loads the `file_count` track files below `root` and keeps the point-cloud index if at least
    /// one of them decoded. Otherwise, including when the capture has no track files at all, the
    /// fallback index is used.
    pub fn init<F>(
        dataset: &'a Dataset,
        fetcher: F,
        root: &str,
        file_count: usize,
        settings: VisibilitySettings,
    ) -> (Self, LoadReport)
    where
        F: Fetch,
    {
        if file_count == 0 {
            info!("scene has no point clouds, using the path heuristic");
            return (
                AnnotationVisibility::Fallback(FallbackVisibilityIndex::with_settings(
                    dataset, settings,
                )),
                LoadReport::default(),
            );
        }
        let mut index = PointCloudVisibilityIndex::new();
        let report = index.init(fetcher, root, file_count, &settings);
        let visibility = if report.loaded > 0 {
            AnnotationVisibility::PointCloud { index, dataset }
        } else {
            warn!(
                "none of the {} point clouds could be loaded, using the path heuristic",
                file_count
            );
            AnnotationVisibility::Fallback(FallbackVisibilityIndex::with_settings(
                dataset, settings,
            ))
        };
        (visibility, report)
    }

    pub fn dataset(&self) -> &'a Dataset {
        match self {
            AnnotationVisibility::PointCloud { dataset, .. } => *dataset,
            AnnotationVisibility::Fallback(fallback) => fallback.dataset(),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, AnnotationVisibility::PointCloud { .. })
    }

    /// The features seen from the camera with structural index `current`.
    ///
    /// The heuristic knows no features, so it always answers empty.
    pub fn visible_features(&self, current: usize) -> Vec<VisibleFeature> {
        match self {
            AnnotationVisibility::PointCloud { index, dataset } => dataset
                .camera(current)
                .map(|camera| index.visible_features(camera.index))
                .unwrap_or_default(),
            AnnotationVisibility::Fallback(_) => vec![],
        }
    }

    /// The structural indices, sorted, of the cameras from which an annotation is visible.
    ///
    /// With point clouds, these are the cameras observing any of the annotation's `features`.
    /// Images unknown to the dataset are dropped. The heuristic ignores `features` and answers
    /// with the cameras around `current`.
    pub fn visible_cameras(&self, current: usize, features: &[FeatureRef]) -> Vec<usize> {
        match self {
            AnnotationVisibility::PointCloud { index, dataset } => index
                .visibility_information(features.iter().copied())
                .into_iter()
                .filter_map(|image| dataset.structural_index(image))
                .sorted_unstable()
                .dedup()
                .collect(),
            AnnotationVisibility::Fallback(fallback) => fallback.visibility_information(current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchError;
    use maplit::btreeset;
    use pano_core::nalgebra::Point3;
    use pano_core::{Camera, Path, Topology};
    use pano_pointclouds::{encode, PointCloud};

    fn walk() -> Dataset {
        // Image indices are the reverse of the structural order.
        Dataset::new(
            (0..10).map(|s| Camera::new(9 - s, s as i64 * 100)).collect(),
            Path::new(1000, false),
            Topology::Walk,
        )
    }

    fn nothing(url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::NotFound {
            url: url.to_string(),
        })
    }

    #[test]
    fn no_files_means_fallback() {
        let dataset = walk();
        let (visibility, report) =
            AnnotationVisibility::init(&dataset, nothing, "", 0, VisibilitySettings::default());
        assert!(!visibility.is_exact());
        assert_eq!(report.requested, 0);
        assert_eq!(visibility.visible_cameras(5, &[]), vec![4, 5, 6]);
        assert!(visibility.visible_features(5).is_empty());
    }

    #[test]
    fn unloadable_files_mean_fallback() {
        let dataset = walk();
        let (visibility, report) =
            AnnotationVisibility::init(&dataset, nothing, "tracks", 3, VisibilitySettings::default());
        assert!(!visibility.is_exact());
        assert_eq!(report.failures.len(), 3);
    }

    #[test]
    fn point_clouds_answer_in_structural_indices() {
        let dataset = walk();
        let file = encode(&PointCloud::from_vertices(vec![
            (Point3::new(0.0, 0.0, 0.0), btreeset! {9, 7}),
            (Point3::new(1.0, 0.0, 0.0), btreeset! {7, 42}),
        ]));
        let fetch = move |_: &str| -> Result<Vec<u8>, FetchError> { Ok(file.clone()) };
        let (visibility, report) =
            AnnotationVisibility::init(&dataset, fetch, "tracks", 1, VisibilitySettings::default());
        assert!(visibility.is_exact());
        assert_eq!(report.loaded, 1);

        // Structural 2 is image 7.
        let features: Vec<FeatureRef> = visibility
            .visible_features(2)
            .into_iter()
            .map(|feature| *feature)
            .collect();
        assert_eq!(features, vec![FeatureRef::new(0, 0), FeatureRef::new(0, 1)]);
        assert_eq!(visibility.visible_cameras(2, &features), vec![0, 2]);
        assert!(visibility.visible_features(10).is_empty());
    }
}
