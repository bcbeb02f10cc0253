use crate::{DownloadQueue, Fetch, FetchError, LoadError, VisibilitySettings};
use log::*;
use pano_core::{FeatureRef, VisibleFeature};
use pano_pointclouds::PointCloud;
use std::collections::HashSet;

/// Extension of the track files, which are named `<root>/<index>.bin`.
pub const POINT_CLOUD_EXTENSION: &str = "bin";

/// The URL of track file `index` below `root`.
pub fn point_cloud_url(root: &str, index: usize) -> String {
    format!(
        "{}/{}.{}",
        root.trim_end_matches('/'),
        index,
        POINT_CLOUD_EXTENSION
    )
}

/// What happened to a batch of track files.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub requested: usize,
    pub loaded: usize,
    /// The files that are absent from the index and why.
    pub failures: Vec<(usize, LoadError)>,
}

/// Accumulates the decoded point clouds of a batch while it is in flight.
///
/// Slot `k` always holds file `k`, whatever order the files complete in. The load owns every
/// slot until [`PointCloudLoad::finish`] hands them over at once.
#[derive(Debug)]
pub struct PointCloudLoad {
    slots: Vec<Option<PointCloud>>,
    failures: Vec<(usize, LoadError)>,
}

impl PointCloudLoad {
    pub fn new(file_count: usize) -> Self {
        Self {
            slots: (0..file_count).map(|_| None).collect(),
            failures: vec![],
        }
    }

    /// Decodes a completed transfer into its slot, or records why the slot stays empty.
    pub fn receive(&mut self, index: usize, transfer: Result<Vec<u8>, FetchError>) {
        let Some(slot) = self.slots.get_mut(index) else {
            warn!("ignoring point cloud {} outside of a batch of {}", index, self.slots.len());
            return;
        };
        let decoded = transfer
            .map_err(LoadError::from)
            .and_then(|bytes| pano_pointclouds::decode(&bytes).map_err(LoadError::from));
        match decoded {
            Ok(point_cloud) => {
                debug!(
                    "point cloud {} has {} vertices and {} tracks",
                    index,
                    point_cloud.vertex_count(),
                    point_cloud.track_count()
                );
                *slot = Some(point_cloud);
            }
            Err(e) => {
                match &e {
                    LoadError::Decode(d) if d.is_incompatible() => {
                        warn!("point cloud {} skipped: {}", index, d)
                    }
                    _ => warn!("point cloud {} is absent: {}", index, e),
                }
                self.failures.push((index, e));
            }
        }
    }

    pub fn finish(self) -> (Vec<Option<PointCloud>>, LoadReport) {
        let report = LoadReport {
            requested: self.slots.len(),
            loaded: self.slots.iter().flatten().count(),
            failures: self.failures,
        };
        (self.slots, report)
    }
}

/// Exact visibility from the track files of a capture.
///
/// Point cloud `k` of the index is track file `k`. Files that failed to load leave an absent slot
/// which every query skips.
#[derive(Debug, Clone, Default)]
pub struct PointCloudVisibilityIndex {
    point_clouds: Vec<Option<PointCloud>>,
    loaded: bool,
}

impl PointCloudVisibilityIndex {
    /// An empty index that has not loaded anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// An index over already decoded point clouds. `None` marks an absent slot.
    pub fn from_point_clouds(point_clouds: Vec<Option<PointCloud>>) -> Self {
        Self {
            point_clouds,
            loaded: true,
        }
    }

    /// Loads track files `0..file_count` below `root`.
    ///
    /// The files are transferred with `settings.loader_concurrency` in flight (one by default) and
    /// each is decoded as soon as it arrives. Until the whole batch is done the index keeps its
    /// previous contents; then every slot is installed at once and the index reports loaded.
    pub fn init<F>(
        &mut self,
        fetcher: F,
        root: &str,
        file_count: usize,
        settings: &VisibilitySettings,
    ) -> LoadReport
    where
        F: Fetch,
    {
        let queue = DownloadQueue::new(fetcher, settings.loader_concurrency);
        let mut load = PointCloudLoad::new(file_count);
        queue.run(
            (0..file_count).map(|index| (index, point_cloud_url(root, index))),
            |index, transfer| load.receive(index, transfer),
            |summary| {
                trace!(
                    "transferred {} of {} track files",
                    summary.succeeded,
                    summary.requested
                )
            },
        );
        let (point_clouds, report) = load.finish();
        info!(
            "loaded {} of {} point clouds from {}",
            report.loaded, report.requested, root
        );
        self.point_clouds = point_clouds;
        self.loaded = true;
        report
    }

    /// Whether a batch has completed. Before that every query answers empty.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of slots, present or absent.
    pub fn len(&self) -> usize {
        self.point_clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_clouds.is_empty()
    }

    /// Number of present point clouds.
    pub fn loaded_count(&self) -> usize {
        self.point_clouds().count()
    }

    pub fn point_cloud(&self, index: usize) -> Option<&PointCloud> {
        self.point_clouds.get(index).and_then(Option::as_ref)
    }

    /// Iterates the present point clouds with their index.
    pub fn point_clouds(&self) -> impl Iterator<Item = (usize, &PointCloud)> + '_ {
        self.point_clouds
            .iter()
            .enumerate()
            .filter_map(|(index, point_cloud)| Some((index, point_cloud.as_ref()?)))
    }

    /// Total number of tracks over the present point clouds.
    pub fn track_count(&self) -> usize {
        self.point_clouds()
            .map(|(_, point_cloud)| point_cloud.track_count())
            .sum()
    }

    /// Every vertex observed by the image `camera`, point cloud by point cloud, in vertex order.
    pub fn visible_features(&self, camera: usize) -> Vec<VisibleFeature> {
        let features: Vec<VisibleFeature> = self
            .point_clouds()
            .flat_map(|(index, point_cloud)| {
                point_cloud
                    .vertices_seen_by(camera)
                    .map(move |(vertex, position)| {
                        VisibleFeature::new(position, FeatureRef::new(index, vertex))
                    })
            })
            .collect();
        trace!("image {} sees {} features", camera, features.len());
        features
    }

    /// The images observing at least one of `features`.
    ///
    /// References to absent point clouds or unknown vertices contribute nothing.
    pub fn visibility_information<I>(&self, features: I) -> HashSet<usize>
    where
        I: IntoIterator<Item = FeatureRef>,
    {
        let mut cameras = HashSet::new();
        for FeatureRef {
            point_cloud,
            vertex,
        } in features
        {
            if let Some(observers) = self
                .point_cloud(point_cloud)
                .and_then(|point_cloud| point_cloud.observers(vertex))
            {
                cameras.extend(observers.iter().copied());
            }
        }
        cameras
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::{btreeset, hashset};
    use pano_core::nalgebra::Point3;
    use pano_pointclouds::{encode, DecodeError};
    use std::collections::HashMap;

    fn cloud(view_list: Vec<std::collections::BTreeSet<usize>>) -> PointCloud {
        PointCloud::from_vertices(
            view_list
                .into_iter()
                .enumerate()
                .map(|(v, observers)| (Point3::new(v as f32, 0.0, 1.0), observers)),
        )
    }

    #[test]
    fn url_naming() {
        assert_eq!(point_cloud_url("scene/tracks", 3), "scene/tracks/3.bin");
        assert_eq!(point_cloud_url("scene/tracks/", 0), "scene/tracks/0.bin");
    }

    #[test]
    fn features_of_absent_slots_are_ignored() {
        let index = PointCloudVisibilityIndex::from_point_clouds(vec![
            None,
            Some(cloud(vec![btreeset! {7}, btreeset! {7, 8}])),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.loaded_count(), 1);
        assert_eq!(
            index.visibility_information(vec![
                FeatureRef::new(0, 0),
                FeatureRef::new(1, 0),
                FeatureRef::new(1, 1),
                FeatureRef::new(1, 9),
                FeatureRef::new(5, 0),
            ]),
            hashset! {7, 8}
        );
    }

    #[test]
    fn visible_features_span_point_clouds() {
        let index = PointCloudVisibilityIndex::from_point_clouds(vec![
            Some(cloud(vec![btreeset! {1}, btreeset! {2}])),
            None,
            Some(cloud(vec![btreeset! {2}, btreeset! {}, btreeset! {1, 2}])),
        ]);
        let features: Vec<_> = index
            .visible_features(2)
            .iter()
            .map(VisibleFeature::to_tuple)
            .collect();
        assert_eq!(
            features,
            vec![(1.0, 0.0, 1.0, 0, 1), (0.0, 0.0, 1.0, 2, 0), (2.0, 0.0, 1.0, 2, 2)]
        );
        assert!(index.visible_features(3).is_empty());
    }

    #[test]
    fn empty_index_answers_empty() {
        let index = PointCloudVisibilityIndex::new();
        assert!(!index.is_loaded());
        assert!(index.visible_features(0).is_empty());
        assert!(index
            .visibility_information(vec![FeatureRef::new(0, 0)])
            .is_empty());
    }

    #[test]
    fn failed_files_leave_absent_slots() {
        let good = encode(&cloud(vec![btreeset! {0, 1, 2}, btreeset! {1}]));
        let mut files = HashMap::new();
        files.insert("root/0.bin".to_string(), good.clone());
        files.insert("root/1.bin".to_string(), vec![0, 2, 0, 0]);
        files.insert("root/3.bin".to_string(), good[..good.len() - 3].to_vec());
        files.insert("root/4.bin".to_string(), good);
        let fetch = |url: &str| {
            files.get(url).cloned().ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
        };

        let mut index = PointCloudVisibilityIndex::new();
        let report = index.init(fetch, "root", 5, &VisibilitySettings::default());
        assert!(index.is_loaded());
        assert_eq!(report.requested, 5);
        assert_eq!(report.loaded, 2);
        let failed: Vec<usize> = report.failures.iter().map(|(i, _)| *i).collect();
        assert_eq!(failed, vec![1, 2, 3]);
        assert!(matches!(
            report.failures[0].1,
            LoadError::Decode(DecodeError::VersionMismatch { major: 2, minor: 0 })
        ));
        assert!(matches!(report.failures[1].1, LoadError::Fetch(_)));
        assert!(matches!(
            report.failures[2].1,
            LoadError::Decode(DecodeError::Truncated { .. })
        ));

        assert_eq!(index.point_cloud(0).map(PointCloud::vertex_count), Some(2));
        assert!(index.point_cloud(1).is_none());
        assert!(index.point_cloud(4).is_some());
        assert_eq!(index.track_count(), 2);
        let features: Vec<FeatureRef> = index
            .visible_features(2)
            .into_iter()
            .map(|feature| feature.feature)
            .collect();
        assert_eq!(features, vec![FeatureRef::new(0, 0), FeatureRef::new(4, 0)]);
    }

    #[test]
    fn receive_outside_batch_is_ignored() {
        let mut load = PointCloudLoad::new(1);
        load.receive(3, Ok(vec![]));
        let (slots, report) = load.finish();
        assert_eq!(slots, vec![None]);
        assert!(report.failures.is_empty());
    }
}
