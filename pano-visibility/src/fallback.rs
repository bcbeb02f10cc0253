use crate::VisibilitySettings;
use log::*;
use pano_core::{Dataset, Topology};
use std::collections::BTreeSet;

/// Approximate visibility for captures without track files.
///
/// A camera is considered visible from the current one when its path position lies within a
/// window centered on the current camera's path position. On closed paths the window wraps around
/// the end of the path.
#[derive(Debug, Clone, Copy)]
pub struct FallbackVisibilityIndex<'a> {
    dataset: &'a Dataset,
    settings: VisibilitySettings,
}

impl<'a> FallbackVisibilityIndex<'a> {
    /// Nothing is loaded: the index reads the dataset on every query.
    pub fn init(dataset: &'a Dataset) -> Self {
        Self::with_settings(dataset, VisibilitySettings::default())
    }

    pub fn with_settings(dataset: &'a Dataset, settings: VisibilitySettings) -> Self {
        Self { dataset, settings }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// The number of path positions visible on each side of a camera.
    ///
    /// * closed panorama: a quarter of the path (180 degrees in total)
    /// * closed spin: 30 degrees on each side, with the whole path being 360 degrees
    /// * anything else: 5% of the path
    pub fn half_window(&self) -> f64 {
        let path_length = self.dataset.path.nb_points as f64;
        let closed = self.dataset.is_closed();
        let fraction = match self.dataset.topology {
            Topology::Panorama if closed => self.settings.closed_panorama_half_window,
            Topology::Spin if closed => self.settings.closed_spin_half_window_degrees / 360.0,
            _ => self.settings.default_half_window,
        };
        fraction * path_length
    }

    /// The `(begin, end)` path positions of the window around a camera, both already brought back
    /// onto the path. `begin > end` means the window wraps around the end of a closed path.
    pub fn window(&self, current: usize) -> Option<(f64, f64)> {
        let camera = self.dataset.camera(current)?;
        let path = &self.dataset.path;
        if path.nb_points == 0 {
            return None;
        }
        let half_window = self.half_window();
        let q_index = camera.q_index as f64;
        Some((
            path.fix_range(q_index - half_window),
            path.fix_range(q_index + half_window),
        ))
    }

    /// The structural indices of the cameras visible from camera `current`, sorted.
    ///
    /// When fewer than `minimum_visible_cameras` cameras fall in the window, two structural
    /// neighbors of the current camera are added: the next two for the first camera, the previous
    /// two for the last one, the one on each side otherwise.
    pub fn visibility_information(&self, current: usize) -> Vec<usize> {
        let (begin, end) = match self.window(current) {
            Some(window) => window,
            None => return vec![],
        };
        let last = self.dataset.path.last();
        let mut visible: BTreeSet<usize> = self
            .dataset
            .cameras
            .iter()
            .enumerate()
            .filter(|(_, camera)| in_window(camera.q_index as f64, begin, end, last))
            .map(|(structural, _)| structural)
            .collect();

        if visible.len() < self.settings.minimum_visible_cameras {
            let len = self.dataset.cameras.len();
            let neighbors = if current == 0 {
                [Some(1), Some(2)]
            } else if current + 1 == len {
                [current.checked_sub(2), Some(current - 1)]
            } else {
                [Some(current - 1), Some(current + 1)]
            };
            debug!(
                "only {} cameras visible from camera {}, adding {:?}",
                visible.len(),
                current,
                neighbors
            );
            visible.extend(
                neighbors
                    .into_iter()
                    .flatten()
                    .filter(|&structural| structural < len),
            );
        }

        trace!(
            "window [{}, {}] around camera {} holds {} cameras",
            begin,
            end,
            current,
            visible.len()
        );
        visible.into_iter().collect()
    }
}

/// Whether a path position lies within `[begin, end]`, wrapping past `last` when `begin > end`.
fn in_window(q_index: f64, begin: f64, end: f64, last: f64) -> bool {
    if begin < end {
        begin <= q_index && q_index <= end
    } else if begin > end {
        (begin <= q_index && q_index <= last) || (0.0 <= q_index && q_index <= end)
    } else {
        false
    }
}
