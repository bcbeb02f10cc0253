use crate::{DecodeError, DecodeResult, StreamReader, FORMAT_VERSION};
use log::*;
use pano_core::nalgebra::Point3;
use std::collections::BTreeSet;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Vertices observed by more than this many images count as tracks.
pub const TRACK_MINIMUM_OBSERVERS: usize = 2;

/// Bytes per vertex record: three `f32` coordinates and the `u16` color field.
const VERTEX_RECORD_SIZE: usize = 3 * 4 + 2;

/// A decoded track file.
///
/// Every vertex has a position and the set of image indices that observe it. A point cloud is
/// never modified once built.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PointCloud {
    positions: Vec<Point3<f32>>,
    view_list: Vec<BTreeSet<usize>>,
    track_count: usize,
}

impl PointCloud {
    /// Builds a point cloud from `(position, observing images)` pairs, in vertex order.
    pub fn from_vertices<I>(vertices: I) -> Self
    where
        I: IntoIterator<Item = (Point3<f32>, BTreeSet<usize>)>,
    {
        let (positions, view_list): (Vec<_>, Vec<_>) = vertices.into_iter().unzip();
        Self::from_parts(positions, view_list)
    }

    fn from_parts(positions: Vec<Point3<f32>>, view_list: Vec<BTreeSet<usize>>) -> Self {
        debug_assert_eq!(positions.len(), view_list.len());
        let track_count = view_list
            .iter()
            .filter(|observers| observers.len() > TRACK_MINIMUM_OBSERVERS)
            .count();
        Self {
            positions,
            view_list,
            track_count,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of vertices observed by more than [`TRACK_MINIMUM_OBSERVERS`] images.
    ///
    /// This is only a diagnostic.
    pub fn track_count(&self) -> usize {
        self.track_count
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn view_list(&self) -> &[BTreeSet<usize>] {
        &self.view_list
    }

    pub fn position(&self, vertex: usize) -> Option<Point3<f32>> {
        self.positions.get(vertex).copied()
    }

    /// The image indices observing a vertex.
    pub fn observers(&self, vertex: usize) -> Option<&BTreeSet<usize>> {
        self.view_list.get(vertex)
    }

    /// Iterates the vertices observed by an image, with their positions, in vertex order.
    pub fn vertices_seen_by(
        &self,
        image: usize,
    ) -> impl Iterator<Item = (usize, Point3<f32>)> + '_ {
        self.view_list
            .iter()
            .zip(&self.positions)
            .enumerate()
            .filter(move |(_, (observers, _))| observers.contains(&image))
            .map(|(vertex, (_, &position))| (vertex, position))
    }

    /// The largest image index referenced by any vertex.
    pub fn max_image(&self) -> Option<usize> {
        self.view_list
            .iter()
            .filter_map(|observers| observers.iter().next_back())
            .max()
            .copied()
    }
}

/// `image` observes vertices `start..start + range`.
struct Span {
    image: usize,
    start: u64,
    range: u64,
}

/// Decodes a track file.
///
/// Fails with [`DecodeError::VersionMismatch`] when the header is not version 1.0, whatever
/// follows it. Any other failure means the buffer is truncated or malformed. In both cases
/// nothing of the file is kept.
pub fn decode(buffer: &[u8]) -> DecodeResult<PointCloud> {
    let mut reader = StreamReader::new(buffer);

    let major = reader.read_u16_be()?;
    let minor = reader.read_u16_be()?;
    if (major, minor) != FORMAT_VERSION {
        return Err(DecodeError::VersionMismatch { major, minor });
    }

    // Every image needs at least its one byte count.
    let nb_images = reader.read_var_usize()?;
    reader.ensure_remaining(nb_images)?;
    let mut spans = vec![];
    for image in 0..nb_images {
        let nb_info = reader.read_var_usize()?;
        reader.ensure_remaining(nb_info.saturating_mul(2))?;
        spans.reserve(nb_info);
        for _ in 0..nb_info {
            let start = reader.read_var_int()?;
            let range = reader.read_var_int()?;
            spans.push(Span {
                image,
                start,
                range,
            });
        }
    }

    let nb_vertices = reader.read_var_usize()?;
    reader.ensure_remaining(nb_vertices.saturating_mul(VERTEX_RECORD_SIZE))?;
    let mut positions = Vec::with_capacity(nb_vertices);
    for _ in 0..nb_vertices {
        let x = reader.read_f32_be()?;
        let y = reader.read_f32_be()?;
        let z = reader.read_f32_be()?;
        // Packed color, not used for visibility.
        reader.read_u16_be()?;
        positions.push(Point3::new(x, y, z));
    }
    if !reader.is_empty() {
        trace!(
            "ignoring {} trailing bytes after {} vertices",
            reader.remaining(),
            nb_vertices
        );
    }

    let mut view_list = vec![BTreeSet::new(); nb_vertices];
    for Span {
        image,
        start,
        range,
    } in spans
    {
        if range == 0 {
            continue;
        }
        let end = start.saturating_add(range);
        if end > nb_vertices as u64 {
            return Err(DecodeError::RangeOutOfBounds {
                image,
                start,
                end,
                vertex_count: nb_vertices,
            });
        }
        for observers in &mut view_list[start as usize..end as usize] {
            observers.insert(image);
        }
    }

    let point_cloud = PointCloud::from_parts(positions, view_list);
    debug!(
        "decoded point cloud with {} images, {} vertices and {} tracks",
        nb_images,
        point_cloud.vertex_count(),
        point_cloud.track_count()
    );
    Ok(point_cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write_var_int;
    use maplit::btreeset;

    /// Writes a version 1.0 file with the given `(image, start, range)` spans and vertex count.
    fn track_file(spans: &[&[(u64, u64)]], vertices: usize) -> Vec<u8> {
        let mut buffer = vec![0, 1, 0, 0];
        write_var_int(&mut buffer, spans.len() as u64);
        for image in spans {
            write_var_int(&mut buffer, image.len() as u64);
            for &(start, range) in image.iter() {
                write_var_int(&mut buffer, start);
                write_var_int(&mut buffer, range);
            }
        }
        write_var_int(&mut buffer, vertices as u64);
        for v in 0..vertices {
            for c in 0..3 {
                buffer.extend_from_slice(&((v * 3 + c) as f32).to_be_bytes());
            }
            buffer.extend_from_slice(&[0xF0, 0x0F]);
        }
        buffer
    }

    #[test]
    fn overlapping_spans_build_view_list() {
        let cloud = decode(&track_file(&[&[(0, 3)], &[(2, 2)]], 5)).unwrap();
        assert_eq!(
            cloud.view_list(),
            &[
                btreeset! {0},
                btreeset! {0},
                btreeset! {0, 1},
                btreeset! {1},
                btreeset! {1}
            ]
        );
        assert_eq!(cloud.track_count(), 0);
        assert_eq!(cloud.position(4), Some(Point3::new(12.0, 13.0, 14.0)));
    }

    #[test]
    fn three_observers_make_a_track() {
        let cloud = decode(&track_file(&[&[(0, 3)], &[(2, 2)], &[(1, 2)]], 5)).unwrap();
        assert_eq!(cloud.observers(2), Some(&btreeset! {0, 1, 2}));
        assert_eq!(cloud.track_count(), 1);
    }

    #[test]
    fn repeated_image_is_counted_once() {
        let cloud = decode(&track_file(&[&[(0, 3), (1, 3)]], 4)).unwrap();
        assert_eq!(cloud.observers(1), Some(&btreeset! {0}));
        assert_eq!(cloud.observers(3), Some(&btreeset! {0}));
        assert_eq!(cloud.track_count(), 0);
    }

    #[test]
    fn version_mismatch_ignores_payload() {
        let mut file = track_file(&[&[(0, 1)]], 1);
        file[1] = 2;
        assert_eq!(
            decode(&file),
            Err(DecodeError::VersionMismatch { major: 2, minor: 0 })
        );
        assert_eq!(
            decode(&[0, 1, 0, 1]),
            Err(DecodeError::VersionMismatch { major: 1, minor: 1 })
        );
    }

    #[test]
    fn truncated_vertices_fail() {
        let file = track_file(&[&[(0, 2)]], 2);
        for len in 0..file.len() {
            assert!(decode(&file[..len]).is_err(), "prefix of {} decoded", len);
        }
        assert!(decode(&file).is_ok());
    }

    #[test]
    fn huge_vertex_count_fails_before_allocating() {
        let mut file = vec![0, 1, 0, 0, 0x80];
        write_var_int(&mut file, u32::MAX as u64);
        assert!(matches!(decode(&file), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn span_past_the_end_is_rejected() {
        assert_eq!(
            decode(&track_file(&[&[(3, 4)]], 5)),
            Err(DecodeError::RangeOutOfBounds {
                image: 0,
                start: 3,
                end: 7,
                vertex_count: 5
            })
        );
    }

    #[test]
    fn empty_span_anywhere_is_allowed() {
        let cloud = decode(&track_file(&[&[(9, 0)], &[(0, 1), (u64::MAX, 0)]], 1)).unwrap();
        assert_eq!(cloud.view_list(), &[btreeset! {1}]);
    }

    #[test]
    fn empty_cloud() {
        let cloud = decode(&track_file(&[], 0)).unwrap();
        assert!(cloud.is_empty());
        assert_eq!(cloud.max_image(), None);
    }

    #[test]
    fn vertices_seen_by_image() {
        let cloud = decode(&track_file(&[&[(0, 3)], &[(2, 2)]], 5)).unwrap();
        let seen: Vec<usize> = cloud.vertices_seen_by(1).map(|(v, _)| v).collect();
        assert_eq!(seen, vec![2, 3, 4]);
        assert_eq!(cloud.vertices_seen_by(9).count(), 0);
        assert_eq!(cloud.max_image(), Some(1));
    }
}
