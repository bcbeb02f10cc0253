use crate::{PointCloud, FORMAT_VERSION};
use itertools::Itertools;
use std::collections::BTreeMap;

/// Appends a varint in the track format: 7-bit groups, most significant first, with the top bit
/// set only on the last byte.
pub fn write_var_int(buffer: &mut Vec<u8>, value: u64) {
    let mut groups = [0u8; 10];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7F) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    buffer.extend(groups[1..len].iter().rev());
    buffer.push(groups[0] | 0x80);
}

/// Encodes a point cloud as a version 1.0 track file.
///
/// The observations of each image are written as runs of consecutive vertices. The format lists
/// every image up to the largest one observing anything, so sparse image indices cost one byte per
/// unobserved image. Colors are not kept by [`PointCloud`], so every color field is written as
/// zero.
pub fn encode(point_cloud: &PointCloud) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(16 + point_cloud.vertex_count() * 16);
    buffer.extend_from_slice(&FORMAT_VERSION.0.to_be_bytes());
    buffer.extend_from_slice(&FORMAT_VERSION.1.to_be_bytes());

    let mut runs: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
    for (vertex, observers) in point_cloud.view_list().iter().enumerate() {
        for &image in observers {
            runs.entry(image).or_default().push((vertex, 1));
        }
    }

    let nb_images = runs.keys().next_back().map_or(0, |&image| image + 1);
    write_var_int(&mut buffer, nb_images as u64);
    let mut next_image = 0;
    for (image, image_runs) in runs {
        // Images observing nothing still need their empty count.
        buffer.resize(buffer.len() + (image - next_image), 0x80);
        next_image = image + 1;
        let image_runs = image_runs
            .into_iter()
            .coalesce(|(start, len), (next, next_len)| {
                if start + len == next {
                    Ok((start, len + next_len))
                } else {
                    Err(((start, len), (next, next_len)))
                }
            })
            .collect_vec();
        write_var_int(&mut buffer, image_runs.len() as u64);
        for (start, len) in image_runs {
            write_var_int(&mut buffer, start as u64);
            write_var_int(&mut buffer, len as u64);
        }
    }

    write_var_int(&mut buffer, point_cloud.vertex_count() as u64);
    for position in point_cloud.positions() {
        for coordinate in position.iter() {
            buffer.extend_from_slice(&coordinate.to_be_bytes());
        }
        buffer.extend_from_slice(&0u16.to_be_bytes());
    }
    buffer
}
