use crate::{PointCloud, TRACK_MINIMUM_OBSERVERS};
use ply_rs::{
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};
use std::io::{self, Write};

const SEEN_COLOR: [u8; 3] = [255, 0, 255];
const TRACK_COLOR: [u8; 3] = [255, 255, 255];
const VERTEX_COLOR: [u8; 3] = [128, 128, 128];

/// Writes a point cloud as an ascii PLY file.
///
/// Vertices observed by `highlight` are colored magenta. Otherwise tracks are white and the
/// remaining vertices grey. The `observers` property holds the number of images observing each
/// vertex.
pub fn export_ply(
    mut writer: impl Write,
    point_cloud: &PointCloud,
    highlight: Option<usize>,
) -> io::Result<usize> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header
        .comments
        .push("Exported from pano-pointclouds".to_string());

    let mut vertex_element = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex_element.properties.add(PropertyDef::new(
            axis.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    for channel in ["red", "green", "blue"] {
        vertex_element.properties.add(PropertyDef::new(
            channel.to_string(),
            PropertyType::Scalar(ScalarType::UChar),
        ));
    }
    vertex_element.properties.add(PropertyDef::new(
        "observers".to_string(),
        PropertyType::Scalar(ScalarType::UInt),
    ));
    ply.header.elements.add(vertex_element);

    let vertices = point_cloud
        .positions()
        .iter()
        .zip(point_cloud.view_list())
        .map(|(p, observers)| {
            let [r, g, b] = match highlight {
                Some(image) if observers.contains(&image) => SEEN_COLOR,
                _ if observers.len() > TRACK_MINIMUM_OBSERVERS => TRACK_COLOR,
                _ => VERTEX_COLOR,
            };
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Float(p.x));
            vertex.insert("y".to_string(), Property::Float(p.y));
            vertex.insert("z".to_string(), Property::Float(p.z));
            vertex.insert("red".to_string(), Property::UChar(r));
            vertex.insert("green".to_string(), Property::UChar(g));
            vertex.insert("blue".to_string(), Property::UChar(b));
            vertex.insert(
                "observers".to_string(),
                Property::UInt(observers.len() as u32),
            );
            vertex
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertices);

    Writer::new().write_ply(&mut writer, &mut ply)
}
