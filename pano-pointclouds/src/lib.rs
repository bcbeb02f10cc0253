//! Point clouds with per-vertex camera visibility.
//!
//! Each capture ships zero or more track files. A track file is a big-endian binary stream:
//!
//! ```text
//! u16 major, u16 minor                      must be 1, 0
//! varint nb_images
//!   nb_images times:
//!     varint nb_info
//!       nb_info times: varint vertex, varint range
//! varint nb_vertices
//!   nb_vertices times: f32 x, f32 y, f32 z, u16 color
//! ```
//!
//! The `(vertex, range)` pairs listed under image `i` say that image `i` observes the vertices
//! `vertex..vertex + range`. Varints are written most significant group first, and the *last*
//! byte of a varint is the one with its top bit set (see [`StreamReader::read_var_int`]).
//!
//! [`decode`] turns a buffer into a [`PointCloud`], [`encode`] writes one back, and
//! [`export_ply`] dumps one as an ascii PLY file for inspection.

mod error;
mod export;
mod point_cloud;
mod reader;
mod writer;

pub use error::*;
pub use export::*;
pub use point_cloud::*;
pub use reader::*;
pub use writer::*;

/// The only `(major, minor)` version of the format that is understood.
pub const FORMAT_VERSION: (u16, u16) = (1, 0);
