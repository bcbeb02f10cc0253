//! # Pano Core
//!
//! This library provides the scene model shared by the annotation crates of the immersive-photo
//! viewer. A captured scene is a [`Dataset`]: an ordered list of [`Camera`]s, the capture
//! [`Path`] they were taken along, and a [`Topology`] tag describing the shape of the capture.
//! All of it is produced elsewhere (the dataset metadata loader) and only read here.
//!
//! Two notions of camera position are used throughout and must not be confused:
//!
//! * The **structural index** of a camera is its position in [`Dataset::cameras`].
//! * The **path index** ([`Camera::q_index`]) is the quantized position of the camera along the
//!   capture path, used for reasoning about distance and angle between cameras.
//!
//! Point clouds refer to cameras by a third identifier, the image index ([`Camera::index`]),
//! which is stable across the whole system.
//!
//! ```text
//!   structural:   0     1     2     3     4
//!   q_index:      0    90   180   270   350     (closed path of 360 points)
//!                 ^                         \
//!                  \________ loop __________/
//! ```
//!
//! The crate also defines the small value types exchanged with the visibility indices:
//! [`FeatureRef`] to name a vertex inside a loaded point cloud and [`VisibleFeature`] to report
//! one together with its position.

mod camera;
mod dataset;
mod feature;
mod path;

pub use camera::*;
pub use dataset::*;
pub use feature::*;
pub use nalgebra;
pub use path::*;
