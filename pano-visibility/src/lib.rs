//! Visibility of annotated points across the cameras of a capture.
//!
//! While the user moves through a capture, every annotation marker must be shown only when the
//! point it is attached to can be seen from the camera on screen. Two indices answer that question
//! depending on what data the capture ships with:
//!
//! * [`PointCloudVisibilityIndex`] is built from the capture's track files (see
//!   [`pano_pointclouds`]). Every vertex knows exactly which images observe it, so the answer is
//!   exact.
//! * [`FallbackVisibilityIndex`] is used when the capture has no track files. It approximates
//!   visibility with a window of path positions around the current camera whose width depends on
//!   the capture [`Topology`](pano_core::Topology).
//!
//! [`AnnotationVisibility`] picks between the two when a scene is opened.
//!
//! Track files are pulled through a [`DownloadQueue`] and a [`Fetch`] implementation supplied by
//! the caller. Loading happens synchronously on the calling thread and no partially loaded state is
//! ever visible to queries.

mod annotation;
mod error;
mod fallback;
mod point_cloud_index;
mod queue;
mod settings;

pub use annotation::*;
pub use error::*;
pub use fallback::*;
pub use point_cloud_index::*;
pub use queue::*;
pub use settings::*;
