//! # `pano`
//!
//! Batteries-included annotation visibility for immersive-photo captures.
//!
//! The scene model from `pano-core` is included in the root of the crate. Everything else comes
//! from optional crates and lives in modules.
//!
//! ## Modules
//! * [`pointclouds`] - decoding the track files of a capture
//! * [`visibility`] - deciding which cameras see which annotated points

pub use pano_core::*;

/// Track file decoding and encoding
pub mod pointclouds {
    #[cfg(feature = "pano-pointclouds")]
    pub use pano_pointclouds::*;
}

/// Visibility indices, from point clouds or from the capture path
pub mod visibility {
    #[cfg(feature = "pano-visibility")]
    pub use pano_visibility::*;
}
