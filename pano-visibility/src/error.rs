use pano_pointclouds::DecodeError;
use std::io;
use thiserror::Error;

/// A track file could not be transferred.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} does not exist")]
    NotFound { url: String },
    #[error("failed to read {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    pub fn from_io(url: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            FetchError::NotFound {
                url: url.to_string(),
            }
        } else {
            FetchError::Io {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Why one slot of a point-cloud batch stayed empty.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("transfer failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("decoding failed: {0}")]
    Decode(#[from] DecodeError),
}
