use thiserror::Error;

/// The reasons a track file can fail to decode.
///
/// None of them is fatal to anything but the file being decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported track format version {major}.{minor}")]
    VersionMismatch { major: u16, minor: u16 },
    #[error("buffer truncated at offset {offset}: wanted {wanted} more bytes out of {len}")]
    Truncated {
        offset: usize,
        wanted: usize,
        len: usize,
    },
    #[error("varint starting at offset {offset} does not fit in 64 bits")]
    VarIntOverflow { offset: usize },
    #[error("image {image} observes vertices {start}..{end} but the cloud only has {vertex_count}")]
    RangeOutOfBounds {
        image: usize,
        start: u64,
        end: u64,
        vertex_count: usize,
    },
}

impl DecodeError {
    /// A version mismatch is a recognized incompatibility rather than a corrupt file.
    pub fn is_incompatible(&self) -> bool {
        matches!(self, DecodeError::VersionMismatch { .. })
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;
