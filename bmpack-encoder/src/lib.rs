//! bmpack Encoder Library
//!
//! This library turns bitmap files into packed RGB565 assets and drives a full
//! packing run over an ordered list of inputs.

pub mod normalizer;
pub mod packer;
pub mod progress_tracker;

pub use normalizer::Rgb565;
pub use packer::{AssetPacker, AssetRecord, PackOutcome, PackReport, SkippedFile};

use std::path::PathBuf;

/// Result type for bmpack-encoder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for bmpack-encoder operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] bmpack_core::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Malformed bitmap {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: bmpack_core::Error,
    },
}

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    Decode,
    Io,
    Symbol,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::Malformed { .. } => ErrorKind::MalformedInput,
            Error::Core(core) => match core {
                bmpack_core::Error::Io(_) => ErrorKind::Io,
                bmpack_core::Error::MalformedInput { .. } => ErrorKind::MalformedInput,
                bmpack_core::Error::DuplicateSymbol(_)
                | bmpack_core::Error::InvalidSymbolName(_) => ErrorKind::Symbol,
                _ => ErrorKind::Config,
            },
        }
    }

    /// Whether the skip policy may leave this file out instead of aborting
    pub fn is_skippable(&self) -> bool {
        matches!(self.kind(), ErrorKind::MalformedInput | ErrorKind::Decode)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{ImageFormat, Rgb, RgbImage};
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Fresh scratch directory under the system temp dir
    pub fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "bmpack-encoder-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Writes a 24-bit BMP filled with a gradient
    pub fn write_bmp(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
        });
        let path = dir.join(name);
        image.save_with_format(&path, ImageFormat::Bmp).unwrap();
        path
    }
}
