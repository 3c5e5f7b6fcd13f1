//! bmpack Core Library
//!
//! This library provides the format-level pieces of the bmpack asset packer:
//! fixed-offset bitmap header access, 16-bit byte order swapping, symbol table
//! generation and atomic commit of the packed outputs.

pub mod asset;
pub mod config;
pub mod header;
pub mod output;
pub mod scan;
pub mod swap;
pub mod symbols;

pub use asset::PackedAsset;
pub use config::{FailurePolicy, FileOrder, MemoryBudget, PackerConfig};
pub use header::HeaderFields;
pub use output::OutputPair;
pub use symbols::{Summary, SymbolTable};

use std::path::PathBuf;

/// Result type for bmpack-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for bmpack-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("Duplicate symbol name: {0}")]
    DuplicateSymbol(String),

    #[error("Cannot derive a symbol name from {0}")]
    InvalidSymbolName(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[cfg(feature = "serde")]
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            reason: reason.into(),
        }
    }
}
