//! Packed asset data structures

use crate::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Number of prefix bytes (width, height) written ahead of each payload
pub const PREFIX_LEN: usize = 2;

/// A single transcoded image ready to be appended to the data blob
#[derive(Debug, Clone)]
pub struct PackedAsset {
    /// Symbol name used in the generated header
    pub name: String,
    /// Width truncated to one byte
    pub width: u8,
    /// Height truncated to one byte
    pub height: u8,
    /// Byte-swapped RGB565 pixel payload
    pub payload: Vec<u8>,
}

impl PackedAsset {
    /// Creates a new packed asset
    pub fn new(name: String, width: u8, height: u8, payload: Vec<u8>) -> Self {
        Self {
            name,
            width,
            height,
            payload,
        }
    }

    /// Returns the size of the pixel payload in bytes
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Returns the number of bytes this asset occupies in the data blob
    pub fn packed_len(&self) -> usize {
        self.payload.len() + PREFIX_LEN
    }

    /// Writes `[width][height][payload]` to the writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[self.width, self.height])?;
        writer.write_all(&self.payload)?;
        Ok(())
    }
}

/// Derives the header symbol name from a file path.
///
/// The directory and extension are stripped. Anything that cannot appear in a
/// C identifier becomes `_`, and a leading digit is prefixed with `_`.
pub fn symbol_name(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidSymbolName(path.to_path_buf()))?;

    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }

    Ok(name)
}
