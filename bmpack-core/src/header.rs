//! Fixed-offset access to the minimal bitmap container fields

use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Offset of the total file size field
pub const SIZE_OFFSET: usize = 0x02;
/// Offset of the pixel-data offset field
pub const DATA_OFFSET: usize = 0x0A;
/// Offset of the width field
pub const WIDTH_OFFSET: usize = 0x12;
/// Offset of the height field
pub const HEIGHT_OFFSET: usize = 0x16;

/// Smallest buffer that still carries every field read by [`read_header_fields`]
pub const MIN_HEADER_LEN: usize = HEIGHT_OFFSET + 4;

/// The four fields the packer needs out of a bitmap container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFields {
    /// Total size as recorded in the container (not checked against the buffer)
    pub total_size: u32,
    /// Start of the pixel data region
    pub pixel_data_offset: u32,
    /// Width in pixels, as stored (signed in BMP, kept raw here)
    pub width: u32,
    /// Height in pixels, as stored
    pub height: u32,
}

impl HeaderFields {
    /// Width truncated to the single byte written in front of each asset
    pub fn width_byte(&self) -> u8 {
        self.width as u8
    }

    /// Height truncated to the single byte written in front of each asset
    pub fn height_byte(&self) -> u8 {
        self.height as u8
    }

    /// Whether either dimension loses information when truncated to a byte
    pub fn dimensions_truncated(&self) -> bool {
        self.width > u8::MAX as u32 || self.height > u8::MAX as u32
    }

    /// Pixel data offset as a buffer index
    pub fn data_start(&self) -> usize {
        self.pixel_data_offset as usize
    }
}

fn read_u32_at(buffer: &[u8], offset: usize) -> Result<u32> {
    let bytes = buffer.get(offset..offset + 4).ok_or_else(|| {
        Error::malformed(format!(
            "buffer of {} bytes too short for field at 0x{:02X}",
            buffer.len(),
            offset
        ))
    })?;
    Ok(LittleEndian::read_u32(bytes))
}

/// Reads the size, pixel-data offset, width and height fields.
///
/// The magic signature and compression mode are not inspected; any buffer of at
/// least [`MIN_HEADER_LEN`] bytes whose pixel-data offset lies inside it is
/// accepted.
pub fn read_header_fields(buffer: &[u8]) -> Result<HeaderFields> {
    if buffer.len() < MIN_HEADER_LEN {
        return Err(Error::malformed(format!(
            "bitmap header needs {} bytes, got {}",
            MIN_HEADER_LEN,
            buffer.len()
        )));
    }

    let fields = HeaderFields {
        total_size: read_u32_at(buffer, SIZE_OFFSET)?,
        pixel_data_offset: read_u32_at(buffer, DATA_OFFSET)?,
        width: read_u32_at(buffer, WIDTH_OFFSET)?,
        height: read_u32_at(buffer, HEIGHT_OFFSET)?,
    };

    if fields.data_start() > buffer.len() {
        return Err(Error::malformed(format!(
            "pixel data offset {} beyond buffer length {}",
            fields.pixel_data_offset,
            buffer.len()
        )));
    }

    Ok(fields)
}
