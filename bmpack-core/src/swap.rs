//! 16-bit byte order swapping for pixel payloads

use crate::{Error, Result};

/// Swaps the two bytes of every 16-bit pixel in `region`.
///
/// Odd-length regions are rejected before anything is touched.
pub fn swap_pixel_bytes(region: &mut [u8]) -> Result<()> {
    if region.len() % 2 != 0 {
        return Err(Error::malformed(format!(
            "pixel region of {} bytes is not a whole number of 16-bit pixels",
            region.len()
        )));
    }

    for pixel in region.chunks_exact_mut(2) {
        pixel.swap(0, 1);
    }

    Ok(())
}

/// Takes ownership of a normalized buffer and swaps everything from
/// `data_start` to the end, handing the buffer back.
pub fn swap_payload(mut buffer: Vec<u8>, data_start: usize) -> Result<Vec<u8>> {
    let region = buffer.get_mut(data_start..).ok_or_else(|| {
        Error::malformed(format!(
            "pixel data offset {} beyond buffer length",
            data_start
        ))
    })?;
    swap_pixel_bytes(region)?;
    Ok(buffer)
}
