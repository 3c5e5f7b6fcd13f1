//! RGB565 normalization
//!
//! Any image the `image` crate can decode is re-encoded as a 16-bpp
//! `BI_BITFIELDS` bitmap. The layout is the one the header reader expects:
//!
//!   0x00  file header (14 bytes, "BM", size, pixel data offset)
//!   0x0E  BITMAPINFOHEADER (40 bytes, width, height, 16 bpp)
//!   0x36  channel masks R 0xF800, G 0x07E0, B 0x001F
//!   0x42  pixel rows, little-endian u16 per pixel, each row padded to 4 bytes
//!
//! Rows are stored top row first while the height field stays positive. The
//! firmware streams rows in file order, so this is what ends up on screen the
//! right way up.

use crate::Result;
use bmpack_core::Error as CoreError;
use byteorder::{LittleEndian, WriteBytesExt};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Write;

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
const MASKS_LEN: u32 = 12;

/// Offset of the first pixel in a normalized buffer
pub const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_LEN + INFO_HEADER_LEN + MASKS_LEN;

const BI_BITFIELDS: u32 = 3;
const BITS_PER_PIXEL: u16 = 16;
// 72 DPI
const PIXELS_PER_METER: u32 = 2835;

const RED_MASK: u32 = 0xF800;
const GREEN_MASK: u32 = 0x07E0;
const BLUE_MASK: u32 = 0x001F;

/// A 5-6-5 packed colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    /// Truncates each 8-bit channel to its 5/6/5-bit width
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r5 = (r >> 3) as u16;
        let g6 = (g >> 2) as u16;
        let b5 = (b >> 3) as u16;
        Self((r5 << 11) | (g6 << 5) | b5)
    }
}

/// Bytes taken by one padded pixel row
pub fn row_stride(width: u32) -> usize {
    (width as usize * 2 + 3) & !3
}

/// Decodes a bitmap file's bytes
pub fn decode_bitmap(bytes: &[u8]) -> image::ImageResult<DynamicImage> {
    image::load_from_memory_with_format(bytes, ImageFormat::Bmp)
}

/// Re-encodes `image` as a 16-bpp RGB565 bitmap container.
///
/// Alpha is dropped.
pub fn normalize(image: &DynamicImage) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let stride = row_stride(width);
    let pixel_bytes = stride * height as usize;
    let file_size = PIXEL_DATA_OFFSET as usize + pixel_bytes;
    let file_size_field = u32::try_from(file_size)
        .map_err(|_| CoreError::MalformedInput {
            reason: format!("{}x{} image does not fit a bitmap container", width, height),
        })?;

    let mut out = Vec::with_capacity(file_size);
    write_headers(&mut out, width, height, file_size_field, pixel_bytes as u32)
        .map_err(CoreError::from)?;
    write_pixels(&mut out, &rgb, stride).map_err(CoreError::from)?;

    Ok(out)
}

fn write_headers<W: Write>(
    writer: &mut W,
    width: u32,
    height: u32,
    file_size: u32,
    image_size: u32,
) -> std::io::Result<()> {
    // File header
    writer.write_all(b"BM")?;
    writer.write_u32::<LittleEndian>(file_size)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(PIXEL_DATA_OFFSET)?;

    // Info header
    writer.write_u32::<LittleEndian>(INFO_HEADER_LEN)?;
    writer.write_u32::<LittleEndian>(width)?;
    writer.write_u32::<LittleEndian>(height)?;
    writer.write_u16::<LittleEndian>(1)?;
    writer.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
    writer.write_u32::<LittleEndian>(BI_BITFIELDS)?;
    writer.write_u32::<LittleEndian>(image_size)?;
    writer.write_u32::<LittleEndian>(PIXELS_PER_METER)?;
    writer.write_u32::<LittleEndian>(PIXELS_PER_METER)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(0)?;

    writer.write_u32::<LittleEndian>(RED_MASK)?;
    writer.write_u32::<LittleEndian>(GREEN_MASK)?;
    writer.write_u32::<LittleEndian>(BLUE_MASK)?;
    Ok(())
}

fn write_pixels<W: Write>(writer: &mut W, rgb: &RgbImage, stride: usize) -> std::io::Result<()> {
    let padding = stride - rgb.width() as usize * 2;
    for row in rgb.rows() {
        for pixel in row {
            let [r, g, b] = pixel.0;
            writer.write_u16::<LittleEndian>(Rgb565::from_rgb(r, g, b).0)?;
        }
        writer.write_all(&[0u8; 2][..padding])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmpack_core::header::read_header_fields;
    use image::{imageops, Rgb, Rgba, RgbaImage};

    #[test]
    fn test_rgb565_packing() {
        assert_eq!(Rgb565::from_rgb(255, 0, 0).0, 0xF800);
        assert_eq!(Rgb565::from_rgb(0, 255, 0).0, 0x07E0);
        assert_eq!(Rgb565::from_rgb(0, 0, 255).0, 0x001F);
        assert_eq!(Rgb565::from_rgb(255, 255, 255).0, 0xFFFF);
        assert_eq!(Rgb565::from_rgb(7, 3, 7).0, 0x0000);
    }

    #[test]
    fn test_row_stride_padding() {
        assert_eq!(row_stride(4), 8);
        assert_eq!(row_stride(3), 8);
        assert_eq!(row_stride(1), 4);
        assert_eq!(row_stride(0), 0);
    }

    #[test]
    fn test_header_fields_match_reader() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 3));
        let buffer = normalize(&image).unwrap();
        let fields = read_header_fields(&buffer).unwrap();

        assert_eq!(fields.pixel_data_offset, PIXEL_DATA_OFFSET);
        assert_eq!(fields.width, 4);
        assert_eq!(fields.height, 3);
        assert_eq!(fields.total_size as usize, buffer.len());
        assert_eq!(buffer.len() - fields.data_start(), 4 * 3 * 2);
    }

    #[test]
    fn test_odd_width_rows_are_padded() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, Rgb([255, 255, 255])));
        let buffer = normalize(&image).unwrap();
        let payload = &buffer[PIXEL_DATA_OFFSET as usize..];

        assert_eq!(payload.len(), 16);
        assert_eq!(&payload[..8], &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0]);
    }

    #[test]
    fn test_top_row_first() {
        let mut image = RgbImage::new(1, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(0, 1, Rgb([0, 0, 255]));
        let buffer = normalize(&DynamicImage::ImageRgb8(image)).unwrap();
        let payload = &buffer[PIXEL_DATA_OFFSET as usize..];

        assert_eq!(&payload[0..2], &0xF800u16.to_le_bytes());
        assert_eq!(&payload[4..6], &0x001Fu16.to_le_bytes());
    }

    #[test]
    fn test_alpha_is_dropped() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 0]));
        let buffer = normalize(&DynamicImage::ImageRgba8(image)).unwrap();
        assert_eq!(&buffer[PIXEL_DATA_OFFSET as usize..][..2], &0xF800u16.to_le_bytes());
    }

    #[test]
    fn test_renormalizing_rgb565_keeps_pixel_values() {
        let image = RgbImage::from_fn(6, 5, |x, y| {
            Rgb([(x * 40) as u8, (y * 50) as u8, ((x * y) * 9) as u8])
        });
        let first = normalize(&DynamicImage::ImageRgb8(image)).unwrap();

        // The decoder reads the positive-height container bottom-up.
        let decoded = decode_bitmap(&first).unwrap();
        let upright = DynamicImage::ImageRgb8(imageops::flip_vertical(&decoded.to_rgb8()));
        let second = normalize(&upright).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_bitmap(b"not a bitmap at all").is_err());
    }
}
