//! Thin adapter over the `image` crate: open, convert, composite and save.

use anyhow::{Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{
    DynamicImage, GrayImage, ImageEncoder, ImageFormat, ImageReader, Rgb, RgbImage,
};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use super::policy::ModeConversion;
use super::SUPPORTED_EXTENSIONS;
use crate::error::ConvertError;

/// Verify the linked codec build can read every supported input and write PNG
pub fn check_capabilities() -> std::result::Result<(), ConvertError> {
    if !ImageFormat::Png.writing_enabled() {
        return Err(ConvertError::MissingCodec(
            "PNG encoding is not enabled in this build".to_string(),
        ));
    }

    let missing: Vec<&str> = SUPPORTED_EXTENSIONS
        .iter()
        .copied()
        .filter(|ext| {
            !ImageFormat::from_extension(ext).is_some_and(|format| format.reading_enabled())
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConvertError::MissingCodec(format!(
            "no decoder for: {}",
            missing.join(", ")
        )))
    }
}

/// Leading bytes read for header sniffing: a full BMP header plus a 256-entry
/// color table
const HEADER_LEN: u64 = 14 + 124 + 1024;

const TIFF_PHOTOMETRIC: u16 = 262;
const TIFF_PHOTOMETRIC_PALETTE: u16 = 3;

fn read_header(path: &Path) -> Result<Vec<u8>> {
    let mut header = Vec::new();
    File::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .take(HEADER_LEN)
        .read_to_end(&mut header)
        .with_context(|| format!("Failed to read image header: {}", path.display()))?;
    Ok(header)
}

/// Format recognized from the file's leading bytes alone.
///
/// `None` when the contents match no known signature, whatever the extension.
pub fn detect_format(path: &Path) -> Result<Option<ImageFormat>> {
    let header = read_header(path)?;
    Ok(image::guess_format(&header).ok())
}

/// Whether the source stores palette indices rather than color values.
///
/// The decoders expand palettes, so this looks at the file header instead.
pub fn is_palette_source(path: &Path, format: Option<ImageFormat>) -> bool {
    match format {
        Some(ImageFormat::Gif) => true,
        Some(ImageFormat::Bmp) => read_header(path).is_ok_and(|header| bmp_is_indexed(&header)),
        Some(ImageFormat::Tiff) => fs::read(path).is_ok_and(|bytes| tiff_is_indexed(&bytes)),
        _ => false,
    }
}

fn le_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    bytes
        .get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn le_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// 1, 4 and 8 bit BMPs carry a color table. One whose entries are all gray
/// is a grayscale image, not a palette image.
fn bmp_is_indexed(header: &[u8]) -> bool {
    let Some(dib_size) = le_u32(header, 14) else {
        return false;
    };
    // OS/2 core headers keep 16-bit dimensions and 3-byte table entries
    let core = dib_size == 12;
    let bit_count = if core {
        le_u16(header, 24)
    } else {
        le_u16(header, 28)
    };
    let Some(bits) = bit_count.filter(|bits| *bits <= 8) else {
        return false;
    };

    let used = if core { None } else { le_u32(header, 46) };
    let colors = match used {
        Some(n) if n > 0 => n as usize,
        _ => 1usize << bits,
    };
    let entry_len = if core { 3 } else { 4 };
    let table_start = 14 + dib_size as usize;

    let gray = (0..colors).all(|i| {
        match header.get(table_start + i * entry_len..table_start + i * entry_len + 3) {
            Some(bgr) => bgr[0] == bgr[1] && bgr[1] == bgr[2],
            None => true,
        }
    });
    !gray
}

/// Photometric interpretation of the first IFD is "palette color"
fn tiff_is_indexed(bytes: &[u8]) -> bool {
    let little = match bytes.get(0..2) {
        Some(b"II") => true,
        Some(b"MM") => false,
        _ => return false,
    };
    let u16_at = |offset: usize| {
        bytes.get(offset..offset + 2).map(|b| {
            let raw = [b[0], b[1]];
            if little {
                u16::from_le_bytes(raw)
            } else {
                u16::from_be_bytes(raw)
            }
        })
    };
    let u32_at = |offset: usize| {
        bytes.get(offset..offset + 4).map(|b| {
            let raw = [b[0], b[1], b[2], b[3]];
            if little {
                u32::from_le_bytes(raw)
            } else {
                u32::from_be_bytes(raw)
            }
        })
    };

    let Some(ifd) = u32_at(4).map(|offset| offset as usize) else {
        return false;
    };
    let Some(count) = u16_at(ifd) else {
        return false;
    };
    (0..count as usize).any(|i| {
        let entry = ifd + 2 + i * 12;
        u16_at(entry) == Some(TIFF_PHOTOMETRIC)
            && u16_at(entry + 8) == Some(TIFF_PHOTOMETRIC_PALETTE)
    })
}

/// Open an image with its format detected from the contents, falling back to
/// the extension when the contents are not recognized
pub fn open(path: &Path) -> Result<ImageReader<BufReader<File>>> {
    ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image header: {}", path.display()))
}

/// Apply a mode conversion, consuming the decoded image
pub fn convert(image: DynamicImage, conversion: ModeConversion) -> DynamicImage {
    match conversion {
        ModeConversion::Keep => image,
        ModeConversion::PaletteToRgba | ModeConversion::ToRgba => {
            DynamicImage::ImageRgba8(image.into_rgba8())
        }
        ModeConversion::FlattenOnWhite => DynamicImage::ImageRgb8(flatten_on_white(&image)),
        ModeConversion::ToRgb => DynamicImage::ImageRgb8(image.into_rgb8()),
    }
}

/// Composite an image onto an opaque white canvas using its alpha channel
pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let colors = RgbImage::from_fn(width, height, |x, y| {
        let p = rgba.get_pixel(x, y);
        Rgb([p[0], p[1], p[2]])
    });
    let mask = GrayImage::from_fn(width, height, |x, y| image::Luma([rgba.get_pixel(x, y)[3]]));

    paste_with_mask(&mut canvas, &colors, &mask);
    canvas
}

/// Paste `image` onto `canvas` at the origin, blending each pixel by `mask`.
///
/// A mask value of 255 copies the source pixel, 0 keeps the canvas pixel.
pub fn paste_with_mask(canvas: &mut RgbImage, image: &RgbImage, mask: &GrayImage) {
    let width = canvas.width().min(image.width()).min(mask.width());
    let height = canvas.height().min(image.height()).min(mask.height());

    for y in 0..height {
        for x in 0..width {
            let alpha = mask.get_pixel(x, y)[0] as u32;
            if alpha == 0 {
                continue;
            }

            let src = image.get_pixel(x, y);
            let dst = canvas.get_pixel_mut(x, y);
            for c in 0..3 {
                let blended = src[c] as u32 * alpha + dst[c] as u32 * (255 - alpha);
                dst[c] = ((blended + 127) / 255) as u8;
            }
        }
    }
}

/// Encode as PNG with maximum compression and adaptive filtering
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer: Vec<u8> = Vec::new();
    PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive)
        .write_image(
            image.as_bytes(),
            image.width(),
            image.height(),
            image.color().into(),
        )
        .context("Failed to encode PNG")?;
    Ok(buffer)
}

/// Encode in memory first so a failed encode never touches the destination.
/// Returns the number of bytes written.
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<u64> {
    let bytes = encode_png(image)?;
    fs::write(path, &bytes)
        .with_context(|| format!("Failed to write PNG: {}", path.display()))?;
    Ok(bytes.len() as u64)
}
