//! Conversion policy: which color transformation a decoded image needs before
//! it is written as PNG, and where the PNG goes.

use image::{ColorType, DynamicImage, ImageFormat};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Pixel layout of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// 8-bit grayscale
    Luma,
    /// 8-bit grayscale with alpha
    LumaAlpha,
    /// 8-bit RGB
    Rgb,
    /// 8-bit RGB with alpha
    Rgba,
    /// Palette-indexed source, optionally with a transparent index
    Palette { transparent: bool },
    /// Four-channel print layout. The bundled JPEG decoder converts these to RGB.
    Cmyk,
    /// 16-bit and floating point layouts
    Other(ColorType),
}

impl ColorMode {
    /// Classify a decoded image.
    ///
    /// The codec expands palettes while decoding, so whether the source was
    /// indexed comes from its header. Palette sources are transparent when any
    /// expanded pixel is not opaque.
    pub fn of(image: &DynamicImage, palette_source: bool) -> Self {
        if palette_source {
            return ColorMode::Palette {
                transparent: has_transparent_pixel(image),
            };
        }

        match image.color() {
            ColorType::L8 => ColorMode::Luma,
            ColorType::La8 => ColorMode::LumaAlpha,
            ColorType::Rgb8 => ColorMode::Rgb,
            ColorType::Rgba8 => ColorMode::Rgba,
            other => ColorMode::Other(other),
        }
    }

    pub fn has_alpha(&self) -> bool {
        match self {
            ColorMode::LumaAlpha | ColorMode::Rgba => true,
            ColorMode::Palette { transparent } => *transparent,
            ColorMode::Other(color) => color.has_alpha(),
            ColorMode::Luma | ColorMode::Rgb | ColorMode::Cmyk => false,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Luma => write!(f, "L"),
            ColorMode::LumaAlpha => write!(f, "LA"),
            ColorMode::Rgb => write!(f, "RGB"),
            ColorMode::Rgba => write!(f, "RGBA"),
            ColorMode::Palette { transparent: true } => write!(f, "P+transparency"),
            ColorMode::Palette { transparent: false } => write!(f, "P"),
            ColorMode::Cmyk => write!(f, "CMYK"),
            ColorMode::Other(color) => write!(f, "{:?}", color),
        }
    }
}

fn has_transparent_pixel(image: &DynamicImage) -> bool {
    if !image.color().has_alpha() {
        return false;
    }
    image.to_rgba8().pixels().any(|pixel| pixel[3] < u8::MAX)
}

/// Color transformation applied before encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeConversion {
    /// Write the decoded buffer as-is
    Keep,
    /// Expand a palette with a transparent index to full RGBA
    PaletteToRgba,
    /// Any layout PNG output does not take directly, widened to RGBA
    ToRgba,
    /// Composite onto an opaque white canvas using alpha as the mask
    FlattenOnWhite,
    /// Drop to plain RGB
    ToRgb,
}

impl fmt::Display for ModeConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModeConversion::Keep => "keep",
            ModeConversion::PaletteToRgba => "palette → RGBA",
            ModeConversion::ToRgba => "→ RGBA",
            ModeConversion::FlattenOnWhite => "flatten on white",
            ModeConversion::ToRgb => "→ RGB",
        };
        f.write_str(label)
    }
}

/// Pick the conversion for a color mode
pub fn select_conversion(mode: ColorMode, preserve_transparency: bool) -> ModeConversion {
    if preserve_transparency {
        match mode {
            ColorMode::Rgba | ColorMode::LumaAlpha => ModeConversion::Keep,
            ColorMode::Palette { transparent: true } => ModeConversion::PaletteToRgba,
            ColorMode::Rgb | ColorMode::Luma | ColorMode::Cmyk => ModeConversion::Keep,
            ColorMode::Palette { transparent: false } | ColorMode::Other(_) => {
                ModeConversion::ToRgba
            }
        }
    } else if mode.has_alpha() {
        ModeConversion::FlattenOnWhite
    } else {
        ModeConversion::ToRgb
    }
}

/// Default output location: same directory and stem, `.png` extension
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("png")
}

/// Output location used when the original is kept: `<stem>_png.png`
pub fn kept_original_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}_png.png", stem))
}

/// A file is left alone when both its name and its contents say PNG
pub fn is_already_png(input: &Path, format: Option<ImageFormat>) -> bool {
    let png_extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    png_extension && format == Some(ImageFormat::Png)
}
