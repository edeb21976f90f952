use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::codec;
use super::policy::{self, ColorMode};
use super::{ConversionOptions, ConversionOutcome, ConversionReport, ImageFile, SkipReason};
use crate::error::ConvertError;

/// Convert one image file to PNG.
///
/// Never returns an error: failures are captured in the report so a batch can
/// carry on with the next file. With no explicit `output`, the PNG lands next
/// to the input with a `.png` extension.
pub fn convert_to_png(
    input: &Path,
    output: Option<&Path>,
    options: &ConversionOptions,
) -> ConversionReport {
    let mut file = ImageFile::new(input);
    let outcome = match convert_inner(&mut file, output, options) {
        Ok(outcome) => outcome,
        Err(e) => ConversionOutcome::Failed(ConvertError::conversion(input, &e)),
    };
    ConversionReport { file, outcome }
}

fn convert_inner(
    file: &mut ImageFile,
    output: Option<&Path>,
    options: &ConversionOptions,
) -> Result<ConversionOutcome> {
    let input = file.path.clone();
    let original_bytes = fs::metadata(&input)
        .with_context(|| format!("Failed to read file size: {}", input.display()))?
        .len();
    file.byte_size = Some(original_bytes);

    // Only the contents count here; the reader below falls back to the
    // extension when they match no known signature
    let detected = codec::detect_format(&input)?;
    file.format = detected;
    let reader = codec::open(&input)?;

    if policy::is_already_png(&input, detected) {
        let dimensions = reader
            .into_dimensions()
            .with_context(|| format!("Failed to read PNG header: {}", input.display()))?;
        file.dimensions = Some(dimensions);
        return Ok(ConversionOutcome::Skipped(SkipReason::AlreadyPng));
    }

    let image = reader
        .decode()
        .with_context(|| format!("Failed to decode image: {}", input.display()))?;
    file.dimensions = Some((image.width(), image.height()));

    let mode = ColorMode::of(&image, codec::is_palette_source(&input, detected));
    file.mode = Some(mode);
    let conversion = policy::select_conversion(mode, options.preserve_transparency);

    let output_path: PathBuf = match output {
        Some(path) => path.to_path_buf(),
        None => policy::default_output_path(&input),
    };

    let converted = codec::convert(image, conversion);
    let converted_bytes = codec::save_png(&converted, &output_path)?;

    let removed_original =
        !options.keep_original && output_path != input && input.exists();
    if removed_original {
        fs::remove_file(&input)
            .with_context(|| format!("Failed to remove original: {}", input.display()))?;
    }

    Ok(ConversionOutcome::Converted {
        output: output_path,
        conversion,
        original_bytes,
        converted_bytes,
        removed_original,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::tempdir;

    fn preserve() -> ConversionOptions {
        ConversionOptions::default()
    }

    #[test]
    fn test_jpeg_replaced_by_png() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.jpg");
        RgbImage::from_pixel(100, 100, Rgb([120, 60, 30]))
            .save(&input)
            .unwrap();

        let report = convert_to_png(&input, None, &preserve());

        assert!(report.outcome.is_converted(), "{:?}", report.outcome);
        assert_eq!(report.file.format, Some(ImageFormat::Jpeg));
        assert_eq!(report.file.mode, Some(ColorMode::Rgb));
        let output = dir.path().join("a.png");
        assert!(output.exists());
        assert!(!input.exists());

        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 100));
    }

    #[test]
    fn test_png_skipped_untouched() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("b.png");
        RgbImage::new(50, 50).save(&input).unwrap();
        let before = fs::read(&input).unwrap();

        let report = convert_to_png(&input, None, &preserve());

        assert!(matches!(
            report.outcome,
            ConversionOutcome::Skipped(SkipReason::AlreadyPng)
        ));
        assert_eq!(report.file.dimensions, Some((50, 50)));
        assert_eq!(fs::read(&input).unwrap(), before);
    }

    #[test]
    fn test_misnamed_png_converted_in_place() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("photo.png");
        // JPEG contents behind a .png name
        let jpeg = dir.path().join("source.jpg");
        RgbImage::from_pixel(8, 6, Rgb([9, 9, 9])).save(&jpeg).unwrap();
        fs::rename(&jpeg, &input).unwrap();

        let report = convert_to_png(&input, None, &preserve());

        match report.outcome {
            ConversionOutcome::Converted {
                removed_original,
                ref output,
                ..
            } => {
                assert!(!removed_original);
                assert_eq!(output, &input);
            }
            ref other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            image::ImageReader::open(&input)
                .unwrap()
                .with_guessed_format()
                .unwrap()
                .format(),
            Some(ImageFormat::Png)
        );
    }

    #[test]
    fn test_keep_original_with_explicit_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("logo.bmp");
        RgbImage::from_pixel(12, 7, Rgb([0, 128, 255]))
            .save(&input)
            .unwrap();
        let output = policy::kept_original_output_path(&input);

        let options = ConversionOptions {
            keep_original: true,
            ..ConversionOptions::default()
        };
        let report = convert_to_png(&input, Some(&output), &options);

        assert!(report.outcome.is_converted());
        assert!(input.exists());
        assert!(dir.path().join("logo_png.png").exists());
    }

    #[test]
    fn test_rgba_keeps_alpha() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("icon.tiff");
        let mut img = RgbaImage::from_pixel(6, 6, Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        DynamicImage::ImageRgba8(img).save(&input).unwrap();

        let report = convert_to_png(&input, None, &preserve());

        assert!(report.outcome.is_converted());
        let decoded = image::open(dir.path().join("icon.png")).unwrap();
        assert!(decoded.color().has_alpha());
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_no_transparency_flattens_to_white() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("icon.tiff");
        let mut img = RgbaImage::from_pixel(6, 6, Rgba([255, 0, 0, 255]));
        img.put_pixel(2, 3, Rgba([0, 0, 0, 0]));
        DynamicImage::ImageRgba8(img).save(&input).unwrap();

        let options = ConversionOptions {
            preserve_transparency: false,
            ..ConversionOptions::default()
        };
        let report = convert_to_png(&input, None, &options);

        assert!(report.outcome.is_converted());
        let decoded = image::open(dir.path().join("icon.png")).unwrap();
        assert!(!decoded.color().has_alpha());
        let rgb = decoded.to_rgb8();
        assert_eq!(*rgb.get_pixel(2, 3), Rgb([255, 255, 255]));
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_text_named_png_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("x.png");
        fs::write(&input, b"this is not an image\n").unwrap();

        let report = convert_to_png(&input, None, &preserve());

        match &report.outcome {
            ConversionOutcome::Failed(err) => assert!(err.to_string().contains("x.png")),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(report.file.format, None);
        assert_eq!(fs::read(&input).unwrap(), b"this is not an image\n");
    }

    #[test]
    fn test_truncated_png_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("cut.png");
        // Signature only, no IHDR
        fs::write(&input, b"\x89PNG\r\n\x1a\n").unwrap();

        let report = convert_to_png(&input, None, &preserve());

        assert!(matches!(report.outcome, ConversionOutcome::Failed(_)));
        assert_eq!(report.file.format, Some(ImageFormat::Png));
    }

    #[test]
    fn test_corrupt_file_fails_and_is_kept() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("broken.jpg");
        fs::write(&input, b"\xFF\xD8\xFFnot really a jpeg").unwrap();

        let report = convert_to_png(&input, None, &preserve());

        match &report.outcome {
            ConversionOutcome::Failed(err) => {
                assert!(!err.is_fatal());
                assert!(err.to_string().contains("broken.jpg"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(input.exists());
        assert!(!dir.path().join("broken.png").exists());
    }
}
