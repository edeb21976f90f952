//! JSON output for scripted use
//!
//! When --json-progress flag is enabled, every per-file result and the final
//! summary are emitted as JSON lines to stdout, suppressing all other output.

use serde::{Deserialize, Serialize};

use crate::image_processing::{
    ConversionOutcome, ConversionReport, ModeConversion, RunSummary, SkipReason,
};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// File converted to PNG
    FileConverted {
        input_path: String,
        output_path: String,
        format: String,
        mode: String,
        conversion: String,
        width: Option<u32>,
        height: Option<u32>,
        original_bytes: u64,
        converted_bytes: u64,
        removed_original: bool,
    },
    /// File left alone
    FileSkipped { input_path: String, reason: String },
    /// File conversion failed
    FileFailed { input_path: String, error: String },
    /// Non-fatal notice, e.g. an unreadable subdirectory
    Warning { message: String },
    /// Run totals
    Summary {
        processed: usize,
        converted: usize,
        already_png: usize,
        failed: usize,
        duration_secs: f64,
    },
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn from_report(report: &ConversionReport) -> Self {
        let input_path = report.file.path.display().to_string();
        match &report.outcome {
            ConversionOutcome::Converted {
                output,
                conversion,
                original_bytes,
                converted_bytes,
                removed_original,
            } => Self::FileConverted {
                input_path,
                output_path: output.display().to_string(),
                format: report.file.format_name(),
                mode: report
                    .file
                    .mode
                    .map(|mode| mode.to_string())
                    .unwrap_or_default(),
                conversion: conversion_key(*conversion),
                width: report.file.dimensions.map(|(w, _)| w),
                height: report.file.dimensions.map(|(_, h)| h),
                original_bytes: *original_bytes,
                converted_bytes: *converted_bytes,
                removed_original: *removed_original,
            },
            ConversionOutcome::Skipped(SkipReason::AlreadyPng) => Self::FileSkipped {
                input_path,
                reason: "already_png".to_string(),
            },
            ConversionOutcome::Failed(error) => Self::FileFailed {
                input_path,
                error: error.to_string(),
            },
        }
    }

    /// Create and emit a per-file message
    pub fn file(report: &ConversionReport) {
        Self::from_report(report).emit();
    }

    /// Create and emit warning message
    pub fn warning(message: impl Into<String>) {
        Self::Warning {
            message: message.into(),
        }
        .emit();
    }

    /// Create and emit summary message
    pub fn summary(summary: &RunSummary, duration_secs: f64) {
        Self::Summary {
            processed: summary.processed,
            converted: summary.converted,
            already_png: summary.already_png(),
            failed: summary.failed,
            duration_secs,
        }
        .emit();
    }
}

fn conversion_key(conversion: ModeConversion) -> String {
    serde_json::to_value(conversion)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::{ColorMode, ImageFile};
    use image::ImageFormat;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_converted_message() {
        let mut file = ImageFile::new(Path::new("a.jpg"));
        file.format = Some(ImageFormat::Jpeg);
        file.mode = Some(ColorMode::Rgb);
        file.dimensions = Some((100, 80));
        let report = ConversionReport {
            file,
            outcome: ConversionOutcome::Converted {
                output: PathBuf::from("a.png"),
                conversion: ModeConversion::Keep,
                original_bytes: 10,
                converted_bytes: 20,
                removed_original: true,
            },
        };

        let json = serde_json::to_value(JsonMessage::from_report(&report)).unwrap();

        assert_eq!(json["type"], "file_converted");
        assert_eq!(json["output_path"], "a.png");
        assert_eq!(json["format"], "JPEG");
        assert_eq!(json["mode"], "RGB");
        assert_eq!(json["conversion"], "keep");
        assert_eq!(json["width"], 100);
        assert_eq!(json["removed_original"], true);
    }

    #[test]
    fn test_skipped_message() {
        let report = ConversionReport {
            file: ImageFile::new(Path::new("b.png")),
            outcome: ConversionOutcome::Skipped(SkipReason::AlreadyPng),
        };

        let json = serde_json::to_string(&JsonMessage::from_report(&report)).unwrap();

        assert_eq!(
            json,
            r#"{"type":"file_skipped","input_path":"b.png","reason":"already_png"}"#
        );
    }

    #[test]
    fn test_conversion_keys() {
        assert_eq!(conversion_key(ModeConversion::FlattenOnWhite), "flatten_on_white");
        assert_eq!(conversion_key(ModeConversion::PaletteToRgba), "palette_to_rgba");
    }

    #[test]
    fn test_summary_round_trip() {
        let message = JsonMessage::Summary {
            processed: 3,
            converted: 2,
            already_png: 1,
            failed: 0,
            duration_secs: 0.5,
        };
        let json = serde_json::to_string(&message).unwrap();
        let parsed: JsonMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, message);
    }
}
