pub mod batch;
pub mod codec;
pub mod convert;
pub mod policy;
pub mod report_table;
pub mod walker;

use image::ImageFormat;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;

pub use batch::{process_directory, BatchEvent, RunSummary};
pub use convert::convert_to_png;
pub use policy::{ColorMode, ModeConversion};
pub use walker::{walk, WalkEntry};

/// Extensions (lowercase) picked up by the directory walk
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "bmp", "tiff", "tif", "webp", "gif", "ico", "png",
];

/// How a single conversion treats transparency and the source file
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub preserve_transparency: bool,
    /// Never delete the source, even when the PNG lands elsewhere
    pub keep_original: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            preserve_transparency: true,
            keep_original: false,
        }
    }
}

/// What was learned about a source image while converting it
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub path: PathBuf,
    pub format: Option<ImageFormat>,
    pub mode: Option<ColorMode>,
    pub dimensions: Option<(u32, u32)>,
    pub byte_size: Option<u64>,
}

impl ImageFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            format: None,
            mode: None,
            dimensions: None,
            byte_size: None,
        }
    }

    /// Format name as shown to the user, e.g. `JPEG`
    pub fn format_name(&self) -> String {
        match self.format {
            Some(format) => format!("{:?}", format).to_uppercase(),
            None => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyPng,
}

#[derive(Debug)]
pub enum ConversionOutcome {
    Converted {
        output: PathBuf,
        conversion: ModeConversion,
        original_bytes: u64,
        converted_bytes: u64,
        removed_original: bool,
    },
    Skipped(SkipReason),
    Failed(ConvertError),
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }
}

/// Per-file result: the source as far as it was read, and what happened to it
#[derive(Debug)]
pub struct ConversionReport {
    pub file: ImageFile,
    pub outcome: ConversionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_preserve_transparency() {
        let options = ConversionOptions::default();
        assert!(options.preserve_transparency);
        assert!(!options.keep_original);
    }

    #[test]
    fn test_format_name() {
        let mut file = ImageFile::new(Path::new("a.jpg"));
        assert_eq!(file.format_name(), "unknown");

        file.format = Some(ImageFormat::Jpeg);
        assert_eq!(file.format_name(), "JPEG");

        file.format = Some(ImageFormat::Png);
        assert_eq!(file.format_name(), "PNG");
    }

    #[test]
    fn test_supported_extensions_are_lowercase() {
        for ext in SUPPORTED_EXTENSIONS {
            assert_eq!(*ext, ext.to_lowercase());
        }
    }
}
