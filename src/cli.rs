use clap::Parser;
use std::path::PathBuf;

use crate::image_processing::ConversionOptions;

#[derive(Parser, Debug)]
#[command(
    name = "png-converter",
    version,
    about = "Convert all images to PNG format",
    long_about = "
PNG Converter

Converts every image under a directory (or a single image file) to PNG,
replacing the originals. Files that are already PNG are left untouched.

Supported inputs: jpg, jpeg, bmp, tiff, tif, webp, gif, ico, png

Example Usage:
  # Convert everything under the current directory, recursively
  png-converter

  # Only the top level of a folder, dropping transparency onto white
  png-converter ~/Pictures --no-recursive --no-transparency

  # Single file, keeping the original next to logo_png.png
  png-converter assets/logo.bmp --keep-originals

  # Machine-readable progress
  png-converter ~/Pictures --json-progress"
)]
pub struct Args {
    /// Path to directory or image file
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Don't process subdirectories
    #[arg(long = "no-recursive")]
    pub no_recursive: bool,

    /// Remove transparency (convert to RGB with white background)
    #[arg(long = "no-transparency")]
    pub no_transparency: bool,

    /// Keep original files (create new PNG files instead of replacing). Single files only
    #[arg(long = "keep-originals")]
    pub keep_originals: bool,

    /// Enable verbose output with detected color modes and chosen conversions
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Emit progress as JSON lines instead of styled text
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Print a table with every file's outcome at the end
    #[arg(long = "report")]
    pub report: bool,

    /// JSON configuration file; command-line flags take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

impl Args {
    pub fn recursive(&self) -> bool {
        !self.no_recursive
    }

    pub fn preserve_transparency(&self) -> bool {
        !self.no_transparency
    }

    /// Options for a single conversion. Keep-originals only applies to a
    /// single file, so directory runs pass `single_file = false`.
    pub fn conversion_options(&self, single_file: bool) -> ConversionOptions {
        ConversionOptions {
            preserve_transparency: self.preserve_transparency(),
            keep_original: single_file && self.keep_originals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["png-converter"]);
        assert_eq!(args.path, PathBuf::from("."));
        assert!(args.recursive());
        assert!(args.preserve_transparency());
        assert!(!args.keep_originals);
        assert!(args.config_file.is_none());
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "png-converter",
            "photos",
            "--no-recursive",
            "--no-transparency",
            "--keep-originals",
            "-v",
            "--report",
        ]);
        assert_eq!(args.path, PathBuf::from("photos"));
        assert!(!args.recursive());
        assert!(!args.preserve_transparency());
        assert!(args.verbose);
        assert!(args.report);
    }

    #[test]
    fn test_keep_originals_only_for_single_file() {
        let args = Args::parse_from(["png-converter", "logo.bmp", "--keep-originals"]);
        assert!(args.conversion_options(true).keep_original);
        assert!(!args.conversion_options(false).keep_original);
    }

    #[test]
    fn test_verify_command() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}

// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            no_recursive: false,
            no_transparency: false,
            keep_originals: false,
            verbose: false,
            json_progress: false,
            report: false,
            config_file: None,
        }
    }
}
