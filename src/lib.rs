// Library exports for reuse by the binary and integration tests
pub mod cli;
pub mod config_file;
pub mod error;
pub mod image_processing;
pub mod json_output;
pub mod reporter;
pub mod utils;

// Re-export commonly used types
pub use error::ConvertError;
pub use image_processing::{
    convert_to_png, process_directory, ColorMode, ConversionOptions, ConversionOutcome,
    ConversionReport, ModeConversion, RunSummary,
};
pub use json_output::JsonMessage;
