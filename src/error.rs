use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Path '{}' does not exist.", .0.display())]
    PathNotFound(PathBuf),

    #[error("'{}' is not a valid file or directory.", .0.display())]
    InvalidPathType(PathBuf),

    #[error("Image codec support is missing: {0}")]
    MissingCodec(String),

    /// Recoverable: reported for a single file, never aborts a run
    #[error("Error converting {}: {message}", .path.display())]
    Conversion { path: PathBuf, message: String },
}

impl ConvertError {
    /// Flatten an anyhow chain into a per-file conversion error
    pub fn conversion(path: impl Into<PathBuf>, error: &anyhow::Error) -> Self {
        let message = error
            .chain()
            .map(|cause| cause.to_string())
            .collect::<Vec<_>>()
            .join(": ");
        Self::Conversion {
            path: path.into(),
            message,
        }
    }

    /// Whether the whole run must stop on this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Conversion { .. })
    }
}
