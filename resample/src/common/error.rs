use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid file extension: {0}")]
    InvalidExtension(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("GPU error: {0}")]
    Gpu(String),
    #[error("GPU context not available")]
    NoGpuContext,
}

impl Error {
    /// True for failures that only rule out the GPU model, leaving the CPU models usable.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Error::Gpu(_) | Error::NoGpuContext)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => Error::Io(io),
            other => Error::Encoding(other.to_string()),
        }
    }
}

impl From<serde_yml::Error> for Error {
    fn from(e: serde_yml::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
