use eink_raster::RasterError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeinkError {
    #[error("{0}")]
    Raster(#[from] RasterError),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image error on {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Validation(String),
}

/// How a failed item should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    SizeMismatch,
    Io,
}

impl GeinkError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeinkError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        GeinkError::Image {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GeinkError::Raster(e) => match e.kind() {
                eink_raster::ErrorKind::SizeMismatch => ErrorKind::SizeMismatch,
                eink_raster::ErrorKind::Validation => ErrorKind::Validation,
            },
            GeinkError::Io { .. } | GeinkError::PngEncode(_) => ErrorKind::Io,
            GeinkError::Image { source, .. } => match source {
                image::ImageError::IoError(_) => ErrorKind::Io,
                _ => ErrorKind::Validation,
            },
            GeinkError::Config(ConfigError::Read { .. }) => ErrorKind::Io,
            GeinkError::Config(_) | GeinkError::Validation(_) => ErrorKind::Validation,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid {field}: {value} (must be at least 1)")]
    InvalidDimension { field: &'static str, value: u32 },

    #[error("{0}")]
    Raster(#[from] RasterError),
}
