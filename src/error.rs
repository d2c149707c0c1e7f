use thiserror::Error;

use crate::data_url::DataUrlError;

/// Why an announced screenshot could not be shown
#[derive(Error, Debug)]
pub enum ScreenshotError {
    #[error(transparent)]
    DataUrl(#[from] DataUrlError),
    #[error("Unreadable screenshot image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Screenshot has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Failures while flattening the canvas into a bitmap
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No screenshot loaded")]
    NothingToExport,
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error(transparent)]
    DataUrl(#[from] DataUrlError),
}

/// Failures reported by the native side
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("Clipboard payload is not a readable image: {0}")]
    Image(#[from] image::ImageError),
}
