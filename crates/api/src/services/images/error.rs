//! Image pipeline error types.

use thiserror::Error;

/// Per-image processing failure.
///
/// Every variant carries the original input so batch callers can correlate
/// failures back to their inputs. These errors are reported inline per item
/// and never abort a batch.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The input is not a hosting link, URL, or base64 data URL, or it is
    /// a hosting link whose file identifier cannot be extracted. Terminal,
    /// never retried.
    #[error("Invalid image format. Please provide a valid URL or base64 data.")]
    InvalidFormat {
        input: String,
    },

    /// Every download strategy failed, or a direct fetch returned non-2xx.
    #[error("Failed to download image: {reason}")]
    DownloadFailed {
        input: String,
        reason: String,
    },

    /// The storage service refused the processed bytes.
    #[error("Failed to store image: {reason}")]
    UploadFailed {
        input: String,
        reason: String,
    },
}

impl ImageError {
    /// The original input string this failure belongs to.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::InvalidFormat { input }
            | Self::DownloadFailed { input, .. }
            | Self::UploadFailed { input, .. } => input,
        }
    }
}
