use poi_image::ImageError;

use crate::parallel::ParallelError;

/// An invalid [`HarrisConfig`](super::HarrisConfig), reported before any
/// computation starts.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigurationError {
    /// The window size is zero or even.
    #[error("window size must be a positive odd number, got {0}")]
    InvalidWindowSize(usize),

    /// The sensitivity constant is NaN or infinite.
    #[error("sensitivity k must be finite, got {0}")]
    NonFiniteSensitivity(f64),

    /// The threshold is NaN.
    #[error("threshold must not be NaN")]
    NanThreshold,

    /// The suppression radius is zero.
    #[error("non-maximum suppression radius must be > 0")]
    InvalidNmsRadius,

    /// A fixed thread pool was requested with no threads.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// An error returned by the corner detector.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DetectError {
    /// The configuration was rejected.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// An intermediate image could not be created.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The row workers could not be scheduled.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// The detection was cancelled before every row was scored.
    #[error("detection was cancelled")]
    Cancelled,
}
