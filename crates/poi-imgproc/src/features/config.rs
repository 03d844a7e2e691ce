use crate::parallel::ExecutionStrategy;

use super::ConfigurationError;

/// How the structure tensor products are summed over the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum WindowSum {
    /// Add every product of the window, O(window_size²) per pixel.
    #[default]
    Direct,
    /// Read the window sums from summed-area tables, O(1) per pixel.
    ///
    /// Equal to [`WindowSum::Direct`] up to floating point rounding.
    Integral,
}

/// Parameters of the Harris corner detector.
///
/// # Example
///
/// ```
/// use poi_imgproc::features::{HarrisConfig, WindowSum};
///
/// let config = HarrisConfig::default()
///     .with_window_size(5)
///     .with_threshold(1e4)
///     .with_window_sum(WindowSum::Integral);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.offset(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HarrisConfig {
    /// Sensitivity constant of the response `det - k * trace²`.
    pub k: f64,
    /// Side of the square accumulation window, a positive odd number.
    pub window_size: usize,
    /// Responses strictly above this value are reported.
    pub threshold: f64,
    /// Window accumulation method.
    pub window_sum: WindowSum,
    /// Optional non-maximum suppression radius. `None` reports every pixel
    /// above the threshold, including adjacent ones.
    pub nms_radius: Option<usize>,
    /// How the rows are scheduled.
    pub strategy: ExecutionStrategy,
}

impl Default for HarrisConfig {
    fn default() -> Self {
        Self {
            k: 0.2,
            window_size: 7,
            threshold: 1_500_000.0,
            window_sum: WindowSum::Direct,
            nms_radius: None,
            strategy: ExecutionStrategy::Serial,
        }
    }
}

impl HarrisConfig {
    /// Set the sensitivity constant.
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    /// Set the window size.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the response threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the window accumulation method.
    pub fn with_window_sum(mut self, window_sum: WindowSum) -> Self {
        self.window_sum = window_sum;
        self
    }

    /// Keep only local maxima of the response within `radius` pixels.
    pub fn with_nms_radius(mut self, radius: usize) -> Self {
        self.nms_radius = Some(radius);
        self
    }

    /// Set the row scheduling strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Half the window size, i.e. the width of the border that is never scored.
    pub fn offset(&self) -> usize {
        self.window_size / 2
    }

    /// Check that the configuration can be used for detection.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.window_size == 0 || self.window_size % 2 == 0 {
            return Err(ConfigurationError::InvalidWindowSize(self.window_size));
        }

        if !self.k.is_finite() {
            return Err(ConfigurationError::NonFiniteSensitivity(self.k));
        }

        if self.threshold.is_nan() {
            return Err(ConfigurationError::NanThreshold);
        }

        if self.nms_radius == Some(0) {
            return Err(ConfigurationError::InvalidNmsRadius);
        }

        if let ExecutionStrategy::Fixed(0) = self.strategy {
            return Err(ConfigurationError::InvalidThreadCount(0));
        }

        Ok(())
    }
}
