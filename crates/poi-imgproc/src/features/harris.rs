use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use poi_image::{Image, ImageError, ImageSize};

use crate::parallel::{self, ExecutionStrategy, ParallelError};

use super::{
    gradient_products, nms, ConfigurationError, DetectError, HarrisConfig, InterestPoint,
    WindowAccumulator,
};

/// The pixels a full window can be centred on, as half-open ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EligibleRegion {
    pub(crate) x0: usize,
    pub(crate) x1: usize,
    pub(crate) y0: usize,
    pub(crate) y1: usize,
}

impl EligibleRegion {
    /// `None` when the image is too small for a single window.
    pub(crate) fn new(size: ImageSize, offset: usize) -> Option<Self> {
        if size.width <= 2 * offset || size.height <= 2 * offset {
            return None;
        }

        Some(Self {
            x0: offset,
            x1: size.width - offset,
            y0: offset,
            y1: size.height - offset,
        })
    }

    pub(crate) fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub(crate) fn rows(&self) -> Range<usize> {
        self.y0..self.y1
    }

    pub(crate) fn cols(&self) -> Range<usize> {
        self.x0..self.x1
    }
}

/// Harris responses of every pixel of an [`EligibleRegion`].
pub(crate) struct ResponseMap {
    region: EligibleRegion,
    data: Vec<f64>,
}

impl ResponseMap {
    pub(crate) fn new(region: EligibleRegion, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), region.width() * (region.y1 - region.y0));
        Self { region, data }
    }

    pub(crate) fn region(&self) -> &EligibleRegion {
        &self.region
    }

    /// Response at image coordinates `(x, y)` inside the region.
    #[inline]
    pub(crate) fn at(&self, x: usize, y: usize) -> f64 {
        self.data[(y - self.region.y0) * self.region.width() + (x - self.region.x0)]
    }
}

/// Row admission for cooperative cancellation.
///
/// A row that is refused is remembered so the whole call can be failed
/// instead of returning a partial result.
struct RowGate<'a> {
    cancel: Option<&'a AtomicBool>,
    skipped: AtomicBool,
}

impl<'a> RowGate<'a> {
    fn new(cancel: Option<&'a AtomicBool>) -> Self {
        Self {
            cancel,
            skipped: AtomicBool::new(false),
        }
    }

    fn enter(&self) -> bool {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => {
                self.skipped.store(true, Ordering::Relaxed);
                false
            }
            _ => true,
        }
    }

    fn check(&self) -> Result<(), DetectError> {
        if self.skipped.load(Ordering::Relaxed) {
            return Err(DetectError::Cancelled);
        }
        Ok(())
    }
}

/// Harris corner detector.
///
/// For every pixel at least `window_size / 2` pixels away from the border the
/// detector sums the gradient products over the square window centred on the
/// pixel and scores it with `det - k * trace²`. Pixels scoring strictly above
/// the threshold are returned in raster order (increasing `y`, then increasing
/// `x`). Neighbouring pixels of the same corner are all reported unless
/// suppression is enabled with [`HarrisConfig::with_nms_radius`].
///
/// # Example
///
/// ```
/// use poi_image::Image;
/// use poi_imgproc::features::{HarrisConfig, HarrisDetector};
///
/// let image = Image::<u8, 1>::from_size_val([20, 20].into(), 128).unwrap();
/// let detector = HarrisDetector::new(HarrisConfig::default()).unwrap();
///
/// // a flat image has no gradient and therefore no corners
/// assert!(detector.detect(&image).unwrap().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct HarrisDetector {
    config: HarrisConfig,
}

impl HarrisDetector {
    /// Create a detector, validating the configuration.
    pub fn new(config: HarrisConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration the detector runs with.
    pub fn config(&self) -> &HarrisConfig {
        &self.config
    }

    /// Detect the corners of a single channel image.
    ///
    /// An image smaller than the window in either dimension has no pixel to
    /// score and yields an empty vector.
    pub fn detect<T>(&self, src: &Image<T, 1>) -> Result<Vec<InterestPoint>, DetectError>
    where
        T: Copy + Into<f64>,
    {
        self.run(src, None)
    }

    /// Same as [`HarrisDetector::detect`], checking `cancel` before each row.
    ///
    /// Once the flag is raised no further row is scored and the call returns
    /// [`DetectError::Cancelled`].
    pub fn detect_with_cancel<T>(
        &self,
        src: &Image<T, 1>,
        cancel: &AtomicBool,
    ) -> Result<Vec<InterestPoint>, DetectError>
    where
        T: Copy + Into<f64>,
    {
        self.run(src, Some(cancel))
    }

    /// Write the Harris response of every scored pixel into `dst`.
    ///
    /// The border that a window cannot cover is set to zero.
    ///
    /// PRECONDITION: `src` and `dst` must have the same size.
    pub fn response<T>(&self, src: &Image<T, 1>, dst: &mut Image<f64, 1>) -> Result<(), DetectError>
    where
        T: Copy + Into<f64>,
    {
        if src.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                dst.cols(),
                dst.rows(),
            )
            .into());
        }

        dst.as_slice_mut().fill(0.0);

        let Some(region) = EligibleRegion::new(src.size(), self.config.offset()) else {
            return Ok(());
        };

        let gate = RowGate::new(None);
        let map = self.response_map(src, region, &gate)?;

        let cols = dst.cols();
        dst.as_slice_mut()
            .chunks_exact_mut(cols)
            .enumerate()
            .skip(region.y0)
            .take(region.y1 - region.y0)
            .for_each(|(y, row)| {
                for x in region.cols() {
                    row[x] = map.at(x, y);
                }
            });

        Ok(())
    }

    fn run<T>(
        &self,
        src: &Image<T, 1>,
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<InterestPoint>, DetectError>
    where
        T: Copy + Into<f64>,
    {
        let Some(region) = EligibleRegion::new(src.size(), self.config.offset()) else {
            return Ok(Vec::new());
        };

        let gate = RowGate::new(cancel);
        let threshold = self.config.threshold;

        let points = match self.config.nms_radius {
            None => {
                let products = gradient_products(src)?;
                let acc = WindowAccumulator::new(&products, self.config.window_sum);
                let (k, offset) = (self.config.k, self.config.offset());

                self.map_rows(region.rows(), |y| {
                    if !gate.enter() {
                        return Vec::new();
                    }
                    region
                        .cols()
                        .filter_map(|x| {
                            let score = acc.tensor_at(x, y, offset).response(k);
                            (score > threshold).then_some(InterestPoint { x, y, score })
                        })
                        .collect()
                })?
            }
            Some(radius) => {
                let map = self.response_map(src, region, &gate)?;

                self.map_rows(region.rows(), |y| {
                    if !gate.enter() {
                        return Vec::new();
                    }
                    region
                        .cols()
                        .filter_map(|x| {
                            let score = map.at(x, y);
                            (score > threshold && nms::is_local_maximum(&map, x, y, radius))
                                .then_some(InterestPoint { x, y, score })
                        })
                        .collect()
                })?
            }
        };

        gate.check()?;

        Ok(points)
    }

    fn response_map<T>(
        &self,
        src: &Image<T, 1>,
        region: EligibleRegion,
        gate: &RowGate,
    ) -> Result<ResponseMap, DetectError>
    where
        T: Copy + Into<f64>,
    {
        let products = gradient_products(src)?;
        let acc = WindowAccumulator::new(&products, self.config.window_sum);
        let (k, offset) = (self.config.k, self.config.offset());

        let data = self.map_rows(region.rows(), |y| {
            if !gate.enter() {
                return Vec::new();
            }
            region
                .cols()
                .map(|x| acc.tensor_at(x, y, offset).response(k))
                .collect()
        })?;
        gate.check()?;

        Ok(ResponseMap::new(region, data))
    }

    fn map_rows<R, F>(&self, rows: Range<usize>, f: F) -> Result<Vec<R>, ParallelError>
    where
        R: Send,
        F: Fn(usize) -> Vec<R> + Send + Sync,
    {
        parallel::map_rows(self.config.strategy, rows, f)
    }
}

/// Detect Harris corners with the given configuration.
///
/// Shorthand for [`HarrisDetector::new`] followed by [`HarrisDetector::detect`].
///
/// # Arguments
///
/// * `src` - The single channel intensity image.
/// * `config` - The detector parameters.
///
/// # Returns
///
/// The pixels whose response is strictly above `config.threshold`, in raster order.
pub fn detect<T>(src: &Image<T, 1>, config: &HarrisConfig) -> Result<Vec<InterestPoint>, DetectError>
where
    T: Copy + Into<f64>,
{
    HarrisDetector::new(*config)?.detect(src)
}

/// Compute the Harris response map of an image.
///
/// Shorthand for [`HarrisDetector::new`] followed by [`HarrisDetector::response`].
pub fn harris_response<T>(
    src: &Image<T, 1>,
    dst: &mut Image<f64, 1>,
    config: &HarrisConfig,
) -> Result<(), DetectError>
where
    T: Copy + Into<f64>,
{
    HarrisDetector::new(*config)?.response(src, dst)
}
