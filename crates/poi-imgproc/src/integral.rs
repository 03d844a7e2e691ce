use poi_image::{Image, ImageSize};

/// Summed-area table of a single channel image.
///
/// Entry `(y, x)` of the table holds the sum of all source pixels above and to
/// the left of `(y, x)`, exclusive, so the table is one row and one column
/// larger than the source.
#[derive(Clone, Debug)]
pub struct IntegralImage {
    size: ImageSize,
    data: Vec<f64>,
}

impl IntegralImage {
    /// Build the summed-area table of `src`.
    ///
    /// # Example
    ///
    /// ```
    /// use poi_image::Image;
    /// use poi_imgproc::integral::IntegralImage;
    ///
    /// let src = Image::<f64, 1>::new([2, 2].into(), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// let integral = IntegralImage::new(&src);
    ///
    /// assert_eq!(integral.sum_rect(0, 0, 2, 2), 10.0);
    /// assert_eq!(integral.sum_rect(1, 0, 1, 2), 6.0);
    /// ```
    pub fn new(src: &Image<f64, 1>) -> Self {
        let size = src.size();
        let stride = size.width + 1;
        let mut data = vec![0.0; stride * (size.height + 1)];

        if size.width > 0 {
            for (y, row) in src.as_slice().chunks_exact(size.width).enumerate() {
                let mut row_sum = 0.0;
                for (x, &v) in row.iter().enumerate() {
                    row_sum += v;
                    data[(y + 1) * stride + x + 1] = data[y * stride + x + 1] + row_sum;
                }
            }
        }

        Self { size, data }
    }

    /// Sum of the source pixels in the rectangle with top-left corner `(x, y)`
    /// and the given `width` and `height`.
    ///
    /// PRECONDITION: the rectangle lies inside the source image.
    #[inline]
    pub fn sum_rect(&self, x: usize, y: usize, width: usize, height: usize) -> f64 {
        let stride = self.size.width + 1;
        let (x1, y1) = (x + width, y + height);
        self.data[y1 * stride + x1] - self.data[y * stride + x1] - self.data[y1 * stride + x]
            + self.data[y * stride + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poi_image::ImageError;

    #[test]
    fn integral_matches_direct_sums() -> Result<(), ImageError> {
        let (w, h) = (5, 4);
        let data = (0..w * h).map(|i| (i * 7 % 11) as f64).collect::<Vec<_>>();
        let src = Image::<f64, 1>::new([w, h].into(), data.clone())?;
        let integral = IntegralImage::new(&src);

        for y in 0..h {
            for x in 0..w {
                for rh in 1..=(h - y) {
                    for rw in 1..=(w - x) {
                        let mut expected = 0.0;
                        for yy in y..y + rh {
                            for xx in x..x + rw {
                                expected += data[yy * w + xx];
                            }
                        }
                        assert_eq!(integral.sum_rect(x, y, rw, rh), expected);
                    }
                }
            }
        }
        Ok(())
    }

    #[test]
    fn integral_empty() -> Result<(), ImageError> {
        let src = Image::<f64, 1>::new([0, 3].into(), vec![])?;
        let integral = IntegralImage::new(&src);
        assert_eq!(integral.sum_rect(0, 0, 0, 3), 0.0);
        Ok(())
    }
}
