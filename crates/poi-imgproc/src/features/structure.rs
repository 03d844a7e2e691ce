use poi_image::{Image, ImageError};

use crate::filter::central_difference_gradient;
use crate::integral::IntegralImage;

use super::WindowSum;

/// Per-pixel products of the image gradient.
#[derive(Clone, Debug)]
pub struct StructureProducts {
    /// `dx * dx`
    pub ixx: Image<f64, 1>,
    /// `dx * dy`
    pub ixy: Image<f64, 1>,
    /// `dy * dy`
    pub iyy: Image<f64, 1>,
}

/// Compute the gradient products `dx²`, `dx·dy` and `dy²` element-wise.
///
/// PRECONDITION: `dx` and `dy` must have the same size.
pub fn structure_products(
    dx: &Image<f64, 1>,
    dy: &Image<f64, 1>,
) -> Result<StructureProducts, ImageError> {
    if dx.size() != dy.size() {
        return Err(ImageError::InvalidImageSize(
            dx.cols(),
            dx.rows(),
            dy.cols(),
            dy.rows(),
        ));
    }

    let mut ixx = Image::from_size_val(dx.size(), 0.0)?;
    let mut ixy = Image::from_size_val(dx.size(), 0.0)?;
    let mut iyy = Image::from_size_val(dx.size(), 0.0)?;

    ixx.as_slice_mut()
        .iter_mut()
        .zip(ixy.as_slice_mut().iter_mut())
        .zip(iyy.as_slice_mut().iter_mut())
        .zip(dx.as_slice().iter().zip(dy.as_slice().iter()))
        .for_each(|(((xx, xy), yy), (&gx, &gy))| {
            *xx = gx * gx;
            *xy = gx * gy;
            *yy = gy * gy;
        });

    Ok(StructureProducts { ixx, ixy, iyy })
}

/// Structure products of an intensity image: [`central_difference_gradient`]
/// followed by [`structure_products`].
pub fn gradient_products<T>(src: &Image<T, 1>) -> Result<StructureProducts, ImageError>
where
    T: Copy + Into<f64>,
{
    let mut dx = Image::from_size_val(src.size(), 0.0)?;
    let mut dy = Image::from_size_val(src.size(), 0.0)?;
    central_difference_gradient(src, &mut dx, &mut dy)?;
    structure_products(&dx, &dy)
}

/// The windowed second-moment matrix `[[sxx, sxy], [sxy, syy]]` of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StructureTensor {
    /// Window sum of `dx²`.
    pub sxx: f64,
    /// Window sum of `dx·dy`.
    pub sxy: f64,
    /// Window sum of `dy²`.
    pub syy: f64,
}

impl StructureTensor {
    /// Determinant of the matrix.
    pub fn det(&self) -> f64 {
        self.sxx * self.syy - self.sxy * self.sxy
    }

    /// Trace of the matrix.
    pub fn trace(&self) -> f64 {
        self.sxx + self.syy
    }

    /// Harris corner response `det - k * trace²`.
    ///
    /// # Example
    ///
    /// ```
    /// use poi_imgproc::features::StructureTensor;
    ///
    /// let tensor = StructureTensor { sxx: 4.0, sxy: 1.0, syy: 2.0 };
    /// assert_eq!(tensor.det(), 7.0);
    /// assert_eq!(tensor.response(0.25), -2.0);
    /// ```
    pub fn response(&self, k: f64) -> f64 {
        let trace = self.trace();
        self.det() - k * trace * trace
    }
}

/// Sums the structure products over square windows.
pub(crate) enum WindowAccumulator<'a> {
    Direct(&'a StructureProducts),
    Integral {
        ixx: IntegralImage,
        ixy: IntegralImage,
        iyy: IntegralImage,
    },
}

impl<'a> WindowAccumulator<'a> {
    pub(crate) fn new(products: &'a StructureProducts, mode: WindowSum) -> Self {
        match mode {
            WindowSum::Direct => Self::Direct(products),
            WindowSum::Integral => Self::Integral {
                ixx: IntegralImage::new(&products.ixx),
                ixy: IntegralImage::new(&products.ixy),
                iyy: IntegralImage::new(&products.iyy),
            },
        }
    }

    /// Structure tensor of the window with half-width `offset` centred on `(x, y)`.
    ///
    /// PRECONDITION: the window lies inside the image.
    pub(crate) fn tensor_at(&self, x: usize, y: usize, offset: usize) -> StructureTensor {
        let (x0, y0) = (x - offset, y - offset);
        let side = 2 * offset + 1;

        match self {
            Self::Direct(products) => {
                let cols = products.ixx.cols();
                let (ixx, ixy, iyy) = (
                    products.ixx.as_slice(),
                    products.ixy.as_slice(),
                    products.iyy.as_slice(),
                );

                let mut tensor = StructureTensor::default();
                for row in y0..y0 + side {
                    let start = row * cols + x0;
                    for idx in start..start + side {
                        tensor.sxx += ixx[idx];
                        tensor.sxy += ixy[idx];
                        tensor.syy += iyy[idx];
                    }
                }
                tensor
            }
            Self::Integral { ixx, ixy, iyy } => StructureTensor {
                sxx: ixx.sum_rect(x0, y0, side, side),
                sxy: ixy.sum_rect(x0, y0, side, side),
                syy: iyy.sum_rect(x0, y0, side, side),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products_of_ramp() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let src = Image::<u8, 1>::new(
            [3, 2].into(),
            vec![
                0, 2, 4,
                3, 5, 7,
            ],
        )?;

        let products = gradient_products(&src)?;
        assert_eq!(products.ixx.as_slice(), &[4.0; 6]);
        assert_eq!(products.ixy.as_slice(), &[6.0; 6]);
        assert_eq!(products.iyy.as_slice(), &[9.0; 6]);
        Ok(())
    }

    #[test]
    fn products_size_mismatch() -> Result<(), ImageError> {
        let dx = Image::from_size_val([2, 2].into(), 0.0)?;
        let dy = Image::from_size_val([2, 3].into(), 0.0)?;
        assert!(matches!(
            structure_products(&dx, &dy),
            Err(ImageError::InvalidImageSize(2, 2, 2, 3))
        ));
        Ok(())
    }

    #[test]
    fn accumulators_agree() -> Result<(), ImageError> {
        let (w, h) = (9, 7);
        let data = (0..w * h)
            .map(|i| ((i * 37 + 11) % 256) as u8)
            .collect::<Vec<_>>();
        let src = Image::<u8, 1>::new([w, h].into(), data)?;
        let products = gradient_products(&src)?;

        let direct = WindowAccumulator::new(&products, WindowSum::Direct);
        let integral = WindowAccumulator::new(&products, WindowSum::Integral);

        let offset = 2;
        for y in offset..h - offset {
            for x in offset..w - offset {
                let a = direct.tensor_at(x, y, offset);
                let b = integral.tensor_at(x, y, offset);
                approx::assert_relative_eq!(a.sxx, b.sxx, max_relative = 1e-12);
                approx::assert_relative_eq!(a.sxy, b.sxy, max_relative = 1e-12, epsilon = 1e-9);
                approx::assert_relative_eq!(a.syy, b.syy, max_relative = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn direct_window_sum() -> Result<(), ImageError> {
        let ones = Image::from_size_val([5, 5].into(), 1.0)?;
        let products = StructureProducts {
            ixx: ones.clone(),
            ixy: Image::from_size_val([5, 5].into(), -0.5)?,
            iyy: ones,
        };
        let acc = WindowAccumulator::new(&products, WindowSum::Direct);
        assert_eq!(
            acc.tensor_at(2, 2, 1),
            StructureTensor {
                sxx: 9.0,
                sxy: -4.5,
                syy: 9.0,
            }
        );
        Ok(())
    }
}
