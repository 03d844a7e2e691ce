use poi_image::{Image, ImageError};

/// Derivative of one sample along an axis of length `len`.
///
/// `at(i)` returns the sample at index `i` on that axis. Interior samples use
/// the central difference, the two ends use one-sided differences and an axis
/// of a single sample has no derivative.
#[inline]
fn axis_derivative(len: usize, i: usize, at: impl Fn(usize) -> f64) -> f64 {
    if len < 2 {
        0.0
    } else if i == 0 {
        at(1) - at(0)
    } else if i == len - 1 {
        at(i) - at(i - 1)
    } else {
        (at(i + 1) - at(i - 1)) / 2.0
    }
}

/// Compute the first order image derivatives in x and y by finite differences.
///
/// Interior pixels use the central difference `(f[i + 1] - f[i - 1]) / 2`,
/// border pixels use the forward or backward difference.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dx` - The horizontal derivative with shape (H, W).
/// * `dy` - The vertical derivative with shape (H, W).
///
/// PRECONDITION: `src`, `dx` and `dy` must have the same size.
///
/// # Example
///
/// ```
/// use poi_image::Image;
/// use poi_imgproc::filter::central_difference_gradient;
///
/// let src = Image::<u8, 1>::new([4, 1].into(), vec![0, 2, 6, 12]).unwrap();
/// let mut dx = Image::from_size_val(src.size(), 0.0).unwrap();
/// let mut dy = Image::from_size_val(src.size(), 0.0).unwrap();
///
/// central_difference_gradient(&src, &mut dx, &mut dy).unwrap();
/// assert_eq!(dx.as_slice(), &[2.0, 3.0, 5.0, 6.0]);
/// assert_eq!(dy.as_slice(), &[0.0, 0.0, 0.0, 0.0]);
/// ```
pub fn central_difference_gradient<T>(
    src: &Image<T, 1>,
    dx: &mut Image<f64, 1>,
    dy: &mut Image<f64, 1>,
) -> Result<(), ImageError>
where
    T: Copy + Into<f64>,
{
    for dst in [&*dx, &*dy] {
        if src.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                dst.cols(),
                dst.rows(),
            ));
        }
    }

    let (rows, cols) = (src.rows(), src.cols());
    if cols == 0 {
        return Ok(());
    }

    let src_data = src.as_slice();
    let px = |r: usize, c: usize| -> f64 { src_data[r * cols + c].into() };

    dx.as_slice_mut()
        .chunks_exact_mut(cols)
        .zip(dy.as_slice_mut().chunks_exact_mut(cols))
        .enumerate()
        .for_each(|(r, (dx_row, dy_row))| {
            for (c, (dx_pixel, dy_pixel)) in dx_row.iter_mut().zip(dy_row.iter_mut()).enumerate() {
                *dx_pixel = axis_derivative(cols, c, |i| px(r, i));
                *dy_pixel = axis_derivative(rows, r, |i| px(i, c));
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_ramp() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let src = Image::<f64, 1>::new(
            [3, 3].into(),
            vec![
                0.0, 1.0, 2.0,
                3.0, 4.0, 5.0,
                6.0, 7.0, 8.0,
            ],
        )?;

        let mut dx = Image::from_size_val(src.size(), 0.0)?;
        let mut dy = Image::from_size_val(src.size(), 0.0)?;
        central_difference_gradient(&src, &mut dx, &mut dy)?;

        assert_eq!(dx.as_slice(), &[1.0; 9]);
        assert_eq!(dy.as_slice(), &[3.0; 9]);
        Ok(())
    }

    #[test]
    fn gradient_borders_are_one_sided() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let src = Image::<u8, 1>::new(
            [3, 3].into(),
            vec![
                0, 0, 0,
                0, 9, 0,
                0, 0, 0,
            ],
        )?;

        let mut dx = Image::from_size_val(src.size(), 0.0)?;
        let mut dy = Image::from_size_val(src.size(), 0.0)?;
        central_difference_gradient(&src, &mut dx, &mut dy)?;

        #[rustfmt::skip]
        assert_eq!(dx.as_slice(), &[
            0.0, 0.0, 0.0,
            9.0, 0.0, -9.0,
            0.0, 0.0, 0.0,
        ]);
        #[rustfmt::skip]
        assert_eq!(dy.as_slice(), &[
            0.0, 9.0, 0.0,
            0.0, 0.0, 0.0,
            0.0, -9.0, 0.0,
        ]);
        Ok(())
    }

    #[test]
    fn gradient_single_row() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([3, 1].into(), vec![1, 5, 7])?;
        let mut dx = Image::from_size_val(src.size(), 0.0)?;
        let mut dy = Image::from_size_val(src.size(), 0.0)?;
        central_difference_gradient(&src, &mut dx, &mut dy)?;

        assert_eq!(dx.as_slice(), &[4.0, 3.0, 2.0]);
        assert_eq!(dy.as_slice(), &[0.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn gradient_size_mismatch() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::from_size_val([3, 3].into(), 0)?;
        let mut dx = Image::from_size_val([3, 3].into(), 0.0)?;
        let mut dy = Image::from_size_val([2, 3].into(), 0.0)?;
        assert_eq!(
            central_difference_gradient(&src, &mut dx, &mut dy),
            Err(ImageError::InvalidImageSize(3, 3, 2, 3))
        );
        Ok(())
    }
}
