use crate::parallel;
use poi_image::{Image, ImageError};

/// Define the RGB weights for the grayscale conversion (ITU-R BT.601).
const RW: f64 = 0.299;
const GW: f64 = 0.587;
const BW: f64 = 0.114;

/// The BT.601 weights scaled by 2^14; they sum to exactly 2^14.
const RW_FIX: u32 = 4899;
const GW_FIX: u32 = 9617;
const BW_FIX: u32 = 1868;
const FIX_SHIFT: u32 = 14;
const FIX_HALF: u32 = 1 << (FIX_SHIFT - 1);

#[inline]
fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let y = r as u32 * RW_FIX + g as u32 * GW_FIX + b as u32 * BW_FIX;
    ((y + FIX_HALF) >> FIX_SHIFT) as u8
}

/// Convert an RGB image to grayscale using the formula:
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
///
/// # Arguments
///
/// * `src` - The input RGB image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use poi_image::Image;
/// use poi_imgproc::color::gray_from_rgb;
///
/// let image = Image::<f32, 3>::new([4, 5].into(), vec![0f32; 4 * 5 * 3]).unwrap();
///
/// let mut gray = Image::<f32, 1>::from_size_val(image.size(), 0.0).unwrap();
///
/// gray_from_rgb(&image, &mut gray).unwrap();
/// assert_eq!(gray.num_channels(), 1);
/// assert_eq!(gray.size().width, 4);
/// assert_eq!(gray.size().height, 5);
/// ```
pub fn gray_from_rgb<T>(src: &Image<T, 3>, dst: &mut Image<T, 1>) -> Result<(), ImageError>
where
    T: Send + Sync + num_traits::Float,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let cast_err = || ImageError::CastError(std::any::type_name::<T>().to_string());
    let rw = T::from(RW).ok_or_else(cast_err)?;
    let gw = T::from(GW).ok_or_else(cast_err)?;
    let bw = T::from(BW).ok_or_else(cast_err)?;

    // parallelize the grayscale conversion by rows
    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0];
        let g = src_pixel[1];
        let b = src_pixel[2];
        dst_pixel[0] = rw * r + gw * g + bw * b;
    });

    Ok(())
}

/// Convert an RGB8 image to grayscale with the BT.601 weights in 14-bit
/// fixed point:
///
/// Y = (4899 * R + 9617 * G + 1868 * B + 8192) >> 14
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = luma_u8(src_pixel[0], src_pixel[1], src_pixel[2]);
    });

    Ok(())
}

/// Convert an RGBA8 image to grayscale, ignoring the alpha channel.
///
/// Uses the same weights as [`gray_from_rgb_u8`].
pub fn gray_from_rgba_u8(src: &Image<u8, 4>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = luma_u8(src_pixel[0], src_pixel[1], src_pixel[2]);
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gray_from_rgb_float() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<f64, 3>::new(
            [2, 1].into(),
            vec![
                1.0, 0.0, 0.0,
                0.5, 0.5, 0.5,
            ],
        )?;

        let mut gray = Image::<f64, 1>::from_size_val(image.size(), 0.0)?;
        gray_from_rgb(&image, &mut gray)?;

        assert_relative_eq!(gray.as_slice()[0], 0.299, epsilon = 1e-12);
        assert_relative_eq!(gray.as_slice()[1], 0.5, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn gray_from_rgb_u8_weights() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<u8, 3>::new(
            [5, 1].into(),
            vec![
                255, 0, 0,
                0, 255, 0,
                0, 0, 255,
                255, 255, 255,
                0, 0, 0,
            ],
        )?;

        let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        gray_from_rgb_u8(&image, &mut gray)?;

        assert_eq!(gray.as_slice(), &[76, 150, 29, 255, 0]);
        Ok(())
    }

    #[test]
    fn gray_from_rgba_u8_ignores_alpha() -> Result<(), ImageError> {
        let opaque = Image::<u8, 4>::new([1, 1].into(), vec![10, 200, 30, 255])?;
        let clear = Image::<u8, 4>::new([1, 1].into(), vec![10, 200, 30, 0])?;

        let mut gray_opaque = Image::<u8, 1>::from_size_val(opaque.size(), 0)?;
        let mut gray_clear = Image::<u8, 1>::from_size_val(clear.size(), 0)?;
        gray_from_rgba_u8(&opaque, &mut gray_opaque)?;
        gray_from_rgba_u8(&clear, &mut gray_clear)?;

        assert_eq!(gray_opaque.as_slice(), gray_clear.as_slice());
        assert_eq!(gray_opaque.as_slice(), &[124]);
        Ok(())
    }

    #[test]
    fn gray_size_mismatch() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val([3, 2].into(), 0)?;
        let mut gray = Image::<u8, 1>::from_size_val([2, 3].into(), 0)?;
        assert_eq!(
            gray_from_rgb_u8(&image, &mut gray),
            Err(ImageError::InvalidImageSize(3, 2, 2, 3))
        );
        Ok(())
    }
}
