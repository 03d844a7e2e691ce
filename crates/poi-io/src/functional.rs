use std::path::{Path, PathBuf};

use poi_image::{Image, ImageSize};
use poi_imgproc::color::{gray_from_rgb_u8, gray_from_rgba_u8};

use crate::error::LoadError;

/// A source of encoded image data.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on disk.
    Path(PathBuf),
    /// Encoded bytes held in memory, with an identifier used in errors.
    Bytes {
        /// Identifier of the data, e.g. an upload name.
        id: String,
        /// The encoded image.
        data: Vec<u8>,
    },
}

impl ImageSource {
    /// The path or identifier of the source.
    pub fn id(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes { id, .. } => id.clone(),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

/// A decoded 8-bit image with its original channel layout.
pub enum GenericImage {
    /// 8-bit grayscale image
    L8(Image<u8, 1>),
    /// 8-bit grayscale image with alpha channel
    La8(Image<u8, 2>),
    /// 8-bit RGB image
    Rgb8(Image<u8, 3>),
    /// 8-bit RGB image with alpha channel
    Rgba8(Image<u8, 4>),
}

impl GenericImage {
    /// The size of the image.
    pub fn size(&self) -> ImageSize {
        match self {
            GenericImage::L8(img) => img.size(),
            GenericImage::La8(img) => img.size(),
            GenericImage::Rgb8(img) => img.size(),
            GenericImage::Rgba8(img) => img.size(),
        }
    }

    /// The number of channels of the image.
    pub fn num_channels(&self) -> usize {
        match self {
            GenericImage::L8(_) => 1,
            GenericImage::La8(_) => 2,
            GenericImage::Rgb8(_) => 3,
            GenericImage::Rgba8(_) => 4,
        }
    }

    /// Reduce the image to a single luma channel.
    ///
    /// Grayscale data is passed through unchanged, color data is converted
    /// with the BT.601 weights and alpha is dropped.
    pub fn into_gray8(self) -> Result<Image<u8, 1>, LoadError> {
        let gray = match self {
            GenericImage::L8(img) => img,
            GenericImage::La8(img) => img.channel(0)?,
            GenericImage::Rgb8(img) => {
                let mut gray = Image::from_size_val(img.size(), 0u8)?;
                gray_from_rgb_u8(&img, &mut gray)?;
                gray
            }
            GenericImage::Rgba8(img) => {
                let mut gray = Image::from_size_val(img.size(), 0u8)?;
                gray_from_rgba_u8(&img, &mut gray)?;
                gray
            }
        };
        Ok(gray)
    }
}

/// Decodes an image from memory without reducing its channels.
///
/// Any format supported by the image crate is accepted. 16-bit and float
/// samples are reduced to 8 bits.
///
/// # Arguments
///
/// * `bytes` - The encoded image.
/// * `id` - An identifier reported in errors and logs.
pub fn decode_image_any(bytes: &[u8], id: &str) -> Result<GenericImage, LoadError> {
    let img = image::load_from_memory(bytes).map_err(|source| LoadError::DecodeError {
        id: id.to_string(),
        source,
    })?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };
    let color = img.color();

    log::debug!("decoded {id}: {size} {color:?}");

    let image = match color {
        image::ColorType::L8 | image::ColorType::L16 => {
            GenericImage::L8(Image::new(size, img.into_luma8().into_raw())?)
        }
        image::ColorType::La8 | image::ColorType::La16 => {
            GenericImage::La8(Image::new(size, img.into_luma_alpha8().into_raw())?)
        }
        image::ColorType::Rgb8 | image::ColorType::Rgb16 | image::ColorType::Rgb32F => {
            GenericImage::Rgb8(Image::new(size, img.into_rgb8().into_raw())?)
        }
        image::ColorType::Rgba8 | image::ColorType::Rgba16 | image::ColorType::Rgba32F => {
            GenericImage::Rgba8(Image::new(size, img.into_rgba8().into_raw())?)
        }
        _ => {
            return Err(LoadError::UnsupportedImageFormat {
                id: id.to_string(),
                color,
            })
        }
    };

    Ok(image)
}

/// Reads an image from the given file path.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// The decoded image with its original channel layout.
pub fn read_image_any(file_path: impl AsRef<Path>) -> Result<GenericImage, LoadError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(LoadError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let id = file_path.display().to_string();
    let bytes = std::fs::read(file_path).map_err(|source| LoadError::FileError {
        id: id.clone(),
        source,
    })?;

    decode_image_any(&bytes, &id)
}

/// Decodes an image from memory and reduces it to 8-bit luma.
///
/// # Example
///
/// ```
/// use poi_io::functional as F;
///
/// let err = F::decode_image_gray8(b"not an image", "upload-1").unwrap_err();
/// assert!(err.to_string().contains("upload-1"));
/// ```
pub fn decode_image_gray8(bytes: &[u8], id: &str) -> Result<Image<u8, 1>, LoadError> {
    decode_image_any(bytes, id)?.into_gray8()
}

/// Reads an image file and reduces it to 8-bit luma.
///
/// The output has the same width and height as the file.
pub fn read_image_gray8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, LoadError> {
    read_image_any(file_path)?.into_gray8()
}

/// Turn any [`ImageSource`] into an intensity matrix.
pub fn normalize(source: ImageSource) -> Result<Image<u8, 1>, LoadError> {
    match source {
        ImageSource::Path(path) => read_image_gray8(path),
        ImageSource::Bytes { id, data } => decode_image_gray8(&data, &id),
    }
}
