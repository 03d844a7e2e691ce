use std::path::PathBuf;

/// An error raised while turning an image source into an intensity matrix.
///
/// Every variant tied to a source carries its path or identifier.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// Error to read the file.
    #[error("Failed to read {id}. {source}")]
    FileError {
        /// Path or identifier of the source.
        id: String,
        /// The underlying io error.
        source: std::io::Error,
    },

    /// Error to decode the image data.
    #[error("Failed to decode {id}. {source}")]
    DecodeError {
        /// Path or identifier of the source.
        id: String,
        /// The underlying decoder error.
        source: image::ImageError,
    },

    /// The decoded color type cannot be reduced to 8-bit luma.
    #[error("Unsupported color type {color:?} in {id}")]
    UnsupportedImageFormat {
        /// Path or identifier of the source.
        id: String,
        /// The decoded color type.
        color: image::ColorType,
    },

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] poi_image::ImageError),
}
