//! Corner detection with the Harris response.
//!
//! The detector scores every pixel that a full window can be centred on with
//! the Harris response of the windowed structure tensor and reports the pixels
//! whose score is strictly above a threshold, in raster order.
//!
//! # Example
//!
//! ```
//! use poi_image::Image;
//! use poi_imgproc::features::{detect, HarrisConfig};
//!
//! let mut data = vec![0u8; 32 * 32];
//! for y in 8..24 {
//!     for x in 8..24 {
//!         data[y * 32 + x] = 255;
//!     }
//! }
//! let image = Image::<u8, 1>::new([32, 32].into(), data).unwrap();
//!
//! let points = detect(&image, &HarrisConfig::default()).unwrap();
//! assert!(!points.is_empty());
//! ```

mod config;
pub use config::*;

mod error;
pub use error::*;

mod point;
pub use point::*;

mod structure;
pub use structure::*;

mod nms;

mod harris;
pub use harris::*;
