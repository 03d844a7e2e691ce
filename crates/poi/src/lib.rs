#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use poi_image as image;

#[doc(inline)]
pub use poi_imgproc as imgproc;

#[doc(inline)]
pub use poi_io as io;
