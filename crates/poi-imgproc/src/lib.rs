#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// corner detection module.
pub mod features;

/// image filtering module.
pub mod filter;

/// summed-area tables.
pub mod integral;

/// module containing parallization utilities.
pub mod parallel;
