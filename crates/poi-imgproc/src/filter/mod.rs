mod gradient;
pub use gradient::*;
