pub mod pixel;
pub mod pixmap;

pub use pixel::{Pixel, PIXEL_BYTES};
pub use pixmap::PixMap;
