//! PNG encoding from raw pixel grids.
//!
//! Only 8-bit RGB output is produced. Grayscale input goes through
//! [`GrayPlane`] and is written as R=G=B triples.
//!
//! - [`PixelSource`] - what the encoder reads
//! - [`encode_png`] / [`encode_png_rgb`] - the encoder

mod pixels;
mod encoder;

pub use pixels::{PixelSource, FnSource, GrayPlane, RgbPlanes, RgbBuffer};
pub use encoder::{encode_png, encode_png_rgb, SIGNATURE, COMPRESSION_LEVEL};
