//! Color types, perceptual distance, and nearest-block matching

pub mod matcher;
pub mod palette;
pub mod space;

pub use matcher::ColorMatcher;
pub use palette::{BlockClass, BlockPalette};

/// 8-bit-per-channel sRGB color.
///
/// Compared only through the distance functions in [`space`], never by
/// identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
