//! Raster and video input sources

pub mod image;
pub mod video;
