//! Raster image to placements: one voxel per pixel on the z = 0 plane.

use crate::color::ColorMatcher;
use crate::color::Rgb;
use crate::mapper::VoxelPlacement;

/// Convert a decoded image into placements. The vertical axis is flipped so
/// the image bottom sits at y = 1 and the top row at y = height.
pub fn placements(img: &image::DynamicImage, matcher: &ColorMatcher) -> Vec<VoxelPlacement> {
    let rgb = img.to_rgb8();
    let height = rgb.height() as i64;

    let mut out = Vec::with_capacity((rgb.width() * rgb.height()) as usize);
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let color = Rgb::new(pixel[0], pixel[1], pixel[2]);
        let block = matcher.resolve(color);
        let class = matcher.palette().class_of(&block);
        out.push(VoxelPlacement {
            x: x as i64,
            y: height - y as i64,
            z: 0,
            color,
            block,
            class,
        });
    }
    out
}
