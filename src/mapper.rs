//! Surface-to-voxel mapping.
//!
//! Joins the sampler's paired position/UV sequences with a texture lookup
//! and the color matcher, producing one placement per occupied grid cell.
//! This is where exact rationals deliberately become floats: once a sample
//! is snapped to its grid cell, no further exactness is needed.

use std::collections::HashSet;

use crate::color::{BlockClass, ColorMatcher, Rgb};
use crate::core::error::Result;
use crate::math::{Fraction, Uv};
use crate::mesh::{TextureGrid, Triangle};
use crate::sampler::{self, BaryGrid};

/// Coordinates closer to zero than this snap exactly to zero, which also
/// kills negative-zero artifacts before rounding.
const ZERO_EPS: f64 = 1e-9;

/// One voxel of output: a grid cell, the sampled color, and the block that
/// fills it. Coordinates are grid indices; the world position is
/// `index * grid_spacing`. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelPlacement {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub color: Rgb,
    pub block: String,
    pub class: BlockClass,
}

impl VoxelPlacement {
    pub fn grid_pos(&self) -> (i64, i64, i64) {
        (self.x, self.y, self.z)
    }
}

/// Per-triangle mapping parameters, owned by one sampling task.
pub struct TriangleJob<'a> {
    pub triangle: Triangle,
    pub texture: &'a TextureGrid,
    pub matcher: &'a ColorMatcher,
    pub grid_spacing: &'a Fraction,
    pub uv_y_axis_up: bool,
}

/// Sample one triangle into deduplicated voxel placements.
///
/// Position and UV passes walk the same barycentric grid independently and
/// run as two joined sub-computations; their outputs pair up index by index.
/// Returns the placements together with the step the sampler settled on.
pub fn voxelize_triangle(job: &TriangleJob<'_>) -> Result<(Vec<VoxelPlacement>, Fraction)> {
    let step = sampler::triangle_step(&job.triangle.positions, job.grid_spacing);
    let weights: Vec<_> = BaryGrid::new(step.clone()).collect();

    let [pa, pb, pc] = &job.triangle.positions;
    let [ta, tb, tc] = &job.triangle.uvs;
    let (points, uvs) = rayon::join(
        || {
            weights
                .iter()
                .map(|w| sampler::weigh3(w, pa, pb, pc))
                .collect::<Vec<_>>()
        },
        || {
            weights
                .iter()
                .map(|w| sampler::weigh2(w, ta, tb, tc))
                .collect::<Vec<_>>()
        },
    );

    let mut seen = HashSet::new();
    let mut placements = Vec::new();
    for (point, uv) in points.iter().zip(&uvs) {
        let x = snap_to_grid(&point[0], job.grid_spacing)?;
        let y = snap_to_grid(&point[1], job.grid_spacing)?;
        let z = snap_to_grid(&point[2], job.grid_spacing)?;
        if !seen.insert((x, y, z)) {
            continue;
        }

        let color = sample_texture(uv, job.texture, job.uv_y_axis_up)?;
        let block = job.matcher.resolve(color);
        let class = job.matcher.palette().class_of(&block);
        placements.push(VoxelPlacement {
            x,
            y,
            z,
            color,
            block,
            class,
        });
    }

    Ok((placements, step))
}

/// Round an exact coordinate to its nearest grid index.
fn snap_to_grid(value: &Fraction, spacing: &Fraction) -> Result<i64> {
    let cells = value.checked_div(spacing)?.to_f64();
    let cells = if cells.abs() < ZERO_EPS { 0.0 } else { cells };
    Ok(cells.round() as i64)
}

/// Wrap a UV pair into [0, 1), flip V for sources whose origin sits at the
/// image bottom, and fetch the texel.
fn sample_texture(uv: &Uv, texture: &TextureGrid, y_axis_up: bool) -> Result<Rgb> {
    let one = Fraction::one();
    let u = uv[0].rem_euclid(&one)?.to_f64();
    let v = uv[1].rem_euclid(&one)?.to_f64();
    let v = if y_axis_up { 1.0 - v } else { v };
    Ok(texture.sample(u, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette::BlockPalette;
    use crate::mesh::Triangle;
    use std::sync::Arc;

    fn solid_matcher(id: &str, color: Rgb) -> ColorMatcher {
        let mut palette = BlockPalette::new();
        palette.insert(id.to_string(), color, BlockClass::Terrain);
        palette.insert("far_block".to_string(), Rgb::new(0, 255, 0), BlockClass::Terrain);
        ColorMatcher::new(Arc::new(palette), 8).unwrap()
    }

    fn frac3(x: f64, y: f64, z: f64) -> [Fraction; 3] {
        [
            Fraction::from_f64(x),
            Fraction::from_f64(y),
            Fraction::from_f64(z),
        ]
    }

    fn frac2(u: f64, v: f64) -> Uv {
        [Fraction::from_f64(u), Fraction::from_f64(v)]
    }

    #[test]
    fn test_equilateral_triangle_fills_its_bounds() {
        let triangle = Triangle {
            positions: [
                frac3(0.0, 0.0, 0.0),
                frac3(10.0, 0.0, 0.0),
                frac3(5.0, 8.66, 0.0),
            ],
            uvs: [frac2(0.0, 0.0), frac2(1.0, 0.0), frac2(0.5, 1.0)],
        };
        let texture = TextureGrid::solid(Rgb::new(200, 40, 40), 8, 8);
        let matcher = solid_matcher("redstone_block", Rgb::new(210, 50, 50));
        let spacing = Fraction::one();
        let job = TriangleJob {
            triangle,
            texture: &texture,
            matcher: &matcher,
            grid_spacing: &spacing,
            uv_y_axis_up: true,
        };

        let (placements, step) = voxelize_triangle(&job).unwrap();
        assert!(!step.is_zero());
        assert!(!placements.is_empty());

        let xs: Vec<i64> = placements.iter().map(|p| p.x).collect();
        let ys: Vec<i64> = placements.iter().map(|p| p.y).collect();
        // Bounding box within one grid unit of the triangle's own bounds.
        assert!(xs.iter().min().unwrap().abs() <= 1);
        assert!((xs.iter().max().unwrap() - 10).abs() <= 1);
        assert!(ys.iter().min().unwrap().abs() <= 1);
        assert!((ys.iter().max().unwrap() - 9).abs() <= 1);
        assert!(placements.iter().all(|p| p.z == 0));
        // Uniform texture resolves to the single nearest block everywhere.
        assert!(placements.iter().all(|p| p.block == "redstone_block"));

        // No duplicate grid cells survive the per-triangle dedup.
        let mut cells: Vec<_> = placements.iter().map(|p| p.grid_pos()).collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), placements.len());
    }

    #[test]
    fn test_snap_kills_negative_zero() {
        let spacing = Fraction::one();
        let snapped = snap_to_grid(&Fraction::new(-1, 1_000_000_000_000), &spacing).unwrap();
        assert_eq!(snapped, 0);
        assert_eq!(snapped.to_string(), "0");
    }

    #[test]
    fn test_uv_wrap_and_flip() {
        // Texture: top row red, bottom row blue.
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_fn(2, 2, |_, y| {
            if y == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        }));
        let texture = TextureGrid::from_image(&img);

        // v = 0 with the Y axis up means the image bottom.
        let bottom = sample_texture(&frac2(0.0, 0.0), &texture, true).unwrap();
        assert_eq!(bottom, Rgb::new(0, 0, 255));
        let top = sample_texture(&frac2(0.0, 0.0), &texture, false).unwrap();
        assert_eq!(top, Rgb::new(255, 0, 0));

        // Negative coordinates wrap by the euclidean rule: -0.75 -> 0.25.
        let wrapped = sample_texture(&frac2(-0.75, -0.75), &texture, false).unwrap();
        let direct = sample_texture(&frac2(0.25, 0.25), &texture, false).unwrap();
        assert_eq!(wrapped, direct);
    }
}
