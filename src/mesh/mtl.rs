//! MTL parsing and texture color grids.
//!
//! Only `newmtl` and `map_Kd` records matter here; the diffuse texture is
//! decoded once into a column-major color grid that sampling tasks share
//! read-only.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use crate::color::Rgb;
use crate::core::error::Result;

/// A decoded texture as a column-major grid: `grid[x][y]`, row 0 at the
/// image top.
#[derive(Clone, Debug)]
pub struct TextureGrid {
    width: usize,
    height: usize,
    columns: Vec<Vec<Rgb>>,
}

impl TextureGrid {
    pub fn from_image(img: &image::DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        let columns = (0..width)
            .map(|x| {
                (0..height)
                    .map(|y| {
                        let p = rgb.get_pixel(x as u32, y as u32);
                        Rgb::new(p[0], p[1], p[2])
                    })
                    .collect()
            })
            .collect();
        Self {
            width,
            height,
            columns,
        }
    }

    /// Uniform single-color grid, used by tests and fallback materials.
    pub fn solid(color: Rgb, width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            columns: vec![vec![color; height]; width],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample by normalized coordinates in [0, 1); `v` counts from the image
    /// top. Callers wrap and flip before this point.
    pub fn sample(&self, u: f64, v: f64) -> Rgb {
        if self.width == 0 || self.height == 0 {
            return Rgb::new(0, 0, 0);
        }
        let x = ((u * self.width as f64) as usize).min(self.width - 1);
        let y = ((v * self.height as f64) as usize).min(self.height - 1);
        self.columns[x][y]
    }
}

/// Parse an MTL document and decode every referenced texture, resolving
/// texture paths against `base_dir`.
///
/// A material whose texture fails to load is skipped with a diagnostic;
/// faces that reference it are later skipped the same way.
pub fn parse(text: &str, base_dir: &Path) -> Result<HashMap<String, Arc<TextureGrid>>> {
    let mut materials = HashMap::new();
    let mut current = String::new();

    for (ln, line) in text.lines().enumerate() {
        let Some((keyword, data)) = line.trim_end().split_once(' ') else {
            continue;
        };

        match keyword {
            "newmtl" => {
                debug!("L{ln}: new material {data}");
                current = data.trim().to_string();
            }
            "map_Kd" => {
                let path = base_dir.join(data.trim());
                match image::open(&path) {
                    Ok(img) => {
                        debug!("L{ln}: texture {} -> {current}", path.display());
                        materials.insert(
                            current.clone(),
                            Arc::new(TextureGrid::from_image(&img)),
                        );
                    }
                    Err(err) => {
                        warn!(
                            "skip material {current}: texture {} failed: {err}",
                            path.display()
                        );
                    }
                }
            }
            _ => debug!("skip L{ln}: {line}"),
        }
    }

    Ok(materials)
}
