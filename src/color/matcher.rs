//! Nearest-block color matching.
//!
//! Two operating modes, chosen by the configured quantization depth:
//!
//! - **Quantized cube** (depth < 6 bits/channel): the nearest block for every
//!   reachable quantized RGB cell is precomputed once, in parallel, and every
//!   later query is an O(1) table lookup.
//! - **Exhaustive** (depth >= 6): the cube would be too large, so each query
//!   scans the palette once, memoized per exact input color.
//!
//! Ties are broken toward the lexicographically smaller block id, so results
//! never depend on enumeration order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rayon::prelude::*;

use super::palette::BlockPalette;
use super::space::lab_distance;
use super::Rgb;
use crate::core::error::{Error, Result};

/// Quantization depths below this get the precomputed cube.
const CUBE_DEPTH_LIMIT: u8 = 6;

struct QuantizedCube {
    shift: u8,
    side: usize,
    cells: Vec<String>,
}

impl QuantizedCube {
    fn lookup(&self, target: Rgb) -> &str {
        let r = (target.r >> self.shift) as usize;
        let g = (target.g >> self.shift) as usize;
        let b = (target.b >> self.shift) as usize;
        &self.cells[(r * self.side + g) * self.side + b]
    }
}

/// Maps an arbitrary RGB sample to the closest palette block.
///
/// Shared read-only across all sampling tasks; the memo cache sits behind its
/// own lock.
pub struct ColorMatcher {
    palette: Arc<BlockPalette>,
    cube: Option<QuantizedCube>,
    memo: Mutex<HashMap<Rgb, String>>,
}

impl ColorMatcher {
    /// Build a matcher, precomputing the quantized cube when the depth is
    /// small enough for it to pay off.
    pub fn new(palette: Arc<BlockPalette>, depth_bits: u8) -> Result<Self> {
        if palette.is_empty() {
            return Err(Error::Asset("block palette is empty".to_string()));
        }
        if !(1..=8).contains(&depth_bits) {
            return Err(Error::Asset(format!(
                "color depth must be 1..=8 bits, got {depth_bits}"
            )));
        }

        let cube = (depth_bits < CUBE_DEPTH_LIMIT)
            .then(|| Self::build_cube(&palette, depth_bits));

        Ok(Self {
            palette,
            cube,
            memo: Mutex::new(HashMap::new()),
        })
    }

    /// Precompute the nearest block for every quantized (R,G,B) cell.
    /// One parallel task per (R,G) pair, each filling one B row.
    fn build_cube(palette: &BlockPalette, depth_bits: u8) -> QuantizedCube {
        let shift = 8 - depth_bits;
        let side = ((0xffu16 >> shift) + 1) as usize;

        let cells: Vec<String> = (0..side * side)
            .into_par_iter()
            .flat_map_iter(|rg| {
                let r = ((rg / side) as u8) << shift;
                let g = ((rg % side) as u8) << shift;
                (0..side).map(move |b| {
                    nearest_in(palette, Rgb::new(r, g, (b as u8) << shift))
                })
            })
            .collect();

        log::info!(
            "quantized {} cells at {} bits/channel over {} blocks",
            cells.len(),
            depth_bits,
            palette.len()
        );

        QuantizedCube { shift, side, cells }
    }

    /// Resolve a sample color to the closest block id.
    pub fn resolve(&self, target: Rgb) -> String {
        if let Some(cube) = &self.cube {
            return cube.lookup(target).to_string();
        }

        let mut memo = self.memo.lock().unwrap();
        if let Some(hit) = memo.get(&target) {
            return hit.clone();
        }
        let id = nearest_in(&self.palette, target);
        memo.insert(target, id.clone());
        id
    }

    /// Exhaustive scan, bypassing cube and memo. Exposed for tests and for
    /// the cube build itself.
    pub fn nearest(&self, target: Rgb) -> String {
        nearest_in(&self.palette, target)
    }

    pub fn palette(&self) -> &BlockPalette {
        &self.palette
    }
}

/// Scan every candidate once. Iteration is in sorted id order and only a
/// strictly smaller distance replaces the best candidate, so equal-distance
/// ties always resolve to the lexicographically smaller id.
fn nearest_in(palette: &BlockPalette, target: Rgb) -> String {
    let mut best: Option<(&str, f64)> = None;
    for (id, entry) in palette.iter() {
        let d = lab_distance(entry.color, target);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((id, d));
        }
    }
    // The constructor rejects empty palettes.
    best.expect("palette is never empty").0.to_string()
}
