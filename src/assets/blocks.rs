//! Block palette construction from a game asset tree.
//!
//! Walks `<assets>/minecraft/blockstates/*.json`, keeps blocks whose single
//! stateless variant resolves to a model with one texture for all sides,
//! filters ids through the allow/deny patterns, and reduces each texture to
//! its average color. The result is the read-only [`BlockPalette`] every
//! sampling task shares.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use regex::Regex;
use serde::Deserialize;

use crate::color::palette::{BlockClass, BlockPalette};
use crate::color::Rgb;
use crate::core::config::Config;
use crate::core::error::Result;

#[derive(Deserialize)]
struct BlockStates {
    #[serde(default)]
    variants: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct BlockModel {
    #[serde(default)]
    textures: HashMap<String, String>,
}

/// Compiled allow/deny/marker patterns for block ids.
pub struct BlockFilter {
    allow: Vec<Regex>,
    deny: Vec<Regex>,
    marker: Vec<Regex>,
}

impl BlockFilter {
    pub fn from_config(config: &Config) -> Result<Self> {
        let compile = |patterns: &[String]| -> Result<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| Regex::new(p).map_err(Into::into))
                .collect()
        };
        Ok(Self {
            allow: compile(&config.allowed_blocks)?,
            deny: compile(&config.ignored_blocks)?,
            marker: compile(&config.marker_blocks)?,
        })
    }

    /// Deny patterns win over allow patterns.
    fn admits(&self, id: &str) -> bool {
        let allowed = self.allow.iter().any(|re| re.is_match(id));
        allowed && !self.deny.iter().any(|re| re.is_match(id))
    }

    fn classify(&self, id: &str) -> BlockClass {
        if self.marker.iter().any(|re| re.is_match(id)) {
            BlockClass::Marker
        } else {
            BlockClass::Terrain
        }
    }
}

/// A `namespace:path` resource location.
struct ResourcePath {
    namespace: String,
    path: String,
}

impl ResourcePath {
    fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((ns, path)) => Self {
                namespace: ns.to_string(),
                path: path.to_string(),
            },
            None => Self {
                namespace: "minecraft".to_string(),
                path: raw.to_string(),
            },
        }
    }
}

/// Scan the asset tree into a block palette.
pub fn scan_palette(assets_dir: &Path, filter: &BlockFilter) -> Result<Arc<BlockPalette>> {
    let states_dir = assets_dir.join("minecraft").join("blockstates");
    let mut palette = BlockPalette::new();
    let mut scanned = 0usize;
    let mut stateless = 0usize;

    for entry in fs::read_dir(&states_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        scanned += 1;

        let Some(block_id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(model) = stateless_model(&path)? else {
            continue;
        };
        stateless += 1;

        if !filter.admits(block_id) {
            debug!("filtered out {block_id}");
            continue;
        }

        let Some(texture) = uniform_texture(assets_dir, &model)? else {
            continue;
        };
        let texture_path = texture_file(assets_dir, &texture);
        let Some(color) = average_color(&texture_path)? else {
            continue;
        };

        palette.insert(block_id.to_string(), color, filter.classify(block_id));
    }

    info!(
        "scanned {scanned} blockstates, {stateless} stateless, {} kept",
        palette.len()
    );
    Ok(Arc::new(palette))
}

/// The model referenced by the block's single stateless variant, if any.
fn stateless_model(path: &Path) -> Result<Option<ResourcePath>> {
    let Ok(states) = serde_json::from_slice::<BlockStates>(&fs::read(path)?) else {
        debug!("unreadable blockstate {}", path.display());
        return Ok(None);
    };
    let Some(variant) = states.variants.get("") else {
        return Ok(None);
    };

    // Either one model object or an array of rotated alternatives; the first
    // alternative's texture stands for all of them.
    let model = match variant {
        serde_json::Value::Array(list) => list.first().and_then(|v| v.get("model")),
        serde_json::Value::Object(_) => variant.get("model"),
        _ => None,
    };
    Ok(model
        .and_then(|m| m.as_str())
        .map(ResourcePath::parse))
}

/// The `"all"` texture of a model, when the model paints every side alike.
fn uniform_texture(assets_dir: &Path, model: &ResourcePath) -> Result<Option<ResourcePath>> {
    let model_path = assets_dir
        .join(&model.namespace)
        .join("models")
        .join(format!("{}.json", model.path));
    let Ok(bytes) = fs::read(&model_path) else {
        // Model file missing: recoverable, the block just drops out.
        debug!("no model file at {}", model_path.display());
        return Ok(None);
    };
    let Ok(model) = serde_json::from_slice::<BlockModel>(&bytes) else {
        debug!("unreadable model {}", model_path.display());
        return Ok(None);
    };
    Ok(model.textures.get("all").map(|t| ResourcePath::parse(t)))
}

fn texture_file(assets_dir: &Path, texture: &ResourcePath) -> PathBuf {
    assets_dir
        .join(&texture.namespace)
        .join("textures")
        .join(format!("{}.png", texture.path))
}

/// Average all pixels of a texture into one representative color.
fn average_color(path: &Path) -> Result<Option<Rgb>> {
    let Ok(img) = image::open(path) else {
        debug!("no texture file at {}", path.display());
        return Ok(None);
    };
    let rgb = img.to_rgb8();
    let pixels = (rgb.width() * rgb.height()) as u64;
    if pixels == 0 {
        return Ok(None);
    }

    let mut sums = [0u64; 3];
    for p in rgb.pixels() {
        sums[0] += p[0] as u64;
        sums[1] += p[1] as u64;
        sums[2] += p[2] as u64;
    }
    Ok(Some(Rgb::new(
        (sums[0] / pixels) as u8,
        (sums[1] / pixels) as u8,
        (sums[2] / pixels) as u8,
    )))
}
