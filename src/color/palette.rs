//! The block palette: block id -> representative color.
//!
//! Built once from the asset scan, then read-only for the lifetime of a run,
//! which makes it safe to share across sampling tasks without a lock.

use std::collections::BTreeMap;

use super::Rgb;

/// Emission priority of a block.
///
/// Terrain fills the bulk of the output; decorative/marker blocks are
/// emitted after it so they land on finished terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockClass {
    Terrain,
    Marker,
}

/// One palette entry.
#[derive(Clone, Copy, Debug)]
pub struct PaletteEntry {
    pub color: Rgb,
    pub class: BlockClass,
}

/// Read-only mapping from block id to its representative color.
///
/// Backed by a `BTreeMap` so iteration is always in lexicographic id order;
/// the matcher relies on that for deterministic tie-breaking.
#[derive(Clone, Debug, Default)]
pub struct BlockPalette {
    entries: BTreeMap<String, PaletteEntry>,
}

impl BlockPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: String, color: Rgb, class: BlockClass) {
        self.entries.insert(id, PaletteEntry { color, class });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in lexicographic id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PaletteEntry)> {
        self.entries.iter().map(|(id, e)| (id.as_str(), e))
    }

    pub fn get(&self, id: &str) -> Option<&PaletteEntry> {
        self.entries.get(id)
    }

    /// Emission class of a block id; unknown ids count as terrain.
    pub fn class_of(&self, id: &str) -> BlockClass {
        self.entries
            .get(id)
            .map_or(BlockClass::Terrain, |e| e.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_iteration() {
        let mut palette = BlockPalette::new();
        palette.insert("stone".into(), Rgb::new(128, 128, 128), BlockClass::Terrain);
        palette.insert("basalt".into(), Rgb::new(40, 40, 45), BlockClass::Terrain);
        palette.insert("torch".into(), Rgb::new(240, 220, 80), BlockClass::Marker);

        let ids: Vec<&str> = palette.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["basalt", "stone", "torch"]);
        assert_eq!(palette.class_of("torch"), BlockClass::Marker);
        assert_eq!(palette.class_of("unknown"), BlockClass::Terrain);
    }
}
