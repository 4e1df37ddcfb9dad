//! Batch assembly: global dedup, emission ordering, and chunking.

use crate::mapper::VoxelPlacement;

/// The assembled output: ordered batches of at most the configured size.
#[derive(Debug)]
pub struct BatchPlan {
    pub batches: Vec<Vec<VoxelPlacement>>,
    /// Unique placements across all batches.
    pub unique: usize,
}

/// Deduplicate, order, and split placements into command-sized batches.
///
/// Placements are sorted by grid position with ties broken by class and
/// block id, then compacted, so whatever order tasks completed in, the
/// output is deterministic: two tasks disagreeing about one cell always
/// resolve the same way. A second stable sort moves marker blocks after
/// terrain while preserving the positional order inside each class. Dedup
/// is idempotent: assembling an already assembled list changes nothing.
pub fn assemble(mut placements: Vec<VoxelPlacement>, max_per_batch: usize) -> BatchPlan {
    placements.sort_by(|a, b| {
        a.grid_pos()
            .cmp(&b.grid_pos())
            .then_with(|| a.class.cmp(&b.class))
            .then_with(|| a.block.cmp(&b.block))
    });
    placements.dedup_by_key(|p| p.grid_pos());
    placements.sort_by_key(|p| p.class);

    let unique = placements.len();
    let max = max_per_batch.max(1);
    let batches = placements.chunks(max).map(<[_]>::to_vec).collect();

    BatchPlan { batches, unique }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BlockClass, Rgb};

    fn placement(x: i64, y: i64, z: i64, class: BlockClass) -> VoxelPlacement {
        VoxelPlacement {
            x,
            y,
            z,
            color: Rgb::new(0, 0, 0),
            block: match class {
                BlockClass::Terrain => "stone".to_string(),
                BlockClass::Marker => "torch".to_string(),
            },
            class,
        }
    }

    #[test]
    fn test_2500_placements_make_three_batches() {
        let placements: Vec<_> = (0..2500)
            .map(|i| placement(i % 50, i / 50, 0, BlockClass::Terrain))
            .collect();
        let plan = assemble(placements, 1000);
        assert_eq!(plan.unique, 2500);
        let sizes: Vec<usize> = plan.batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1000, 1000, 500]);

        // Every placement appears exactly once.
        let mut all: Vec<_> = plan
            .batches
            .iter()
            .flatten()
            .map(VoxelPlacement::grid_pos)
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 2500);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let mut placements = Vec::new();
        for i in 0..10 {
            placements.push(placement(i, 0, 0, BlockClass::Terrain));
            placements.push(placement(i, 0, 0, BlockClass::Terrain));
        }
        let once = assemble(placements, 100);
        let twice = assemble(once.batches.concat(), 100);
        assert_eq!(once.unique, 10);
        assert_eq!(once.batches, twice.batches);
    }

    #[test]
    fn test_markers_trail_terrain() {
        let placements = vec![
            placement(5, 0, 0, BlockClass::Marker),
            placement(1, 0, 0, BlockClass::Terrain),
            placement(3, 0, 0, BlockClass::Marker),
            placement(2, 0, 0, BlockClass::Terrain),
        ];
        let plan = assemble(placements, 100);
        let order: Vec<(BlockClass, i64)> = plan.batches[0]
            .iter()
            .map(|p| (p.class, p.x))
            .collect();
        assert_eq!(
            order,
            vec![
                (BlockClass::Terrain, 1),
                (BlockClass::Terrain, 2),
                (BlockClass::Marker, 3),
                (BlockClass::Marker, 5),
            ]
        );
    }

    #[test]
    fn test_dedup_ignores_accumulation_order() {
        let named = |block: &str| VoxelPlacement {
            x: 4,
            y: 2,
            z: 0,
            color: Rgb::new(0, 0, 0),
            block: block.to_string(),
            class: BlockClass::Terrain,
        };
        // Two tasks claim the same cell with different blocks; the survivor
        // must not depend on which finished first.
        let forward = assemble(vec![named("stone"), named("dirt")], 100);
        let reverse = assemble(vec![named("dirt"), named("stone")], 100);
        assert_eq!(forward.unique, 1);
        assert_eq!(forward.batches, reverse.batches);
        assert_eq!(forward.batches[0][0].block, "dirt");
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let plan = assemble(Vec::new(), 10);
        assert_eq!(plan.unique, 0);
        assert!(plan.batches.is_empty());
    }
}
