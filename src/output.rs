//! Command emission: batches to `.mcfunction` files and the run summary.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::batch::BatchPlan;
use crate::core::error::Result;
use crate::mapper::VoxelPlacement;
use crate::math::Fraction;
use crate::orchestrator::RunStats;

/// Format one placement as a relative `setblock` command. World coordinates
/// are the grid index times the spacing, to two decimals.
pub fn setblock_command(p: &VoxelPlacement, spacing: &Fraction) -> String {
    let s = spacing.to_f64();
    format!(
        "setblock ~{:.2} ~{:.2} ~{:.2} {}",
        p.x as f64 * s,
        p.y as f64 * s,
        p.z as f64 * s,
        p.block
    )
}

/// Write one `.mcfunction` file per batch into `dir`, named
/// `<prefix><nnnn>.mcfunction`, and return the written paths.
pub fn write_batches(
    plan: &BatchPlan,
    dir: &Path,
    prefix: &str,
    spacing: &Fraction,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(plan.batches.len());
    for (i, batch) in plan.batches.iter().enumerate() {
        let mut body = String::new();
        for placement in batch {
            let _ = writeln!(body, "{}", setblock_command(placement, spacing));
        }
        let path = dir.join(format!("{prefix}{:04}.mcfunction", i + 1));
        fs::write(&path, body)?;
        written.push(path);
    }
    Ok(written)
}

/// Log the final run summary: totals and, when asked for, the ranked
/// block-usage histogram.
pub fn log_summary(plan: &BatchPlan, stats: &RunStats, report_usage: bool) {
    info!(
        "total unique commands: {} in {} batches",
        plan.unique,
        plan.batches.len()
    );
    if let Some((min, max)) = stats.bounds.min_max() {
        info!(
            "grid bounds: min [{},{},{}] max [{},{},{}]",
            min[0], min[1], min[2], max[0], max[1], max[2]
        );
    }

    if report_usage {
        log_usage(&stats.usage);
    }
}

/// Log the block-usage histogram ranked by count, ties by id.
pub fn log_usage(usage: &std::collections::HashMap<String, u64>) {
    let mut ranked: Vec<(&str, u64)> = usage
        .iter()
        .map(|(id, count)| (id.as_str(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    for (rank, (id, count)) in ranked.iter().enumerate() {
        info!("{:4}: {:<24} {}", rank + 1, id, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch;
    use crate::color::{BlockClass, Rgb};

    fn placement(x: i64, block: &str) -> VoxelPlacement {
        VoxelPlacement {
            x,
            y: 0,
            z: 0,
            color: Rgb::new(1, 2, 3),
            block: block.to_string(),
            class: BlockClass::Terrain,
        }
    }

    #[test]
    fn test_setblock_formatting() {
        let p = placement(-3, "stone");
        assert_eq!(
            setblock_command(&p, &Fraction::one()),
            "setblock ~-3.00 ~0.00 ~0.00 stone"
        );
        assert_eq!(
            setblock_command(&p, &Fraction::new(1, 2)),
            "setblock ~-1.50 ~0.00 ~0.00 stone"
        );
    }

    #[test]
    fn test_write_batches() {
        let dir = tempfile::tempdir().unwrap();
        let placements: Vec<_> = (0..5).map(|i| placement(i, "stone")).collect();
        let plan = batch::assemble(placements, 2);

        let paths = write_batches(&plan, dir.path(), "frame1-", &Fraction::one()).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("frame1-0001.mcfunction"));

        let body = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(body.lines().count(), 2);
        assert!(body.starts_with("setblock ~"));
    }
}
