//! Bounded fan-out across triangles and frames, fan-in into shared state.
//!
//! One task per triangle (object mode) or per frame (video mode), admitted
//! by a counting semaphore so no more than the configured number run at
//! once. Results merge into one lock-guarded accumulator; the histogram and
//! bounding box are commutative, and the placement list is sorted downstream,
//! so completion order does not affect the final output.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::color::ColorMatcher;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::mapper::{self, TriangleJob, VoxelPlacement};
use crate::mesh::{Mesh, TextureGrid};
use crate::source;

/// Running min/max per grid axis.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridBounds {
    extent: Option<([i64; 3], [i64; 3])>,
}

impl GridBounds {
    pub fn expand(&mut self, x: i64, y: i64, z: i64) {
        let p = [x, y, z];
        match &mut self.extent {
            None => self.extent = Some((p, p)),
            Some((min, max)) => {
                for axis in 0..3 {
                    min[axis] = min[axis].min(p[axis]);
                    max[axis] = max[axis].max(p[axis]);
                }
            }
        }
    }

    pub fn min_max(&self) -> Option<([i64; 3], [i64; 3])> {
        self.extent
    }
}

/// Shared accumulator for one run. Mutated only under its lock.
#[derive(Debug, Default)]
pub struct RunStats {
    pub bounds: GridBounds,
    pub usage: HashMap<String, u64>,
    pub placements: Vec<VoxelPlacement>,
    pub triangles: u64,
}

impl RunStats {
    fn absorb(&mut self, placements: Vec<VoxelPlacement>) {
        for p in &placements {
            self.bounds.expand(p.x, p.y, p.z);
            *self.usage.entry(p.block.clone()).or_insert(0) += 1;
        }
        self.placements.extend(placements);
    }
}

/// Voxelize a whole mesh: one bounded task per resolved triangle.
///
/// Faces referencing a missing material are skipped with a diagnostic; an
/// out-of-range index aborts the run.
pub async fn run_object(
    mesh: Arc<Mesh>,
    materials: Arc<HashMap<String, Arc<TextureGrid>>>,
    matcher: Arc<ColorMatcher>,
    config: &Config,
) -> Result<RunStats> {
    let stats = Arc::new(Mutex::new(RunStats::default()));
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent));
    let mut tasks: JoinSet<Result<()>> = JoinSet::new();

    for face in &mesh.faces {
        let Some(texture) = materials.get(&face.material) else {
            warn!(
                "skip face L{}: no material named {:?}",
                face.line, face.material
            );
            continue;
        };

        // Index errors are fatal; resolve before spawning anything more.
        let triangles = mesh.resolve_triangles(face)?;

        for triangle in triangles {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .expect("admission semaphore closed");
            let texture = Arc::clone(texture);
            let matcher = Arc::clone(&matcher);
            let stats = Arc::clone(&stats);
            let spacing = config.grid_spacing.clone();
            let uv_y_axis_up = config.uv_y_axis_up;
            let line = face.line;

            tasks.spawn(async move {
                let outcome = tokio::task::spawn_blocking(move || {
                    let job = TriangleJob {
                        triangle,
                        texture: &texture,
                        matcher: &matcher,
                        grid_spacing: &spacing,
                        uv_y_axis_up,
                    };
                    mapper::voxelize_triangle(&job)
                })
                .await
                .expect("sampling task panicked");
                drop(permit);

                let (placements, step) = outcome?;
                debug!(
                    "face L{line}: step {:.6}, {} placements",
                    step.to_f64(),
                    placements.len()
                );

                let mut stats = stats.lock().unwrap();
                stats.absorb(placements);
                stats.triangles += 1;
                Ok(())
            });
        }
    }

    // Completion barrier: every dispatched task must join before results are
    // read. The first fatal error wins; in-flight peers are not cancelled.
    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined.expect("triangle task panicked") {
            first_error.get_or_insert(err);
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    let stats = Arc::try_unwrap(stats)
        .map_err(|_| Error::Asset("run accumulator still shared".to_string()))?
        .into_inner()
        .unwrap();
    info!(
        "object run: {} triangles, {} placements",
        stats.triangles,
        stats.placements.len()
    );
    Ok(stats)
}

/// Voxelize a single decoded image: one placement per pixel at z = 0.
pub fn run_image(img: &image::DynamicImage, matcher: &ColorMatcher) -> RunStats {
    let mut stats = RunStats::default();
    stats.absorb(source::image::placements(img, matcher));
    info!("image run: {} placements", stats.placements.len());
    stats
}

/// One video frame's worth of placements.
#[derive(Debug)]
pub struct FrameRun {
    pub index: usize,
    pub placements: Vec<VoxelPlacement>,
}

/// Voxelize a video: one bounded task per sampled frame. Frames come back
/// keyed by index, so the output order is stable however tasks complete.
pub async fn run_video(
    path: &std::path::Path,
    matcher: Arc<ColorMatcher>,
    config: &Config,
) -> Result<(Vec<FrameRun>, RunStats)> {
    let duration = source::video::probe_duration(path).await?;
    info!("video duration: {duration:.1}s");

    let stats = Arc::new(Mutex::new(RunStats::default()));
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent));
    let mut tasks: JoinSet<Result<FrameRun>> = JoinSet::new();

    let frame_interval = 1.0 / config.video_frame_rate as f64;
    let mut timestamp = 0.0;
    let mut index = 0;
    while timestamp < duration {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("admission semaphore closed");
        let path = path.to_path_buf();
        let scale = config.video_scale.clone();
        let matcher = Arc::clone(&matcher);
        let stats = Arc::clone(&stats);

        tasks.spawn(async move {
            let frame = source::video::extract_frame(&path, timestamp, &scale).await?;
            let placements = tokio::task::spawn_blocking(move || {
                source::image::placements(&frame, &matcher)
            })
            .await
            .expect("frame task panicked");
            drop(permit);

            let mut stats = stats.lock().unwrap();
            for p in &placements {
                stats.bounds.expand(p.x, p.y, p.z);
                *stats.usage.entry(p.block.clone()).or_insert(0) += 1;
            }
            debug!("frame {index}: {} placements", placements.len());
            Ok(FrameRun { index, placements })
        });

        timestamp += frame_interval;
        index += 1;
    }

    let mut frames = Vec::new();
    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        match joined.expect("frame task panicked") {
            Ok(frame) => frames.push(frame),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }
    frames.sort_by_key(|f| f.index);

    let stats = Arc::try_unwrap(stats)
        .map_err(|_| Error::Asset("run accumulator still shared".to_string()))?
        .into_inner()
        .unwrap();
    info!("video run: {} frames", frames.len());
    Ok((frames, stats))
}
