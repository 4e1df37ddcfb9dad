//! Voxelizer binary — converts a mesh, image, or video into `.mcfunction`
//! command batches.
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --source <KIND>    obj | image | video (default: obj)
//!   --input <PATH>     Source file (.obj, .png/.jpg, or .mp4)
//!   --assets <DIR>     Game asset tree with blockstates/models/textures
//!   --output <DIR>     Output directory for .mcfunction files (default: ./output)
//!   --spacing <F>      Voxel grid spacing in world units (default: 1.0)
//!   --scale <F>        Mesh scale factor (default: 1.0)
//!   --depth <BITS>     Color quantization bits per channel, 1-8 (default: 4)
//!   --jobs <N>         Max concurrent triangle/frame tasks (default: 500)
//!   --batch <N>        Max commands per batch file (default: 700000)
//!   --fps <N>          Frames per second sampled from video (default: 20)
//!   --video-scale <S>  ffmpeg rescale argument (default: "200:-1")
//!   --allow <RE,..>    Allow patterns for block ids (default: everything)
//!   --deny <RE,..>     Deny patterns for block ids
//!   --markers <RE,..>  Patterns for marker blocks emitted after terrain
//!   --uv-top           Treat the UV origin as the texture top edge
//!   --count            Report the ranked block-usage histogram

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{error, info};

use voxcraft::assets::{scan_palette, BlockFilter};
use voxcraft::batch;
use voxcraft::color::ColorMatcher;
use voxcraft::core::config::{Config, SourceKind};
use voxcraft::core::error::Result;
use voxcraft::math::Fraction;
use voxcraft::mesh::{mtl, obj};
use voxcraft::orchestrator;
use voxcraft::output;

fn main() {
    voxcraft::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config = config_from_args(&args);
    let input = PathBuf::from(parse_str_arg(&args, "--input").unwrap_or_default());
    let assets_dir = PathBuf::from(
        parse_str_arg(&args, "--assets").unwrap_or_else(|| "./assets".to_string()),
    );
    let output_dir = PathBuf::from(
        parse_str_arg(&args, "--output").unwrap_or_else(|| "./output".to_string()),
    );

    let runtime = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    if let Err(err) = runtime.block_on(run(&config, &input, &assets_dir, &output_dir)) {
        error!("run aborted: {err}");
        std::process::exit(1);
    }
}

async fn run(
    config: &Config,
    input: &Path,
    assets_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    let start = Instant::now();

    info!("scanning block assets in {}", assets_dir.display());
    let filter = BlockFilter::from_config(config)?;
    let palette = scan_palette(assets_dir, &filter)?;
    info!("block scan done in {:.1?}", start.elapsed());

    let matcher_start = Instant::now();
    let matcher = Arc::new(ColorMatcher::new(palette, config.color_depth_bits)?);
    info!("color matcher ready in {:.1?}", matcher_start.elapsed());

    match config.source {
        SourceKind::Object => {
            let parse_start = Instant::now();
            let text = std::fs::read_to_string(input)?;
            let mesh = Arc::new(obj::parse(&text, &config.mesh_scale));
            info!(
                "parsed {} vertices, {} texcoords, {} faces in {:.1?}",
                mesh.vertices.len(),
                mesh.texcoords.len(),
                mesh.faces.len(),
                parse_start.elapsed()
            );

            let base_dir = input.parent().unwrap_or(Path::new("."));
            let materials = match &mesh.material_lib {
                Some(lib) => {
                    let text = std::fs::read_to_string(base_dir.join(lib))?;
                    mtl::parse(&text, base_dir)?
                }
                None => HashMap::new(),
            };

            let mut stats =
                orchestrator::run_object(mesh, Arc::new(materials), matcher, config).await?;
            let placements = std::mem::take(&mut stats.placements);
            let plan = batch::assemble(placements, config.max_commands_per_batch);
            let written =
                output::write_batches(&plan, output_dir, "f0001-", &config.grid_spacing)?;
            for path in &written {
                info!("wrote {}", path.display());
            }
            output::log_summary(&plan, &stats, config.report_block_usage);
        }
        SourceKind::Image => {
            let img = image::open(input)?;
            let mut stats = orchestrator::run_image(&img, &matcher);
            let placements = std::mem::take(&mut stats.placements);
            let plan = batch::assemble(placements, config.max_commands_per_batch);
            let written =
                output::write_batches(&plan, output_dir, "f0001-", &config.grid_spacing)?;
            for path in &written {
                info!("wrote {}", path.display());
            }
            output::log_summary(&plan, &stats, config.report_block_usage);
        }
        SourceKind::Video => {
            let (frames, stats) = orchestrator::run_video(input, matcher, config).await?;
            let mut total_commands = 0usize;
            let mut total_batches = 0usize;
            for frame in frames {
                let plan =
                    batch::assemble(frame.placements, config.max_commands_per_batch);
                total_commands += plan.unique;
                total_batches += plan.batches.len();
                let prefix = format!("f{:04}-", frame.index + 1);
                output::write_batches(&plan, output_dir, &prefix, &config.grid_spacing)?;
            }
            info!("total commands: {total_commands} in {total_batches} batches");
            if config.report_block_usage {
                output::log_usage(&stats.usage);
            }
        }
    }

    info!("finished in {:.1?}", start.elapsed());
    Ok(())
}

fn config_from_args(args: &[String]) -> Config {
    let mut config = Config::default();

    config.source = match parse_str_arg(args, "--source").as_deref() {
        Some("image") => SourceKind::Image,
        Some("video") => SourceKind::Video,
        _ => SourceKind::Object,
    };
    if let Some(spacing) = parse_f64_arg(args, "--spacing") {
        config.grid_spacing = Fraction::from_f64(spacing);
    }
    if let Some(scale) = parse_f64_arg(args, "--scale") {
        config.mesh_scale = Fraction::from_f64(scale);
    }
    if let Some(depth) = parse_usize_arg(args, "--depth") {
        config.color_depth_bits = depth.clamp(1, 8) as u8;
    }
    if let Some(jobs) = parse_usize_arg(args, "--jobs") {
        config.max_concurrent = jobs.max(1);
    }
    if let Some(max) = parse_usize_arg(args, "--batch") {
        config.max_commands_per_batch = max.max(1);
    }
    if let Some(fps) = parse_usize_arg(args, "--fps") {
        config.video_frame_rate = fps.max(1) as u32;
    }
    if let Some(scale) = parse_str_arg(args, "--video-scale") {
        config.video_scale = scale;
    }
    if let Some(allow) = parse_str_arg(args, "--allow") {
        config.allowed_blocks = split_patterns(&allow);
    }
    if let Some(deny) = parse_str_arg(args, "--deny") {
        config.ignored_blocks = split_patterns(&deny);
    }
    if let Some(markers) = parse_str_arg(args, "--markers") {
        config.marker_blocks = split_patterns(&markers);
    }
    config.uv_y_axis_up = !args.iter().any(|a| a == "--uv-top");
    config.report_block_usage = args.iter().any(|a| a == "--count");

    config
}

fn split_patterns(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

fn parse_str_arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_f64_arg(args: &[String], name: &str) -> Option<f64> {
    parse_str_arg(args, name)?.parse().ok()
}

fn parse_usize_arg(args: &[String], name: &str) -> Option<usize> {
    parse_str_arg(args, name)?.parse().ok()
}
