//! Run configuration resolved before the pipeline starts.
//!
//! Everything here is decided once (by the binary's argument parsing) and
//! then passed by reference into every stage; no component reads ambient
//! state.

use crate::math::Fraction;

/// What kind of input one run consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Triangulated OBJ mesh with MTL materials.
    Object,
    /// Single raster image (PNG/JPEG).
    Image,
    /// Video file, sampled at a fixed frame rate via ffmpeg.
    Video,
}

/// Immutable configuration for one conversion run.
#[derive(Clone, Debug)]
pub struct Config {
    pub source: SourceKind,
    /// Edge length of one output voxel in world units.
    pub grid_spacing: Fraction,
    /// Uniform scale applied to every mesh vertex.
    pub mesh_scale: Fraction,
    /// True when the texture V axis points up (UV origin at the image
    /// bottom). False for sources with the origin at the image top.
    pub uv_y_axis_up: bool,
    /// Bits kept per channel by the quantized nearest-color cube (1..=8).
    /// Depths of 6 and above skip the cube and match exhaustively.
    pub color_depth_bits: u8,
    /// Maximum triangle/frame tasks in flight at once.
    pub max_concurrent: usize,
    /// Maximum commands per emitted batch.
    pub max_commands_per_batch: usize,
    /// Allow patterns for block ids; an empty pattern allows everything.
    pub allowed_blocks: Vec<String>,
    /// Deny patterns, applied after the allow list.
    pub ignored_blocks: Vec<String>,
    /// Patterns naming decorative/marker blocks, emitted after terrain.
    pub marker_blocks: Vec<String>,
    /// Frames per second sampled from a video source.
    pub video_frame_rate: u32,
    /// ffmpeg rescale argument for extracted frames, e.g. "200:-1".
    pub video_scale: String,
    /// Whether the final summary includes the ranked block histogram.
    pub report_block_usage: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::Object,
            grid_spacing: Fraction::one(),
            mesh_scale: Fraction::one(),
            uv_y_axis_up: true,
            color_depth_bits: 4,
            max_concurrent: 500,
            max_commands_per_batch: 700_000,
            allowed_blocks: vec![String::new()],
            ignored_blocks: vec![
                "powder$".to_string(),
                "sand$".to_string(),
                "gravel$".to_string(),
                "glass".to_string(),
                "spawner".to_string(),
                "ice".to_string(),
            ],
            marker_blocks: Vec::new(),
            video_frame_rate: 20,
            video_scale: "200:-1".to_string(),
            report_block_usage: false,
        }
    }
}
