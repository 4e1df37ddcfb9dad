//! Voxcraft - converts textured meshes, images, and video frames into
//! block-world voxel placements and size-bounded command batches.

pub mod assets;
pub mod batch;
pub mod color;
pub mod core;
pub mod mapper;
pub mod math;
pub mod mesh;
pub mod orchestrator;
pub mod output;
pub mod sampler;
pub mod source;
