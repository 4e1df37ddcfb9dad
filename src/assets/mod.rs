//! Block asset scanning

pub mod blocks;

pub use blocks::{scan_palette, BlockFilter};
