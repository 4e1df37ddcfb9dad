//! Core pipeline types and utilities

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, SourceKind};
pub use error::{Error, Result};
