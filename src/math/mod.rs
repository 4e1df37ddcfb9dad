//! Exact math primitives

pub mod fraction;

pub use fraction::Fraction;

/// A mesh vertex position in exact coordinates.
pub type Point3 = [Fraction; 3];

/// A texture coordinate pair in exact coordinates.
pub type Uv = [Fraction; 2];
