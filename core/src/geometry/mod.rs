//! Geometry

mod point2;
mod vector2;

// Re-export
pub use point2::*;
pub use vector2::*;
