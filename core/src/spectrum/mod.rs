//! Spectrum

mod xyz;

// Re-export
pub use xyz::*;
