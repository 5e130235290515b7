//! Core

extern crate hexf;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// Re-export.
pub mod contribution;
pub mod film;
pub mod filter;
pub mod geometry;
pub mod parallel;
pub mod pbrt;
pub mod renderer;
pub mod rng;
pub mod spectrum;
pub mod stats;
