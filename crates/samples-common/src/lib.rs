//! # Shared host-side code for the ray tracing samples
//!
//! The samples themselves are thin drivers around the ray tracing runtime; what lives here
//! is the portable part they all lean on: a hierarchical slot allocator for resource indices
//! and a procedural noise generator for textures, plus the small bit / color helpers used by both.

pub mod bits;
pub mod color;
pub mod geometry;
pub mod noise;
pub mod slot_finder;

pub use slot_finder::SlotFinder;
