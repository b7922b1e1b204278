//! Ember math - vector, ray and interval primitives.
//!
//! Vectors come straight from glam; this crate adds the small
//! ray-tracing types layered on top of them.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;

pub use interval::Interval;
pub use ray::Ray;
