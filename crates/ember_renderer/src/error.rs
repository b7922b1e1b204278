//! Errors raised when a scene, camera or render configuration is invalid.

use ember_math::Vec3;
use thiserror::Error;

/// Errors that can occur while building a scene or configuring a render.
///
/// Misses and absorbed rays are not errors; they are reported as `None`
/// by the intersection and scattering routines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid sphere radius: {0} (must be finite and non-negative)")]
    InvalidRadius(f32),

    #[error("Invalid albedo {0} (components must be within [0, 1])")]
    InvalidAlbedo(Vec3),

    #[error("Invalid metal fuzz: {0} (must be within [0, 1])")]
    InvalidFuzz(f32),

    #[error("Invalid index of refraction: {0} (must be finite and positive)")]
    InvalidRefractiveIndex(f32),

    #[error("Invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("Samples per pixel must be greater than zero")]
    ZeroSamples,

    #[error("Maximum ray depth must be greater than zero")]
    ZeroDepth,

    #[error("Invalid ray interval ({min}, {max})")]
    InvalidRayInterval { min: f32, max: f32 },

    #[error("Degenerate camera: {0}")]
    DegenerateCamera(&'static str),
}

pub type RenderResult<T> = Result<T, RenderError>;
