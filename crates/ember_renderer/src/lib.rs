//! Ember renderer - CPU path tracing core.
//!
//! A Monte Carlo path tracer for spheres with diffuse, metal and glass
//! materials lit by a sky gradient.
//!
//! Randomness is always passed in explicitly as `&mut dyn RngCore`, so a
//! render is reproducible for a given seed and safe to split across threads.

mod bucket;
mod camera;
mod error;
mod hittable;
mod material;
mod renderer;
mod sampling;
mod scene;
mod sphere;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, CameraSettings};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render, render_parallel, render_pixel, sky_color,
    ImageBuffer, RenderConfig,
};
pub use scene::{random_scene, showcase_camera};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Interval, Ray, Vec3};

use rand::{Rng, RngCore};

/// Draw a uniform f32 in [0, 1) from a type-erased generator.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}
