//! Rejection samplers for the unit sphere and unit disk.

use crate::{gen_f32, Vec3};
use rand::RngCore;

/// Upper bound on rejection attempts. Each attempt succeeds with
/// probability pi/6 (sphere) or pi/4 (disk), so this never triggers
/// with a working generator.
const MAX_REJECTION_ATTEMPTS: usize = 64;

/// Uniform point strictly inside the unit sphere.
///
/// Draws candidates in [-1, 1]^3 until one has squared length < 1. Falls
/// back to the center if the generator keeps producing rejected samples.
pub(crate) fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let p = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
    log::warn!("unit sphere sampler exhausted {MAX_REJECTION_ATTEMPTS} attempts");
    Vec3::ZERO
}

/// Uniform point strictly inside the unit disk in the xy plane (z = 0).
pub(crate) fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
    log::warn!("unit disk sampler exhausted {MAX_REJECTION_ATTEMPTS} attempts");
    Vec3::ZERO
}
