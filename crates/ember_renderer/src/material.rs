//! Material trait for surface scattering.

use crate::sampling::random_in_unit_sphere;
use crate::{gen_f32, hittable::HitRecord, Ray, RenderError, RenderResult};
use ember_math::Vec3;
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Outcome of a successful scatter event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    /// Per-channel multiplier applied to light arriving along `scattered`
    pub attenuation: Color,
    /// Outgoing ray, starting at the hit point
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    ///
    /// Every albedo component must lie in [0, 1].
    pub fn new(albedo: Color) -> RenderResult<Self> {
        Ok(Self {
            albedo: validate_albedo(albedo)?,
        })
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Offset the normal by a point in the unit sphere; this approximates
        // a cosine-weighted hemisphere around the normal
        let mut scatter_direction = rec.normal + random_in_unit_sphere(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> RenderResult<Self> {
        if !(0.0..=1.0).contains(&fuzz) {
            return Err(RenderError::InvalidFuzz(fuzz));
        }
        Ok(Self {
            albedo: validate_albedo(albedo)?,
            fuzz,
        })
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Rays perturbed below the surface are absorbed
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, scattered_dir),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> RenderResult<Self> {
        if !ior.is_finite() || ior <= 0.0 {
            return Err(RenderError::InvalidRefractiveIndex(ior));
        }
        Ok(Self { ior })
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }

    /// Schlick's approximation for reflectance.
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((ior - 1.0) / (ior + 1.0)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let unit_direction = ray_in.direction().normalize();
        let cos_in = unit_direction.dot(rec.normal);
        let entering = rec.is_front_face(ray_in);

        let (outward_normal, ratio) = if entering {
            (rec.normal, 1.0 / self.ior)
        } else {
            (-rec.normal, self.ior)
        };

        let direction = match refract(unit_direction, outward_normal, ratio) {
            // Total internal reflection
            None => reflect(unit_direction, rec.normal),
            Some(refracted) => {
                // Schlick is evaluated with the angle on the air side
                let cosine = if entering {
                    -cos_in
                } else {
                    (-refracted.normalize()).dot(outward_normal).clamp(0.0, 1.0)
                };
                if gen_f32(rng) < Self::reflectance(cosine, self.ior) {
                    reflect(unit_direction, rec.normal)
                } else {
                    refracted
                }
            }
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Attenuation must not add energy or go negative.
fn validate_albedo(albedo: Color) -> RenderResult<Color> {
    if albedo.is_finite() && albedo.cmpge(Color::ZERO).all() && albedo.cmple(Color::ONE).all() {
        Ok(albedo)
    } else {
        Err(RenderError::InvalidAlbedo(albedo))
    }
}

/// Reflect a vector about a normal.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with normal `n` facing the
/// incoming side.
///
/// Returns `None` on total internal reflection.
#[inline]
pub(crate) fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Option<Vec3> {
    let dt = uv.dot(n);
    let discriminant = 1.0 - etai_over_etat * etai_over_etat * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(etai_over_etat * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}
