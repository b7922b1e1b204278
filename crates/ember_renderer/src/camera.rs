//! Thin-lens camera for ray generation.

use crate::sampling::random_in_unit_disk;
use crate::{Ray, RenderError, RenderResult};
use ember_math::Vec3;
use rand::RngCore;

/// User-facing camera parameters.
///
/// Built with the `with_*` methods and turned into a [`Camera`] once the
/// image aspect ratio is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,

    // Lens settings
    pub vfov: f32,       // Vertical field of view in degrees
    pub aperture: f32,   // Lens diameter, 0 disables depth of field
    pub focus_dist: f32, // Distance from camera to plane of perfect focus
}

impl CameraSettings {
    /// Create camera settings looking down -Z from the origin.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Derive the camera basis and image plane for the given aspect ratio
    /// (width / height).
    pub fn build(&self, aspect_ratio: f32) -> RenderResult<Camera> {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(RenderError::DegenerateCamera("aspect ratio must be positive"));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(RenderError::DegenerateCamera(
                "vertical fov must be within (0, 180) degrees",
            ));
        }
        if !self.aperture.is_finite() || self.aperture < 0.0 {
            return Err(RenderError::DegenerateCamera("aperture must be non-negative"));
        }
        if !self.focus_dist.is_finite() || self.focus_dist <= 0.0 {
            return Err(RenderError::DegenerateCamera("focus distance must be positive"));
        }

        let w = (self.look_from - self.look_at)
            .try_normalize()
            .ok_or(RenderError::DegenerateCamera("look_from and look_at coincide"))?;
        let u = self
            .vup
            .cross(w)
            .try_normalize()
            .ok_or(RenderError::DegenerateCamera(
                "up vector is parallel to the view direction",
            ))?;
        let v = w.cross(u);

        let theta = self.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = aspect_ratio * half_height;

        let origin = self.look_from;
        let lower_left_corner = origin
            - half_width * self.focus_dist * u
            - half_height * self.focus_dist * v
            - self.focus_dist * w;

        Ok(Camera {
            origin,
            lower_left_corner,
            horizontal: 2.0 * half_width * self.focus_dist * u,
            vertical: 2.0 * half_height * self.focus_dist * v,
            u,
            v,
            w,
            lens_radius: self.aperture / 2.0,
        })
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera for generating rays into the scene. Immutable once built.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Generate a ray through normalized image-plane coordinates.
    ///
    /// `s` runs left to right and `t` bottom to top, both in [0, 1]. The
    /// origin is jittered over the lens disk when the aperture is non-zero.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        let ray_origin = self.origin + offset;

        Ray::new(ray_origin, target - ray_origin)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Camera basis (u right, v up, w backwards).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_basis() {
        let camera = CameraSettings::new()
            .with_position(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y)
            .build(2.0)
            .unwrap();

        let (u, v, w) = camera.basis();
        assert!((u - Vec3::X).length() < 1e-6);
        assert!((v - Vec3::Y).length() < 1e-6);
        assert!((w - Vec3::Z).length() < 1e-6);
        assert_eq!(camera.origin(), Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_camera_center_and_corners() {
        let camera = CameraSettings::new()
            .with_position(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
            .build(1.0)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let center = camera.get_ray(0.5, 0.5, &mut rng);
        assert_eq!(center.origin(), Vec3::ZERO);
        assert!((center.direction() - Vec3::NEG_Z).length() < 1e-6);

        // tan(45 deg) = 1, so the image plane spans [-1, 1] at distance 1
        let lower_left = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((lower_left.direction() - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-5);

        let upper_right = camera.get_ray(1.0, 1.0, &mut rng);
        assert!((upper_right.direction() - Vec3::new(1.0, 1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_camera_aspect_widens_horizontal() {
        let camera = CameraSettings::new().build(2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let right = camera.get_ray(1.0, 0.5, &mut rng);
        assert!((right.direction() - Vec3::new(2.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_camera_lens_jitter_stays_on_disk_and_focuses() {
        let camera = CameraSettings::new()
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .with_lens(40.0, 0.5, 5.0)
            .build(1.5)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let mut jittered = false;
        for _ in 0..200 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            let offset = ray.origin() - camera.origin();

            // Origin stays within the lens disk in the (u, v) plane
            assert!(offset.length() < 0.25 + 1e-6);
            assert!(offset.z.abs() < 1e-6);
            jittered |= offset.length() > 1e-3;

            // Every ray through the image center passes through the focus point
            assert!((ray.at(1.0) - Vec3::ZERO).length() < 1e-4);
        }
        assert!(jittered);
    }

    #[test]
    fn test_camera_rejects_degenerate_settings() {
        let coincident = CameraSettings::new().with_position(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert!(coincident.build(1.0).is_err());

        let parallel_up = CameraSettings::new().with_position(Vec3::ZERO, Vec3::Y, Vec3::Y);
        assert!(parallel_up.build(1.0).is_err());

        assert!(CameraSettings::new().build(0.0).is_err());
        assert!(CameraSettings::new().build(f32::NAN).is_err());
        assert!(CameraSettings::new().with_lens(0.0, 0.0, 1.0).build(1.0).is_err());
        assert!(CameraSettings::new().with_lens(90.0, -0.1, 1.0).build(1.0).is_err());
        assert!(CameraSettings::new().with_lens(90.0, 0.0, 0.0).build(1.0).is_err());
    }
}
