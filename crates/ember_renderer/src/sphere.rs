//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray, RenderError, RenderResult,
};
use ember_math::{Interval, Vec3};
use std::sync::Arc;

/// A sphere primitive.
///
/// The material is shared by reference so many spheres can use one instance.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// Fails if the radius is negative or not finite.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> RenderResult<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(RenderError::InvalidRadius(radius));
        }

        Ok(Self {
            center,
            radius,
            material,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        // A zero discriminant is a tangent hit and falls through with one root
        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let normal = if self.radius > 0.0 {
            (p - self.center) / self.radius
        } else {
            // A point sphere has no surface direction; face the ray
            -ray.direction().normalize()
        };

        Some(HitRecord {
            t: root,
            p,
            normal,
            material: self.material.as_ref(),
        })
    }
}
