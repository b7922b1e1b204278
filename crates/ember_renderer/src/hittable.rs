//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Ray};
use ember_math::{Interval, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Outward unit normal of the surface at `p`
    ///
    /// This is not flipped to face the ray; materials that care about the
    /// side of the surface compare it against the incoming direction.
    pub normal: Vec3,
    /// Material of the struck surface
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Whether `ray` arrives from the side the normal points to.
    #[inline]
    pub fn is_front_face(&self, ray: &Ray) -> bool {
        ray.direction().dot(self.normal) <= 0.0
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object with `t` strictly inside `ray_t`.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;
}

/// A list of hittable objects, itself hittable as one composite surface.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl FromIterator<Box<dyn Hittable>> for HittableList {
    fn from_iter<I: IntoIterator<Item = Box<dyn Hittable>>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            // Only accept hits nearer than the best one so far
            let max = closest.map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(max)) {
                closest = Some(rec);
            }
        }

        closest
    }
}
