//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a bounce cap
//! - Sky gradient as the only light source
//! - Anti-aliasing via multi-sampling
//! - Gamma correction on output

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::{gen_f32, Camera, Color, Hittable, Ray, RenderError, RenderResult};
use ember_math::Interval;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Output image width in pixels
    pub image_width: u32,
    /// Output image height in pixels
    pub image_height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Near bound for accepted hits, avoids shadow acne
    pub t_min: f32,
    /// Far bound for accepted hits
    pub t_max: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 200,
            image_height: 100,
            samples_per_pixel: 100,
            max_depth: 50,
            t_min: 0.001,
            t_max: f32::INFINITY,
        }
    }
}

impl RenderConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.image_width as f32 / self.image_height as f32
    }

    /// Check the configuration before rendering.
    pub fn validate(&self) -> RenderResult<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(RenderError::InvalidImageSize {
                width: self.image_width,
                height: self.image_height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::ZeroSamples);
        }
        if self.max_depth == 0 {
            return Err(RenderError::ZeroDepth);
        }
        let (min, max) = (self.t_min, self.t_max);
        if min.is_nan() || max.is_nan() || min < 0.0 || min >= max {
            return Err(RenderError::InvalidRayInterval {
                min: self.t_min,
                max: self.t_max,
            });
        }
        Ok(())
    }

    fn ray_interval(&self) -> Interval {
        Interval::new(self.t_min, self.t_max)
    }
}

/// Compute the color seen by a ray.
///
/// Each bounce multiplies by the surface attenuation. Paths end at the
/// sky (a miss), at an absorbing surface, or at `max_depth` bounces; the
/// last two contribute black.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = world.hit(ray, config.ray_interval()) else {
        return sky_color(ray);
    };

    if depth >= config.max_depth {
        return Color::ZERO;
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            result.attenuation * ray_color(&result.scattered, world, depth + 1, config, rng)
        }
        None => Color::ZERO,
    }
}

/// Vertical white-to-blue gradient seen by rays that escape the scene.
pub fn sky_color(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let to_byte = |c: f32| (255.99 * Interval::UNIT.clamp(linear_to_gamma(c))) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Render a single pixel with multi-sampling.
///
/// `y` counts rows from the top of the image. Pixels outside the configured
/// image and configs with zero samples yield black; use
/// [`RenderConfig::validate`] to reject the latter up front.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    if x >= config.image_width || y >= config.image_height || config.samples_per_pixel == 0 {
        return Color::ZERO;
    }

    // The image plane's t axis points up
    let row = (config.image_height - 1 - y) as f32;
    let width = config.image_width as f32;
    let height = config.image_height as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (x as f32 + gen_f32(rng)) / width;
        let t = (row + gen_f32(rng)) / height;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, world, 0, config, rng);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f32
}

/// Linear color image, row-major with the top row first.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Gamma-corrected 8-bit RGB triples in output order.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Render the entire scene to an image buffer on the calling thread.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> RenderResult<ImageBuffer> {
    config.validate()?;
    log::info!(
        "Rendering {}x{} @ {} spp",
        config.image_width,
        config.image_height,
        config.samples_per_pixel
    );
    let start = Instant::now();

    let mut image = ImageBuffer::new(config.image_width, config.image_height);
    for y in 0..config.image_height {
        for x in 0..config.image_width {
            let color = render_pixel(camera, world, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(image)
}

/// Render the scene in parallel, one rayon task per bucket.
///
/// Each bucket draws from its own generator seeded from `seed` and the
/// bucket's position, so the output depends only on the seed and not on
/// thread scheduling.
pub fn render_parallel(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    seed: u64,
) -> RenderResult<ImageBuffer> {
    config.validate()?;
    let buckets = generate_buckets(config.image_width, config.image_height, DEFAULT_BUCKET_SIZE);
    log::info!(
        "Rendering {}x{} @ {} spp in {} buckets",
        config.image_width,
        config.image_height,
        config.samples_per_pixel,
        buckets.len()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(bucket_seed(seed, bucket.x, bucket.y));
            let pixels = render_bucket(bucket, camera, world, config, &mut rng);
            log::debug!(
                "Bucket {} done ({}x{} at {},{})",
                bucket.index,
                bucket.width,
                bucket.height,
                bucket.x,
                bucket.y
            );
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(config.image_width, config.image_height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(image)
}

/// Mix the render seed with a bucket origin into an independent stream seed.
fn bucket_seed(seed: u64, x: u32, y: u32) -> u64 {
    // splitmix64 finalizer
    let mut z = seed ^ (((x as u64) << 32) | y as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraSettings, HittableList, Lambertian, Material, Metal, Sphere, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn lambertian(albedo: Color) -> Arc<dyn Material> {
        Arc::new(Lambertian::new(albedo).unwrap())
    }

    fn single_sphere_world(material: Arc<dyn Material>) -> HittableList {
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(Vec3::ZERO, 0.5, material).unwrap()));
        world
    }

    fn front_camera(aspect_ratio: f32) -> Camera {
        CameraSettings::new()
            .with_position(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y)
            .with_lens(90.0, 0.0, 3.0)
            .build(aspect_ratio)
            .unwrap()
    }

    #[test]
    fn test_sky_gradient() {
        let up_color = sky_color(&Ray::new(Vec3::ZERO, Vec3::Y));
        let down_color = sky_color(&Ray::new(Vec3::ZERO, Vec3::NEG_Y));
        let level = sky_color(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -7.0)));

        assert!((up_color - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((down_color - Color::ONE).length() < 1e-6);
        assert!((level - Color::new(0.75, 0.85, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(4.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.25, 0.0, 1.0)), [127, 0, 255]);
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());
        assert_eq!(
            RenderConfig::default().with_resolution(0, 10).validate(),
            Err(RenderError::InvalidImageSize { width: 0, height: 10 })
        );
        assert_eq!(
            RenderConfig::default().with_quality(0, 50).validate(),
            Err(RenderError::ZeroSamples)
        );
        assert_eq!(
            RenderConfig::default().with_quality(4, 0).validate(),
            Err(RenderError::ZeroDepth)
        );
        let inverted = RenderConfig {
            t_min: 1.0,
            t_max: 0.5,
            ..RenderConfig::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_miss_returns_sky() {
        let world = HittableList::new();
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.3, 0.4, -1.0));

        assert_eq!(ray_color(&ray, &world, 0, &config, &mut rng), sky_color(&ray));
    }

    #[test]
    fn test_depth_cap_between_mirrors() {
        // Two perfect mirrors facing each other across the x axis
        let mirror: Arc<dyn Material> = Arc::new(Metal::new(Color::ONE, 0.0).unwrap());
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0, mirror.clone()).unwrap()));
        world.add(Box::new(Sphere::new(Vec3::new(-2.0, 0.0, 0.0), 1.0, mirror).unwrap()));

        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray_color(&ray, &world, 0, &config, &mut rng), Color::ZERO);

        // Already at the cap: the first hit contributes nothing
        assert_eq!(ray_color(&ray, &world, 50, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_energy_does_not_increase() {
        let ground = Arc::new(Lambertian::new(Color::splat(0.9)).unwrap());
        let brass = Arc::new(Metal::new(Color::new(1.0, 0.8, 0.6), 0.3).unwrap());
        let white = Arc::new(Lambertian::new(Color::ONE).unwrap());

        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, ground).unwrap()));
        world.add(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, brass).unwrap()));
        world.add(Box::new(Sphere::new(Vec3::new(1.0, 0.0, -1.0), 0.5, white).unwrap()));

        let camera = CameraSettings::new().build(2.0).unwrap();
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..2000 {
            let ray = camera.get_ray(gen_f32(&mut rng), gen_f32(&mut rng), &mut rng);
            let color = ray_color(&ray, &world, 0, &config, &mut rng);
            assert!(color.max_element() <= 1.0 + 1e-5, "color = {color}");
            assert!(color.min_element() >= 0.0);
        }
    }

    #[test]
    fn test_center_hits_and_corner_sees_sky() {
        let world = single_sphere_world(lambertian(Color::splat(0.5)));
        let camera = front_camera(1.0);
        let config = RenderConfig::default().with_resolution(9, 9).with_quality(1, 50);
        let mut rng = StdRng::seed_from_u64(42);

        let center = camera.get_ray(0.5, 0.5, &mut rng);
        assert!(world.hit(&center, Interval::new(0.001, f32::INFINITY)).is_some());
        let color = ray_color(&center, &world, 0, &config, &mut rng);
        assert!(color.z < 1.0, "center ray should not see pure sky: {color}");

        let corner = camera.get_ray(0.0, 1.0, &mut rng);
        assert!(world.hit(&corner, Interval::new(0.001, f32::INFINITY)).is_none());
        assert_eq!(ray_color(&corner, &world, 0, &config, &mut rng), sky_color(&corner));
    }

    #[test]
    fn test_render_single_sphere() {
        let world = single_sphere_world(lambertian(Color::splat(0.5)));
        let camera = front_camera(1.0);
        let config = RenderConfig::default().with_resolution(9, 9).with_quality(1, 50);
        let mut rng = StdRng::seed_from_u64(42);

        let image = render(&camera, &world, &config, &mut rng).unwrap();
        assert_eq!(image.pixels.len(), 81);

        // Sky keeps the blue channel at exactly 1; the gray sphere cannot
        assert!((image.get(0, 0).z - 1.0).abs() < 1e-6);
        assert!((image.get(8, 8).z - 1.0).abs() < 1e-6);
        assert!(image.get(4, 4).z < 1.0);

        // Top row looks further up into the sky, so it is bluer than the bottom row
        assert!(image.get(0, 0).x < image.get(0, 8).x);
    }

    #[test]
    fn test_render_rejects_invalid_config() {
        let world = HittableList::new();
        let camera = front_camera(1.0);
        let mut rng = StdRng::seed_from_u64(42);
        let config = RenderConfig::default().with_quality(0, 50);

        let result = render(&camera, &world, &config, &mut rng);
        assert_eq!(result.err(), Some(RenderError::ZeroSamples));
    }

    #[test]
    fn test_more_samples_reduce_variance() {
        let world = single_sphere_world(lambertian(Color::splat(0.5)));
        let camera = front_camera(1.0);
        let mut rng = StdRng::seed_from_u64(42);

        // Pixel straddling the sphere silhouette
        let variance = |spp: u32, rng: &mut StdRng| {
            let config = RenderConfig::default().with_resolution(8, 8).with_quality(spp, 50);
            let estimates: Vec<f32> = (0..64)
                .map(|_| render_pixel(&camera, &world, 3, 3, &config, &mut *rng).x)
                .collect();
            let mean = estimates.iter().sum::<f32>() / estimates.len() as f32;
            estimates.iter().map(|e| (e - mean).powi(2)).sum::<f32>() / estimates.len() as f32
        };

        let low = variance(1, &mut rng);
        let high = variance(64, &mut rng);
        assert!(high < low, "variance with 64 spp ({high}) should be below 1 spp ({low})");
    }

    #[test]
    fn test_render_parallel_is_deterministic() {
        let _ = env_logger::builder().is_test(true).try_init();

        let world = single_sphere_world(lambertian(Color::new(0.8, 0.3, 0.3)));
        let camera = front_camera(1.5);
        let config = RenderConfig::default().with_resolution(96, 64).with_quality(2, 10);

        let a = render_parallel(&camera, &world, &config, 7).unwrap();
        let b = render_parallel(&camera, &world, &config, 7).unwrap();

        assert_eq!(a.pixels, b.pixels);
        assert!((a.get(0, 0).z - 1.0).abs() < 1e-6);
        assert!(a.get(48, 32).z < 1.0);
    }

    #[test]
    fn test_render_pixel_degenerate_inputs_are_black() {
        let world = single_sphere_world(lambertian(Color::splat(0.5)));
        let camera = front_camera(1.0);
        let mut rng = StdRng::seed_from_u64(42);

        let no_rows = RenderConfig::default().with_resolution(4, 0);
        assert_eq!(render_pixel(&camera, &world, 0, 0, &no_rows, &mut rng), Color::ZERO);

        let no_samples = RenderConfig::default().with_resolution(4, 4).with_quality(0, 50);
        let color = render_pixel(&camera, &world, 1, 1, &no_samples, &mut rng);
        assert_eq!(color, Color::ZERO);

        let config = RenderConfig::default().with_resolution(4, 4);
        assert_eq!(render_pixel(&camera, &world, 0, 4, &config, &mut rng), Color::ZERO);
        assert_eq!(render_pixel(&camera, &world, 4, 0, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_to_rgb8_layout() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(1, 0, Color::ONE);

        assert_eq!(image.to_rgb8(), vec![0, 0, 0, 255, 255, 255]);
    }
}
