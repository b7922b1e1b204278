//! Procedural demo scene: a field of small random spheres around three
//! large showcase spheres.

use crate::{
    gen_f32, CameraSettings, Color, Dielectric, HittableList, Lambertian, Material, Metal,
    RenderResult, Sphere, Vec3,
};
use rand::RngCore;
use std::sync::Arc;

/// Small spheres are placed on cells in [-GRID_HALF_EXTENT, GRID_HALF_EXTENT).
const GRID_HALF_EXTENT: i32 = 11;
const SMALL_RADIUS: f32 = 0.2;
const GLASS_IOR: f32 = 1.5;

/// Build the randomized demo scene.
pub fn random_scene(rng: &mut dyn RngCore) -> RenderResult<HittableList> {
    let mut world = HittableList::new();

    // Ground
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))?),
    )?));

    // Glass is colorless, so every small glass sphere shares one instance
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(GLASS_IOR)?);
    let clearing = Vec3::new(4.0, SMALL_RADIUS, 0.0);

    for a in -GRID_HALF_EXTENT..GRID_HALF_EXTENT {
        for b in -GRID_HALF_EXTENT..GRID_HALF_EXTENT {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                SMALL_RADIUS,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - clearing).length() <= 0.9 {
                continue;
            }

            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                // Diffuse
                let albedo = Color::new(
                    gen_f32(rng) * gen_f32(rng),
                    gen_f32(rng) * gen_f32(rng),
                    gen_f32(rng) * gen_f32(rng),
                );
                Arc::new(Lambertian::new(albedo)?)
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = Color::new(
                    0.5 * (1.0 + gen_f32(rng)),
                    0.5 * (1.0 + gen_f32(rng)),
                    0.5 * (1.0 + gen_f32(rng)),
                );
                let fuzz = 0.5 * gen_f32(rng);
                Arc::new(Metal::new(albedo, fuzz)?)
            } else {
                glass.clone()
            };

            world.add(Box::new(Sphere::new(center, SMALL_RADIUS, material)?));
        }
    }

    // Three main spheres
    world.add(Box::new(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass)?));
    world.add(Box::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))?),
    )?));
    world.add(Box::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)?),
    )?));

    log::info!("Built demo scene with {} spheres", world.len());
    Ok(world)
}

/// Camera framing the demo scene from a low angle with slight defocus.
pub fn showcase_camera() -> CameraSettings {
    CameraSettings::new()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0)
}
