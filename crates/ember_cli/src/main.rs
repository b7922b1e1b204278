//! Ember command line renderer.
//!
//! Builds the demo scene, renders it and writes the result to disk.

mod output;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use ember_renderer::{random_scene, render, render_parallel, CameraSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use settings::RenderSettings;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "ember", version, about = "A Monte Carlo path tracer for spheres")]
struct Args {
    /// Settings file (.json, or plain text "width height samples")
    #[arg(short = 'f', long)]
    settings: Option<PathBuf>,

    /// Output image; .ppm writes plain-text PPM, other extensions use their image format
    #[arg(short, long, default_value = "result.ppm")]
    output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    samples: Option<u32>,

    /// Seed for the scene layout and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Number of worker threads (defaults to all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Render on the calling thread only
    #[arg(long)]
    single_threaded: bool,
}

impl Args {
    fn apply_overrides(&self, settings: &mut RenderSettings) {
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(samples) = self.samples {
            settings.samples = samples;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => RenderSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => RenderSettings::default(),
    };
    args.apply_overrides(&mut settings);
    log::debug!("Settings: {settings:?}");

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring the worker pool")?;
    }

    let config = settings.render_config();
    config.validate().context("invalid render settings")?;
    let camera = CameraSettings::from(settings.camera)
        .build(config.aspect_ratio())
        .context("invalid camera settings")?;

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let world = random_scene(&mut rng)?;
    log::info!("Scene built in {:?}", start.elapsed());

    let image = if args.single_threaded {
        render(&camera, &world, &config, &mut rng)?
    } else {
        render_parallel(&camera, &world, &config, settings.seed)?
    };

    output::save_image(&image, &args.output)
}
