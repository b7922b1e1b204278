//! Render settings files.
//!
//! Two formats are accepted:
//!
//! - JSON (`.json`), mirroring [`RenderSettings`] with every field optional
//! - plain text, three whitespace-separated integers: `width height samples`

use ember_math::Vec3;
use ember_renderer::{showcase_camera, CameraSettings, RenderConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected 'width height samples', found {0} value(s)")]
    FieldCount(usize),

    #[error("Invalid number format: {0}")]
    InvalidNumber(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Everything needed to configure one render.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub max_depth: u32,
    pub seed: u64,
    pub camera: CameraFile,
}

impl Default for RenderSettings {
    fn default() -> Self {
        let config = RenderConfig::default();
        Self {
            width: config.image_width,
            height: config.image_height,
            samples: config.samples_per_pixel,
            max_depth: config.max_depth,
            seed: 0,
            camera: CameraFile::default(),
        }
    }
}

impl RenderSettings {
    /// Load settings, picking the format from the file extension.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_plain_text(&contents)
        }
    }

    pub fn from_json(contents: &str) -> SettingsResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Parse `width height samples`; everything else keeps its default.
    pub fn from_plain_text(contents: &str) -> SettingsResult<Self> {
        let fields: Vec<&str> = contents.split_whitespace().collect();
        let [width, height, samples] = fields[..] else {
            return Err(SettingsError::FieldCount(fields.len()));
        };

        let parse = |s: &str| {
            s.parse::<u32>()
                .map_err(|_| SettingsError::InvalidNumber(s.to_string()))
        };

        Ok(Self {
            width: parse(width)?,
            height: parse(height)?,
            samples: parse(samples)?,
            ..Self::default()
        })
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::default()
            .with_resolution(self.width, self.height)
            .with_quality(self.samples, self.max_depth)
    }
}

/// Camera block of a JSON settings file. Defaults frame the demo scene.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraFile {
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    pub vup: [f32; 3],
    pub vfov: f32,
    pub aperture: f32,
    pub focus_dist: f32,
}

impl Default for CameraFile {
    fn default() -> Self {
        let camera = showcase_camera();
        Self {
            look_from: camera.look_from.to_array(),
            look_at: camera.look_at.to_array(),
            vup: camera.vup.to_array(),
            vfov: camera.vfov,
            aperture: camera.aperture,
            focus_dist: camera.focus_dist,
        }
    }
}

impl From<CameraFile> for CameraSettings {
    fn from(file: CameraFile) -> Self {
        CameraSettings::new()
            .with_position(
                Vec3::from_array(file.look_from),
                Vec3::from_array(file.look_at),
                Vec3::from_array(file.vup),
            )
            .with_lens(file.vfov, file.aperture, file.focus_dist)
    }
}
