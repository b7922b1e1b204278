//! Image encoders for finished renders.

use anyhow::{Context, Result};
use ember_renderer::{color_to_rgb8, ImageBuffer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Save an image, choosing the encoder from the file extension.
///
/// `.ppm` is written as plain-text P3; anything else goes through the
/// `image` crate (PNG, JPEG, ...).
pub fn save_image(image: &ImageBuffer, path: &Path) -> Result<()> {
    let is_ppm = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_ppm(image, &mut writer)?;
        writer.flush()?;
    } else {
        let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
            .context("image buffer does not match its dimensions")?;
        rgb.save(path)
            .with_context(|| format!("encoding {}", path.display()))?;
    }

    log::info!("Saved to {}", path.display());
    Ok(())
}

/// Write a plain-text PPM: header, then one `r g b` line per pixel from the
/// top row down.
pub fn write_ppm<W: Write>(image: &ImageBuffer, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for color in &image.pixels {
        let [r, g, b] = color_to_rgb8(*color);
        writeln!(writer, "{r} {g} {b}")?;
    }

    Ok(())
}
