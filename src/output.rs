//! Writing captures to disk as PNG files.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use image::{ImageBuffer, Rgba};
use std::path::{Path, PathBuf};

use crate::capture::{CursorImage, Surface};

/// Builds `<prefix>_YYYYMMDD_HHMMSS.png`.
pub fn screenshot_file_name(prefix: &str, timestamp: &DateTime<Local>) -> String {
    format!("{}_{}.png", prefix, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Picks a path in `dir` that does not exist yet, adding `_2`, `_3`, ...
/// when several captures land in the same second.
fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    if !path.exists() {
        return path;
    }
    let stem = file_name.trim_end_matches(".png");
    (2..)
        .map(|n| dir.join(format!("{}_{}.png", stem, n)))
        .find(|p| !p.exists())
        .unwrap_or(path)
}

fn save_image(img: &ImageBuffer<Rgba<u8>, Vec<u8>>, dir: &Path, prefix: &str) -> Result<PathBuf> {
    let file_name = screenshot_file_name(prefix, &Local::now());
    let path = unique_path(dir, &file_name);

    img.save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Saved to {}", path.display());

    Ok(path)
}

/// Saves a window capture as an opaque PNG in `dir`.
pub fn save_png(surface: &Surface, dir: &Path, prefix: &str) -> Result<PathBuf> {
    save_image(&surface.to_rgba_image(), dir, prefix)
}

/// Saves a cursor as a PNG with transparency in `dir`.
pub fn save_cursor_png(cursor: &CursorImage, dir: &Path, prefix: &str) -> Result<PathBuf> {
    save_image(&cursor.to_rgba_image(), dir, prefix)
}
