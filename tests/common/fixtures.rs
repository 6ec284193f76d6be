//! Test fixtures: scratch directories and synthetic images.

use eink_raster::KernelId;
use geink::models::AppConfig;
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Reference panel size
pub const PANEL_WIDTH: u32 = 800;
pub const PANEL_HEIGHT: u32 = 480;

pub fn workspace() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

pub fn config(width: u32, height: u32, levels: u32) -> AppConfig {
    AppConfig::new(width, height, levels, KernelId::FloydSteinberg).expect("valid test config")
}

/// Horizontal gradient, black on the left to white on the right.
pub fn gradient(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, _| {
        Luma([(x * 255 / (width - 1).max(1)) as u8])
    })
}

/// Color photo stand-in with a busy border.
pub fn noisy_photo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 7 + y * 13) % 256) as u8;
        Rgb([v, v.wrapping_mul(3), 255 - v])
    })
}

pub fn write_gray(dir: &Path, name: &str, img: &GrayImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).expect("Failed to write fixture image");
    path
}

pub fn write_rgb(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).expect("Failed to write fixture image");
    path
}

/// A file with an image extension and garbage content.
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\x89PNG but not really").expect("Failed to write corrupt file");
    path
}

pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
