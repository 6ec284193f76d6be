//! Reading and writing raster files.

use crate::error::GeinkError;
use crate::rendering::encode_gray_png;
use eink_raster::GrayBuffer;
use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};

/// Extensions recognized as images, lowercase, without the dot.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    extension(path).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

pub fn is_image_file(path: &Path) -> bool {
    path.is_file() && has_extension(path, IMAGE_EXTENSIONS)
}

/// Image files directly inside `dir` that satisfy `filter`, sorted by path.
pub fn list_images(
    dir: &Path,
    filter: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, GeinkError> {
    let entries = std::fs::read_dir(dir).map_err(|e| GeinkError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| GeinkError::io(dir, e))?.path();
        if is_image_file(&path) && filter(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn open_image(path: &Path) -> Result<DynamicImage, GeinkError> {
    image::open(path).map_err(|e| GeinkError::image(path, e))
}

/// Decode any supported image and convert it to 8-bit luma.
pub fn load_gray(path: &Path) -> Result<GrayBuffer, GeinkError> {
    let luma = open_image(path)?.to_luma8();
    gray_from_image(luma).map_err(Into::into)
}

pub fn gray_from_image(image: GrayImage) -> Result<GrayBuffer, eink_raster::RasterError> {
    let (width, height) = image.dimensions();
    GrayBuffer::new(width as usize, height as usize, image.into_raw())
}

pub fn image_from_gray(gray: &GrayBuffer) -> Result<GrayImage, GeinkError> {
    GrayImage::from_raw(
        gray.width() as u32,
        gray.height() as u32,
        gray.as_slice().to_vec(),
    )
    .ok_or_else(|| {
        GeinkError::Validation(format!(
            "{}x{} buffer does not fit an image",
            gray.width(),
            gray.height()
        ))
    })
}

fn ensure_parent(path: &Path) -> Result<(), GeinkError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| GeinkError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Write a grayscale buffer, choosing the encoder from the extension.
///
/// `.png` goes through the optimizing PNG path; everything else uses the
/// `image` crate's encoder for that format.
pub fn save_gray(gray: &GrayBuffer, path: &Path) -> Result<(), GeinkError> {
    ensure_parent(path)?;
    if extension(path).as_deref() == Some("png") {
        let bytes = encode_gray_png(gray)?;
        return write_bytes(path, &bytes);
    }
    image_from_gray(gray)?
        .save(path)
        .map_err(|e| GeinkError::image(path, e))
}

pub fn save_image(image: &DynamicImage, path: &Path) -> Result<(), GeinkError> {
    ensure_parent(path)?;
    image.save(path).map_err(|e| GeinkError::image(path, e))
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), GeinkError> {
    ensure_parent(path)?;
    std::fs::write(path, bytes).map_err(|e| GeinkError::io(path, e))
}
