//! Full-frame geometric preparation of photos for a fixed-size panel.
//!
//! The frame is brought to the panel's aspect ratio, then resized and
//! converted to gray:
//!
//! 1. Solid border (low color variance along the edges): pad with the most
//!    common corner color, keeping the whole picture.
//! 2. Anything else: center-crop to the ratio.
//! 3. Lanczos3 resize to the target size. Portrait frames (width < height)
//!    use the target with width and height swapped.

use crate::error::GeinkError;
use crate::models::AppConfig;
use eink_raster::GrayBuffer;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

/// Mean squared color distance from the border average below which the
/// border counts as solid.
pub const SOLID_BORDER_TOLERANCE: f64 = 30.0;

/// Aspect ratios closer than this are left untouched.
pub const RATIO_TOLERANCE: f64 = 0.01;

/// Target aspect ratio for a `width x height` frame.
///
/// Landscape and square frames use `target_w / target_h`, portrait frames
/// the inverse.
pub fn target_ratio(width: u32, height: u32, target_w: u32, target_h: u32) -> f64 {
    if width >= height {
        target_w as f64 / target_h as f64
    } else {
        target_h as f64 / target_w as f64
    }
}

/// Most common of the four corner colors. Ties go to the earliest corner
/// in top-left, top-right, bottom-left, bottom-right order.
pub fn background_color(img: &RgbImage) -> Rgb<u8> {
    let (w, h) = img.dimensions();
    let corners = [
        *img.get_pixel(0, 0),
        *img.get_pixel(w - 1, 0),
        *img.get_pixel(0, h - 1),
        *img.get_pixel(w - 1, h - 1),
    ];
    let mut best = corners[0];
    let mut best_count = 0;
    for candidate in corners {
        let count = corners.iter().filter(|&&c| c == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

fn border_pixels(img: &RgbImage) -> Vec<Rgb<u8>> {
    let (w, h) = img.dimensions();
    let mut pixels = Vec::with_capacity(2 * (w + h) as usize);
    for x in 0..w {
        pixels.push(*img.get_pixel(x, 0));
        pixels.push(*img.get_pixel(x, h - 1));
    }
    for y in 0..h {
        pixels.push(*img.get_pixel(0, y));
        pixels.push(*img.get_pixel(w - 1, y));
    }
    pixels
}

/// True when the edge pixels are close to a single color.
///
/// Variance is the mean over edge pixels of the squared RGB distance to
/// the edge average.
pub fn is_solid_border(img: &RgbImage, tolerance: f64) -> bool {
    let pixels = border_pixels(img);
    if pixels.is_empty() {
        return true;
    }
    let n = pixels.len() as f64;
    let mut mean = [0f64; 3];
    for p in &pixels {
        for (m, &c) in mean.iter_mut().zip(p.0.iter()) {
            *m += c as f64;
        }
    }
    mean.iter_mut().for_each(|m| *m /= n);

    let variance = pixels
        .iter()
        .map(|p| {
            p.0.iter()
                .zip(mean.iter())
                .map(|(&c, &m)| (c as f64 - m).powi(2))
                .sum::<f64>()
        })
        .sum::<f64>()
        / n;
    variance < tolerance
}

/// Pad to the target ratio with the background color, centering the
/// original.
pub fn pad_to_ratio(img: &RgbImage, target_w: u32, target_h: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let ratio = target_ratio(w, h, target_w, target_h);
    let current = w as f64 / h as f64;
    if (current - ratio).abs() < RATIO_TOLERANCE {
        return img.clone();
    }

    let (new_w, new_h) = if current > ratio {
        (w, ((w as f64 / ratio).round() as u32).max(h))
    } else {
        (((h as f64 * ratio).round() as u32).max(w), h)
    };
    let mut canvas = RgbImage::from_pixel(new_w, new_h, background_color(img));
    let left = (new_w - w) / 2;
    let top = (new_h - h) / 2;
    imageops::replace(&mut canvas, img, left as i64, top as i64);
    canvas
}

/// Center-crop to `ratio` (width / height).
pub fn crop_to_ratio(img: &RgbImage, ratio: f64) -> RgbImage {
    let (w, h) = img.dimensions();
    let current = w as f64 / h as f64;
    if (current - ratio).abs() < RATIO_TOLERANCE {
        return img.clone();
    }

    let (left, top, new_w, new_h) = if current > ratio {
        let new_w = ((h as f64 * ratio).round() as u32).clamp(1, w);
        ((w - new_w) / 2, 0, new_w, h)
    } else {
        let new_h = ((w as f64 / ratio).round() as u32).clamp(1, h);
        (0, (h - new_h) / 2, w, new_h)
    };
    imageops::crop_imm(img, left, top, new_w, new_h).to_image()
}

/// Lanczos3 resize to the target, swapping width and height for portrait
/// frames.
pub fn resize_to_target(img: &RgbImage, target_w: u32, target_h: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let (out_w, out_h) = if w >= h {
        (target_w, target_h)
    } else {
        (target_h, target_w)
    };
    imageops::resize(img, out_w, out_h, FilterType::Lanczos3)
}

/// Run the full preparation on a decoded image.
pub fn preprocess_image(img: &DynamicImage, config: &AppConfig) -> Result<GrayBuffer, GeinkError> {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    if w == 0 || h == 0 {
        return Err(GeinkError::Validation(format!("empty image: {w}x{h}")));
    }
    let (tw, th) = (config.width(), config.height());

    let framed = if is_solid_border(&rgb, SOLID_BORDER_TOLERANCE) {
        tracing::debug!("Solid background, padding to target ratio");
        pad_to_ratio(&rgb, tw, th)
    } else {
        tracing::debug!("Busy background, cropping to target ratio");
        crop_to_ratio(&rgb, target_ratio(w, h, tw, th))
    };
    tracing::debug!(
        original = %format_args!("{w}x{h}"),
        framed = %format_args!("{}x{}", framed.width(), framed.height()),
        "Framed image"
    );

    let resized = resize_to_target(&framed, tw, th);
    let gray = imageops::grayscale(&resized);
    let (gw, gh) = gray.dimensions();
    GrayBuffer::new(gw as usize, gh as usize, gray.into_raw()).map_err(Into::into)
}
