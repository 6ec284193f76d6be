//! Gray level quantization.
//!
//! Maps a working intensity (an 8-bit gray value plus any diffused error)
//! to the nearest of `L` evenly spaced output levels and reports the
//! residual error that the dithering engine propagates to neighbors.
//!
//! # Rounding
//!
//! Level selection uses [`f32::round`] (half away from zero). Inputs are
//! clamped to `[0, 255]` before rounding, so on the domain where rounding
//! happens this is round-half-up. The same policy is used by
//! [`Levels::to_gray`] and by re-quantization of already-dithered images.

use crate::api::RasterError;

/// A validated output level count.
///
/// Always a power of two in `[2, 256]`, so every level fits in a `u8` and
/// `bits_per_pixel()` is an integer in `1..=8`.
///
/// # Example
///
/// ```
/// use eink_raster::Levels;
///
/// let levels = Levels::new(4).unwrap();
/// assert_eq!(levels.bits_per_pixel(), 2);
/// assert_eq!(levels.to_gray(1), 85);
///
/// assert!(Levels::new(3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Levels(u16);

impl Levels {
    /// 1-bit black and white.
    pub const BW: Levels = Levels(2);

    /// Validate a level count.
    ///
    /// Fails with [`RasterError::InvalidLevels`] unless `count` is a power
    /// of two between 2 and 256 inclusive.
    pub fn new(count: u32) -> Result<Self, RasterError> {
        if (2..=256).contains(&count) && count.is_power_of_two() {
            Ok(Levels(count as u16))
        } else {
            Err(RasterError::InvalidLevels(count))
        }
    }

    /// Number of levels.
    #[inline]
    pub fn count(self) -> u16 {
        self.0
    }

    /// Highest level index, `count - 1`.
    #[inline]
    pub fn max_level(self) -> u8 {
        (self.0 - 1) as u8
    }

    /// Bits needed per pixel, `log2(count)`.
    #[inline]
    pub fn bits_per_pixel(self) -> u8 {
        self.0.trailing_zeros() as u8
    }

    /// Gray distance between adjacent levels, `255 / (count - 1)`.
    #[inline]
    pub fn step(self) -> f32 {
        255.0 / (self.0 - 1) as f32
    }

    /// Expand a level back to an 8-bit gray value for visualization.
    #[inline]
    pub fn to_gray(self, level: u8) -> u8 {
        (level.min(self.max_level()) as f32 * self.step())
            .round()
            .clamp(0.0, 255.0) as u8
    }
}

impl Default for Levels {
    fn default() -> Self {
        Levels::BW
    }
}

impl TryFrom<u32> for Levels {
    type Error = RasterError;

    fn try_from(count: u32) -> Result<Self, Self::Error> {
        Levels::new(count)
    }
}

/// Quantize a working value to the nearest level.
///
/// `value` may lie outside `[0, 255]` when it carries accumulated
/// diffusion error. Returns `(level, residual)` where
/// `residual = value - level * step`, computed from the unclamped value.
///
/// ```text
/// step  = 255 / (L - 1)
/// level = round(clamp(value, 0, 255) / step)   clamped to [0, L-1]
/// ```
#[inline]
pub fn quantize(value: f32, levels: Levels) -> (u8, f32) {
    let step = levels.step();
    let level = (value.clamp(0.0, 255.0) / step)
        .round()
        .clamp(0.0, levels.max_level() as f32) as u8;
    let quantized = level as f32 * step;
    (level, value - quantized)
}
