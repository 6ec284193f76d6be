//! EpdEncoder builder, the ergonomic entry point for the crate.
//!
//! [`EpdEncoder`] fixes a level count and kernel once and then dithers,
//! packs or previews any number of images.

use crate::api::RasterError;
use crate::buffer::{GrayBuffer, LevelBuffer};
use crate::dither::{self, KernelId};
use crate::pack::{self, PackedArtifact};
use crate::quantize::Levels;

/// Grayscale encoder for e-ink display controllers.
///
/// # Design
///
/// - Constructor requires validated [`Levels`] (no invalid states)
/// - Configuration methods consume and return `self`
/// - Encoding methods take `&self`, so one encoder can be shared across
///   threads that each process their own images
///
/// # Example
///
/// ```
/// use eink_raster::{EpdEncoder, GrayBuffer, KernelId, Levels};
///
/// let encoder = EpdEncoder::new(Levels::new(4).unwrap()).kernel(KernelId::Stucki);
///
/// let gray = GrayBuffer::filled(8, 2, 128);
/// let packed = encoder.encode(&gray).unwrap();
/// assert_eq!(packed.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpdEncoder {
    levels: Levels,
    kernel: KernelId,
}

impl EpdEncoder {
    /// Create an encoder with Floyd-Steinberg diffusion.
    pub fn new(levels: Levels) -> Self {
        Self {
            levels,
            kernel: KernelId::default(),
        }
    }

    /// Set the diffusion kernel.
    #[inline]
    pub fn kernel(mut self, kernel: KernelId) -> Self {
        self.kernel = kernel;
        self
    }

    #[inline]
    pub fn levels(&self) -> Levels {
        self.levels
    }

    #[inline]
    pub fn kernel_id(&self) -> KernelId {
        self.kernel
    }

    /// Dither `gray` with the configured kernel.
    pub fn dither(&self, gray: &GrayBuffer) -> Result<LevelBuffer, RasterError> {
        dither::dither(gray, self.kernel.kernel(), self.levels)
    }

    /// Dither and pack at `levels.bits_per_pixel()` bits per pixel.
    pub fn encode(&self, gray: &GrayBuffer) -> Result<PackedArtifact, RasterError> {
        let levels = self.dither(gray)?;
        pack::pack(&levels, self.levels.bits_per_pixel())
    }

    /// Nearest-level mapping without diffusion.
    pub fn requantize(&self, gray: &GrayBuffer) -> Result<LevelBuffer, RasterError> {
        dither::requantize(gray, self.levels)
    }

    /// Expand levels back to gray values for viewing on a normal screen.
    ///
    /// Uses the level count stored in `levels`, which need not match the
    /// encoder's own.
    pub fn preview(&self, levels: &LevelBuffer) -> GrayBuffer {
        let lv = levels.levels();
        let data = levels.as_slice().iter().map(|&l| lv.to_gray(l)).collect();
        GrayBuffer::from_parts(levels.width(), levels.height(), data)
    }
}
