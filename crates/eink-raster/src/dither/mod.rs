//! Error diffusion dithering for grayscale e-ink output.
//!
//! # Algorithms
//!
//! Three diffusion kernels are available through [`KernelId`]:
//!
//! - **Floyd-Steinberg**: classic 4-neighbor kernel (default)
//! - **Jarvis-Judice-Ninke**: 12 neighbors over 3 rows, smoother gradients
//! - **Stucki**: JJN footprint with sharper center weights
//!
//! # Scan Order
//!
//! The scan is a single left-to-right, top-to-bottom sweep. Every pixel's
//! working value depends on all earlier pixels that diffuse into it, so one
//! image cannot be split across threads without changing the output.
//! Independent images can be dithered in parallel freely.
//!
//! # Example
//!
//! ```
//! use eink_raster::{dither, GrayBuffer, KernelId, Levels};
//!
//! let gray = GrayBuffer::new(2, 2, vec![0, 255, 128, 64]).unwrap();
//! let result = dither(&gray, KernelId::FloydSteinberg.kernel(), Levels::BW).unwrap();
//! assert_eq!(result.as_slice(), &[0, 1, 1, 0]);
//! ```

mod kernel;

pub use kernel::*;

use std::fmt;
use std::str::FromStr;

use crate::api::RasterError;
use crate::buffer::{GrayBuffer, LevelBuffer};
use crate::quantize::{quantize, Levels};

/// Diffusion kernel selection.
///
/// The closed set of kernels the engine supports. [`KernelId::kernel`] is
/// the single point mapping an identifier to its weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KernelId {
    /// Floyd-Steinberg (4 taps, divisor 16).
    #[default]
    FloydSteinberg,

    /// Jarvis-Judice-Ninke (12 taps, divisor 48).
    JarvisJudiceNinke,

    /// Stucki (12 taps, divisor 42).
    Stucki,
}

impl KernelId {
    /// Every supported kernel, in CLI listing order.
    pub const ALL: [KernelId; 3] = [
        KernelId::FloydSteinberg,
        KernelId::JarvisJudiceNinke,
        KernelId::Stucki,
    ];

    /// The kernel's weight table.
    pub fn kernel(self) -> &'static Kernel {
        match self {
            KernelId::FloydSteinberg => &FLOYD_STEINBERG,
            KernelId::JarvisJudiceNinke => &JARVIS_JUDICE_NINKE,
            KernelId::Stucki => &STUCKI,
        }
    }

    /// Canonical method name as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            KernelId::FloydSteinberg => "floyd_steinberg",
            KernelId::JarvisJudiceNinke => "jarvis_judice_ninke",
            KernelId::Stucki => "stucki",
        }
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelId {
    type Err = RasterError;

    /// Parse a method name. Case-insensitive; `-` is accepted for `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        KernelId::ALL
            .into_iter()
            .find(|id| id.name() == normalized)
            .ok_or_else(|| RasterError::UnknownMethod(s.to_string()))
    }
}

/// Look up a kernel by method name.
///
/// Fails with [`RasterError::UnknownMethod`] for unrecognized names.
pub fn lookup(name: &str) -> Result<&'static Kernel, RasterError> {
    name.parse::<KernelId>().map(KernelId::kernel)
}

/// Error buffer for efficient error diffusion.
///
/// Manages a sliding window of error rows, storing only the rows that
/// the diffusion kernel can reach (determined by `max_dy`). Lives for a
/// single [`dither`] call.
///
/// # Usage Pattern
///
/// 1. Create buffer with `new(width, row_depth)`
/// 2. For each row:
///    a. Read accumulated error with `get_accumulated(x)`
///    b. After processing pixel, distribute error with `add_error(x, dy, error)`
///    c. After row complete, call `advance_row()`
#[derive(Debug)]
pub struct ErrorBuffer {
    /// Error rows: rows[0] is current row, rows[1] is next, etc.
    rows: Vec<Vec<f32>>,
    width: usize,
}

impl ErrorBuffer {
    /// Create a new error buffer.
    ///
    /// * `width` - Image width in pixels
    /// * `row_depth` - Number of rows to track (kernel's `max_dy + 1`)
    pub fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: (0..row_depth).map(|_| vec![0.0; width]).collect(),
            width,
        }
    }

    /// Accumulated error for a pixel in the current row.
    #[inline]
    pub fn get_accumulated(&self, x: usize) -> f32 {
        self.rows[0][x]
    }

    /// Add error to a pixel `row_offset` rows below the current one.
    ///
    /// Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn add_error(&mut self, x: usize, row_offset: usize, error: f32) {
        if x < self.width && row_offset < self.rows.len() {
            self.rows[row_offset][x] += error;
        }
    }

    /// Advance to the next row.
    ///
    /// The first row is discarded, subsequent rows shift forward, and a
    /// new zeroed row is added at the end.
    pub fn advance_row(&mut self) {
        // Rotate left: [0,1,2] -> [1,2,0]
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill(0.0);
        }
    }
}

/// Dither a gray buffer to `levels` output levels.
///
/// For each pixel in raster order: add the accumulated error to the
/// original sample, [`quantize`] it, store the level, and push
/// `residual * weight / divisor` into every in-bounds kernel target.
/// Targets outside the image are dropped; their share of the error is
/// lost rather than redistributed.
///
/// Fails with [`RasterError::EmptyBuffer`] if width or height is zero.
pub fn dither(
    gray: &GrayBuffer,
    kernel: &Kernel,
    levels: Levels,
) -> Result<LevelBuffer, RasterError> {
    let (width, height) = (gray.width(), gray.height());
    if gray.is_empty() {
        return Err(RasterError::EmptyBuffer { width, height });
    }

    let image = gray.as_slice();
    let mut output = vec![0u8; width * height];
    let mut error_buf = ErrorBuffer::new(width, kernel.max_dy + 1);
    let divisor = kernel.divisor as f32;

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let value = image[idx] as f32 + error_buf.get_accumulated(x);

            let (level, residual) = quantize(value, levels);
            output[idx] = level;

            for &(dx, dy, weight) in kernel.entries {
                let nx = x as i32 + dx;
                if nx >= 0 && (nx as usize) < width {
                    let ny = y + dy as usize;
                    if ny < height {
                        error_buf.add_error(
                            nx as usize,
                            dy as usize,
                            residual * weight as f32 / divisor,
                        );
                    }
                }
            }
        }

        error_buf.advance_row();
    }

    Ok(LevelBuffer::from_parts(width, height, levels, output))
}

/// Dither with an unvalidated level count.
///
/// Validates `levels` before any pixel is read, failing with
/// [`RasterError::InvalidLevels`], then behaves like [`dither`].
pub fn dither_raw(
    gray: &GrayBuffer,
    kernel: KernelId,
    levels: u32,
) -> Result<LevelBuffer, RasterError> {
    let levels = Levels::new(levels)?;
    dither(gray, kernel.kernel(), levels)
}

/// Map every sample to its nearest level without diffusing error.
///
/// Used for inputs that are already dithered, where each sample sits on
/// (or near, after lossy compression) a level value.
pub fn requantize(gray: &GrayBuffer, levels: Levels) -> Result<LevelBuffer, RasterError> {
    if gray.is_empty() {
        return Err(RasterError::EmptyBuffer {
            width: gray.width(),
            height: gray.height(),
        });
    }
    let data = gray
        .as_slice()
        .iter()
        .map(|&v| quantize(v as f32, levels).0)
        .collect();
    Ok(LevelBuffer::from_parts(
        gray.width(),
        gray.height(),
        levels,
        data,
    ))
}
