//! Unified error type for the eink-raster public API.
//!
//! [`RasterError`] covers every failure the core can report. All of them
//! are deterministic: retrying the same call with the same input fails the
//! same way.

use std::fmt;

/// Coarse classification of a [`RasterError`].
///
/// Callers processing batches use this to decide how to report a failed
/// item; the core itself never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad parameters or malformed input buffers.
    Validation,
    /// A packed artifact disagrees with its declared dimensions.
    SizeMismatch,
}

/// Error type for all eink-raster operations.
///
/// # Example
///
/// ```
/// use eink_raster::{Levels, RasterError};
///
/// let err = Levels::new(3).unwrap_err();
/// assert_eq!(err, RasterError::InvalidLevels(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Level count is not a power of two in `[2, 256]`.
    InvalidLevels(u32),
    /// Bits per pixel outside `1..=8`.
    InvalidBitWidth(u8),
    /// Pack width differs from the bit depth of the buffer's level count.
    BitWidthMismatch {
        /// Requested bits per pixel
        bits: u8,
        /// `log2` of the buffer's level count
        expected: u8,
    },
    /// Width or height is zero.
    EmptyBuffer {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
    },
    /// Dithering method name not present in the kernel table.
    UnknownMethod(String),
    /// Buffer data length does not equal `width * height`.
    DimensionMismatch {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
        /// Actual number of samples supplied
        len: usize,
    },
    /// A level entry does not fit the level count or bit width.
    LevelOutOfRange {
        /// Row-major pixel index of the offending entry
        index: usize,
        /// The offending value
        value: u8,
        /// Exclusive upper bound the value had to respect
        limit: u32,
    },
    /// Packed artifact length disagrees with `ceil(width * height * bits / 8)`.
    SizeMismatch {
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        actual: usize,
    },
}

impl RasterError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RasterError::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            _ => ErrorKind::Validation,
        }
    }
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::InvalidLevels(levels) => write!(
                f,
                "invalid color levels {}: must be a power of 2 between 2 and 256",
                levels
            ),
            RasterError::InvalidBitWidth(bits) => {
                write!(f, "invalid bit width {}: must be between 1 and 8", bits)
            }
            RasterError::BitWidthMismatch { bits, expected } => write!(
                f,
                "bit width {} does not match level buffer depth {}",
                bits, expected
            ),
            RasterError::EmptyBuffer { width, height } => {
                write!(f, "empty image: {}x{}", width, height)
            }
            RasterError::UnknownMethod(name) => {
                write!(f, "unsupported dithering method: {}", name)
            }
            RasterError::DimensionMismatch { width, height, len } => write!(
                f,
                "buffer holds {} samples, expected {}x{}={}",
                len,
                width,
                height,
                width * height
            ),
            RasterError::LevelOutOfRange {
                index,
                value,
                limit,
            } => write!(
                f,
                "level {} at pixel {} out of range (must be < {})",
                value, index, limit
            ),
            RasterError::SizeMismatch { expected, actual } => write!(
                f,
                "artifact size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for RasterError {}
