//! Variable bit-depth packing of level buffers.
//!
//! # Layout
//!
//! Pixels are written in row-major order, `b` bits each, most significant
//! bit first, with no padding between rows. Only the last byte of the
//! artifact may hold unused bits, and those are zero. The artifact length
//! is therefore always
//!
//! ```text
//! ceil(width * height * b / 8)
//! ```
//!
//! For 800x480 this is 48 000 bytes at 1 bit and 96 000 bytes at 2 bits.

mod bitstream;

use crate::api::RasterError;
use crate::buffer::LevelBuffer;
use crate::quantize::Levels;
use bitstream::{BitReader, BitWriter};

/// A packed raster ready to be written to a display controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedArtifact {
    bytes: Vec<u8>,
    width: usize,
    height: usize,
    bits: u8,
}

impl PackedArtifact {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bits per pixel.
    #[inline]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

/// Byte length of a packed `width x height` raster at `bits` per pixel.
pub fn packed_len(width: usize, height: usize, bits: u8) -> usize {
    (width * height * bits as usize).div_ceil(8)
}

fn check_bits(bits: u8) -> Result<(), RasterError> {
    if (1..=8).contains(&bits) {
        Ok(())
    } else {
        Err(RasterError::InvalidBitWidth(bits))
    }
}

/// Pack level indices at `bits` per pixel.
///
/// `bits` must equal `levels.levels().bits_per_pixel()`, so that
/// [`unpack`] at the same width restores an identical buffer.
///
/// # Errors
///
/// - [`RasterError::InvalidBitWidth`] if `bits` is outside `1..=8`
/// - [`RasterError::BitWidthMismatch`] if `bits` differs from the buffer depth
/// - [`RasterError::LevelOutOfRange`] for the first entry `>= 2^bits`
///
/// # Example
///
/// ```
/// use eink_raster::{pack, LevelBuffer, Levels};
///
/// let levels = LevelBuffer::new(4, 1, Levels::new(4).unwrap(), vec![3, 0, 1, 2]).unwrap();
/// let artifact = pack(&levels, 2).unwrap();
/// assert_eq!(artifact.as_bytes(), &[0b1100_0110]);
/// ```
pub fn pack(levels: &LevelBuffer, bits: u8) -> Result<PackedArtifact, RasterError> {
    check_bits(bits)?;
    let expected = levels.levels().bits_per_pixel();
    if bits != expected {
        return Err(RasterError::BitWidthMismatch { bits, expected });
    }
    let limit = 1u32 << bits;
    if let Some((index, &value)) = levels
        .as_slice()
        .iter()
        .enumerate()
        .find(|&(_, &v)| v as u32 >= limit)
    {
        return Err(RasterError::LevelOutOfRange {
            index,
            value,
            limit,
        });
    }

    let len = packed_len(levels.width(), levels.height(), bits);
    let mut writer = BitWriter::with_capacity(len);
    for &value in levels.as_slice() {
        writer.write(value, bits);
    }
    let bytes = writer.finish();
    debug_assert_eq!(bytes.len(), len);

    Ok(PackedArtifact {
        bytes,
        width: levels.width(),
        height: levels.height(),
        bits,
    })
}

/// Recover level indices from a packed artifact.
///
/// The returned buffer is tagged with `2^bits` levels.
///
/// # Errors
///
/// - [`RasterError::InvalidBitWidth`] if `bits` is outside `1..=8`
/// - [`RasterError::EmptyBuffer`] if either dimension is zero
/// - [`RasterError::SizeMismatch`] if `bytes.len()` is not exactly
///   [`packed_len`]
pub fn unpack(
    bytes: &[u8],
    width: usize,
    height: usize,
    bits: u8,
) -> Result<LevelBuffer, RasterError> {
    check_bits(bits)?;
    if width == 0 || height == 0 {
        return Err(RasterError::EmptyBuffer { width, height });
    }
    let expected = packed_len(width, height, bits);
    if bytes.len() != expected {
        return Err(RasterError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let levels = Levels::new(1u32 << bits)?;
    let mut reader = BitReader::new(bytes);
    let mut data = Vec::with_capacity(width * height);
    for _ in 0..width * height {
        match reader.read(bits) {
            Some(value) => data.push(value),
            None => {
                return Err(RasterError::SizeMismatch {
                    expected,
                    actual: bytes.len(),
                })
            }
        }
    }

    Ok(LevelBuffer::from_parts(width, height, levels, data))
}
