use crate::api::RasterError;
use crate::quantize::Levels;

/// Quantized level indices, one per pixel, row-major.
///
/// Every entry is `< levels.count()`; the constructor enforces this so the
/// packer can rely on each value fitting in `levels.bits_per_pixel()` bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelBuffer {
    width: usize,
    height: usize,
    levels: Levels,
    data: Vec<u8>,
}

impl LevelBuffer {
    /// Wrap row-major level indices.
    ///
    /// Fails with [`RasterError::DimensionMismatch`] for a length mismatch
    /// and [`RasterError::LevelOutOfRange`] for the first entry that is not
    /// a valid level.
    pub fn new(
        width: usize,
        height: usize,
        levels: Levels,
        data: Vec<u8>,
    ) -> Result<Self, RasterError> {
        if data.len() != width * height {
            return Err(RasterError::DimensionMismatch {
                width,
                height,
                len: data.len(),
            });
        }
        if let Some((index, &value)) = data
            .iter()
            .enumerate()
            .find(|&(_, &v)| v > levels.max_level())
        {
            return Err(RasterError::LevelOutOfRange {
                index,
                value,
                limit: levels.count() as u32,
            });
        }
        Ok(Self {
            width,
            height,
            levels,
            data,
        })
    }

    /// Construct from data already known to be in range.
    pub(crate) fn from_parts(width: usize, height: usize, levels: Levels, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        debug_assert!(data.iter().all(|&v| v <= levels.max_level()));
        Self {
            width,
            height,
            levels,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The level count these entries were quantized to.
    #[inline]
    pub fn levels(&self) -> Levels {
        self.levels
    }

    /// Level at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Count of pixels at each level, indexed by level.
    pub fn histogram(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.levels.count() as usize];
        for &v in &self.data {
            counts[v as usize] += 1;
        }
        counts
    }
}
