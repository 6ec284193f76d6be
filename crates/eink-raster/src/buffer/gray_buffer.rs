use crate::api::RasterError;

/// A width×height matrix of 8-bit gray samples in row-major order.
///
/// The dithering engine only reads from a `GrayBuffer`; error
/// accumulation happens in its own working storage.
///
/// # Example
///
/// ```
/// use eink_raster::GrayBuffer;
///
/// let gray = GrayBuffer::new(2, 2, vec![0, 255, 128, 64]).unwrap();
/// assert_eq!(gray.get(0, 1), 128);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayBuffer {
    /// Wrap row-major samples.
    ///
    /// Fails with [`RasterError::DimensionMismatch`] if
    /// `data.len() != width * height`. Zero dimensions are accepted here
    /// and rejected by the operations that need pixels.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RasterError> {
        if data.len() != width * height {
            return Err(RasterError::DimensionMismatch {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    /// A buffer with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
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

    /// True when either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.data[y * self.width + x]
    }

    /// All samples in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks(self.width.max(1))
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
