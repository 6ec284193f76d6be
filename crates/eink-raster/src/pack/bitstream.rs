//! MSB-first bit cursor over a byte vector.

/// Appends fixed-width values to a byte vector, most significant bit first.
///
/// Bits accumulate in a small register and are flushed a byte at a time,
/// so values may straddle byte boundaries (3, 5, 6, 7 bit widths).
#[derive(Debug)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    acc: u32,
    pending: u32,
}

impl BitWriter {
    pub(crate) fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            acc: 0,
            pending: 0,
        }
    }

    /// Append the low `bits` bits of `value`.
    #[inline]
    pub(crate) fn write(&mut self, value: u8, bits: u8) {
        debug_assert!((1..=8).contains(&bits));
        self.acc = (self.acc << bits) | (value as u32 & ((1 << bits) - 1));
        self.pending += bits as u32;
        while self.pending >= 8 {
            self.pending -= 8;
            self.bytes.push((self.acc >> self.pending) as u8);
        }
        self.acc &= (1 << self.pending) - 1;
    }

    /// Flush, zero-padding the final partial byte.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        if self.pending > 0 {
            self.bytes.push((self.acc << (8 - self.pending)) as u8);
        }
        self.bytes
    }
}

/// Reads fixed-width values back out of an MSB-first byte slice.
#[derive(Debug)]
pub(crate) struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    acc: u32,
    available: u32,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            acc: 0,
            available: 0,
        }
    }

    /// Read the next `bits` bits, or `None` if the input is exhausted.
    #[inline]
    pub(crate) fn read(&mut self, bits: u8) -> Option<u8> {
        debug_assert!((1..=8).contains(&bits));
        while self.available < bits as u32 {
            let byte = *self.bytes.get(self.pos)?;
            self.pos += 1;
            self.acc = (self.acc << 8) | byte as u32;
            self.available += 8;
        }
        self.available -= bits as u32;
        let value = (self.acc >> self.available) & ((1 << bits) - 1);
        self.acc &= (1 << self.available) - 1;
        Some(value as u8)
    }
}
