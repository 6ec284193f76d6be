//! Error diffusion kernel definitions.
//!
//! Each kernel specifies how quantization error is distributed to
//! neighboring pixels that the raster scan has not reached yet.

/// An error diffusion kernel.
///
/// # Scan Order Constraint
///
/// Pixels are visited left-to-right, top-to-bottom. Every entry must point
/// at a pixel later in that order: `dy > 0`, or `dy == 0` with `dx > 0`.
/// An entry pointing backwards would feed error into a pixel whose level
/// has already been emitted.
///
/// # Error Propagation
///
/// Each target receives `residual * weight / divisor`. The total
/// propagated fraction is `sum(weights) / divisor`, which is exactly 1 for
/// every kernel defined here.
///
/// # Buffer Sizing
///
/// `max_dy` is how many rows ahead the kernel reaches; the engine keeps
/// `max_dy + 1` rows of accumulated error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    /// (dx, dy, weight) entries for error diffusion.
    ///
    /// - `dx`: horizontal offset (positive = right)
    /// - `dy`: vertical offset (0 = current row, positive = below)
    /// - `weight`: numerator; the divisor is separate
    pub entries: &'static [(i32, i32, u8)],

    /// Normalizing divisor for the weights.
    pub divisor: u8,

    /// Maximum dy value in entries.
    pub max_dy: usize,
}

impl Kernel {
    /// Sum of all weights.
    pub fn weight_sum(&self) -> u32 {
        self.entries.iter().map(|&(_, _, w)| w as u32).sum()
    }

    /// Fraction of the residual this kernel propagates.
    pub fn propagation(&self) -> f32 {
        self.weight_sum() as f32 / self.divisor as f32
    }

    /// True if every entry targets a pixel after the current one in
    /// raster order.
    pub fn is_causal(&self) -> bool {
        self.entries
            .iter()
            .all(|&(dx, dy, _)| dy > 0 || (dy == 0 && dx > 0))
    }
}

/// Floyd-Steinberg dithering kernel.
///
/// Distributes error to 4 neighbors with 100% total propagation (16/16).
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // bottom-left
        (0, 1, 5),  // bottom
        (1, 1, 1),  // bottom-right
    ],
    divisor: 16,
    max_dy: 1,
};

/// Jarvis-Judice-Ninke dithering kernel.
///
/// Distributes error to 12 neighbors over 3 rows with 100% propagation (48/48).
/// Smoother gradients than Floyd-Steinberg at the cost of a larger kernel.
///
/// ```text
///            X   7   5
///    3   5   7   5   3
///    1   3   5   3   1
/// ```
pub const JARVIS_JUDICE_NINKE: Kernel = Kernel {
    entries: &[
        (1, 0, 7),
        (2, 0, 5),
        (-2, 1, 3),
        (-1, 1, 5),
        (0, 1, 7),
        (1, 1, 5),
        (2, 1, 3),
        (-2, 2, 1),
        (-1, 2, 3),
        (0, 2, 5),
        (1, 2, 3),
        (2, 2, 1),
    ],
    divisor: 48,
    max_dy: 2,
};

/// Stucki dithering kernel.
///
/// Same footprint as JJN (12 neighbors, 3 rows, 42/42) with heavier
/// center weights, which gives slightly sharper results.
///
/// ```text
///            X   8   4
///    2   4   8   4   2
///    1   2   4   2   1
/// ```
pub const STUCKI: Kernel = Kernel {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
        (-2, 2, 1),
        (-1, 2, 2),
        (0, 2, 4),
        (1, 2, 2),
        (2, 2, 1),
    ],
    divisor: 42,
    max_dy: 2,
};
