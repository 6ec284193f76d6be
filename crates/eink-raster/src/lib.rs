//! eink-raster: grayscale dithering and bit packing for e-ink displays
//!
//! This library turns an 8-bit grayscale raster into the packed
//! low-bit-depth byte stream an electrophoretic display controller reads,
//! and renders that stream as a C header for firmware builds.
//!
//! # Quick Start
//!
//! The [`EpdEncoder`] builder is the primary entry point:
//!
//! ```
//! use eink_raster::{EpdEncoder, GrayBuffer, Levels};
//!
//! let gray = GrayBuffer::filled(800, 480, 128);
//! let packed = EpdEncoder::new(Levels::BW).encode(&gray).unwrap();
//! assert_eq!(packed.len(), 48_000);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! GrayBuffer --dither--> LevelBuffer --pack--> PackedArtifact --emit_header--> C source
//! ```
//!
//! - [`dither`] runs error diffusion with a [`Kernel`] selected through
//!   [`KernelId`] (Floyd-Steinberg, Jarvis-Judice-Ninke, Stucki).
//! - [`pack`] writes `log2(L)` bits per pixel, MSB first, rows not
//!   byte aligned. [`unpack`] is its inverse.
//! - [`emit_header`] and [`emit_index`] produce `PROGMEM` arrays.
//!
//! # Level Counts
//!
//! [`Levels`] only admits powers of two between 2 and 256, so every level
//! count maps to a whole number of bits per pixel (1 through 8). Level `k`
//! corresponds to gray `round(k * 255 / (L - 1))`.
//!
//! # Determinism
//!
//! Every operation is a pure function of its inputs. Repeated runs on the
//! same image produce byte-identical artifacts, and no function here
//! performs I/O or logging.

pub mod api;
pub mod buffer;
pub mod dither;
pub mod header;
pub mod pack;
pub mod quantize;


pub use api::{EpdEncoder, ErrorKind, RasterError};
pub use buffer::{GrayBuffer, LevelBuffer};
pub use dither::{dither, dither_raw, lookup, requantize, Kernel, KernelId};
pub use header::{emit_header, emit_index, symbol_for_stem, HeaderOptions};
pub use pack::{pack, packed_len, unpack, PackedArtifact};
pub use quantize::{quantize, Levels};
