//! Typed pixel buffers flowing through the pipeline.
//!
//! - [`GrayBuffer`]: 8-bit intensity input, produced by the caller
//! - [`LevelBuffer`]: quantized level indices, produced by the dithering
//!   engine and consumed by the bit packer

mod gray_buffer;
mod level_buffer;

pub use gray_buffer::GrayBuffer;
pub use level_buffer::LevelBuffer;
