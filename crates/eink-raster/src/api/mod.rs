//! Public API for the eink-raster crate.
//!
//! This module provides the high-level API: [`EpdEncoder`] builder and
//! [`RasterError`] unified error type.

mod builder;
mod error;

pub use builder::EpdEncoder;
pub use error::{ErrorKind, RasterError};
