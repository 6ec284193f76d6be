//! Geink - e-ink image preparation
//!
//! Preprocessing, dithering and packing of photos for e-paper panels.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
