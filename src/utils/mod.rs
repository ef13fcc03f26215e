//! Utility functions for frame plumbing
//!
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Reusable scratch buffers for per-tick conversion

pub mod grayscale;
pub mod pool;
