//! Grayscale conversion for camera frames.
//!
//! Fixed-point ITU-R BT.601 luminance: lum = (77*R + 150*G + 29*B) >> 8.
//! The tracker operates entirely on grayscale, so this runs once per tick
//! for RGB input.

use rayon::prelude::*;

const COEF_R: i32 = 77;
const COEF_G: i32 = 150;
const COEF_B: i32 = 29;

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as i32 + COEF_G * g as i32 + COEF_B * b as i32) >> 8;
    lum.min(255) as u8
}

/// Convert RGB bytes (3 per pixel) to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    rgb_to_grayscale_into(rgb, width, height, &mut gray);
    gray
}

/// Convert RGB bytes to grayscale into a caller-provided buffer
/// (`width * height` bytes)
pub fn rgb_to_grayscale_into(rgb: &[u8], width: usize, height: usize, gray: &mut [u8]) {
    let pixel_count = width * height;
    for i in 0..pixel_count {
        let idx = i * 3;
        gray[i] = luminance(rgb[idx], rgb[idx + 1], rgb[idx + 2]);
    }
}

/// Convert RGBA bytes (4 per pixel, alpha ignored) to grayscale
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    for i in 0..pixel_count {
        let idx = i * 4;
        gray[i] = luminance(rgba[idx], rgba[idx + 1], rgba[idx + 2]);
    }
    gray
}

/// Convert RGB to grayscale using parallel processing
/// Processes rows in parallel for multi-core speedup
pub fn rgb_to_grayscale_parallel(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 3;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 3;
            *out = luminance(rgb[idx], rgb[idx + 1], rgb[idx + 2]);
        }
    });

    gray
}
