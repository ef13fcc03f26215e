//! Helpers shared by the CLI and tests: image loading and recorded decode
//! sessions.
//!
//! A session file captures what the decode primitive returned on each
//! frame of a real scan, so the tracking policies can be replayed and
//! inspected without a camera or a live decoder.

use crate::models::LocatedCode;
use crate::reference::DatasetError;
use crate::utils::grayscale::rgb_to_grayscale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load an image as RGB bytes along with its dimensions.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize, usize), image::ImageError> {
    let img = image::open(path)?;
    let rgb = img.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    Ok((rgb.into_raw(), width, height))
}

/// Load an image as grayscale bytes along with its dimensions.
pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize, usize), image::ImageError> {
    let (rgb, width, height) = load_rgb(path)?;
    Ok((rgb_to_grayscale(&rgb, width, height), width, height))
}

/// What the decode primitive returned on one frame, if anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFrame {
    /// Frame timestamp in milliseconds since session start
    pub at_ms: u64,
    /// The located code, when the decoder found one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode: Option<LocatedCode>,
}

/// A recorded scanning session: frame dimensions plus the per-frame
/// decode results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySession {
    /// Source-frame width in pixels
    pub width: usize,
    /// Source-frame height in pixels
    pub height: usize,
    /// Frames in timestamp order
    pub frames: Vec<SessionFrame>,
}

impl ReplaySession {
    /// Load a session from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
