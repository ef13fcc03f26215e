//! qr_track - temporally stable multi-code QR tracking
//!
//! Builds a stable *set* of concurrently visible QR codes on top of a
//! one-shot decode primitive that locates at most one code per frame.
//! Template matching bridges the frames the decoder misses; time-based
//! visibility floors, grace periods, and eviction keep the derived display
//! state from flickering.
//!
//! The decode primitive itself is an external collaborator: anything
//! implementing [`scanner::Decoder`] (including a plain closure) plugs in.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Derived overlay and seen-list state for the presentation layer
pub mod display;
/// Template capture and normalized cross-correlation matching
pub mod matching;
/// Core data structures (points, rects, frames, located codes)
pub mod models;
/// Reference dataset of known codes
pub mod reference;
/// The per-frame update cycle and its configuration
pub mod scanner;
/// CLI/test helpers: image loading and recorded sessions
pub mod tools;
/// The tracking table and its records
pub mod tracker;
/// Grayscale conversion and scratch buffers
pub mod utils;

pub use display::DisplaySnapshot;
pub use matching::{MatchParams, Template, TemplateMatch, match_template};
pub use models::{Corners, FrameView, LocatedCode, Point, Rect};
pub use reference::{DatasetError, ReferenceEntry, ReferenceSet};
pub use scanner::{Decoder, Scanner, ScannerConfig};
pub use tracker::{TrackState, TrackedCode, TrackingTable};
