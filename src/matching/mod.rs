//! Template capture and re-localization.
//!
//! The decode primitive only ever reports one code per frame, so continuity
//! for every other visible code comes from here: a small pixel snapshot
//! captured at detection time, re-found near its last position by
//! normalized cross-correlation.

/// Normalized cross-correlation search around a last known position
pub mod ncc;
/// Template capture from a located code's padded bounding region
pub mod template;

pub use ncc::{MatchParams, TemplateMatch, match_template};
pub use template::Template;
