//! Derived presentation state.
//!
//! The overlay renderer and the "recently seen" list are pure functions of
//! the tracking table: a snapshot is computed on demand and never feeds
//! back into tracking state, so the display refresh timer and the frame
//! loop cannot interfere with each other.

use crate::tracker::{TrackedCode, TrackingTable};

/// Overlay color for payloads with no reference entry.
pub const UNMATCHED_COLOR: &str = "#666666";

/// How far back the seen list reaches.
pub const RECENT_WINDOW_MS: u64 = 10_000;

/// Payloads longer than this are truncated with an ellipsis in the list.
pub const PAYLOAD_DISPLAY_CAP: usize = 30;

/// One overlay rectangle, in display coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    /// Payload the overlay belongs to
    pub payload: String,
    /// Reference name or the unknown label
    pub label: String,
    /// CSS hex color from the matched reference entry, or the neutral
    /// color for unmatched payloads
    pub color: String,
    /// Left edge in display pixels
    pub x: f32,
    /// Top edge in display pixels
    pub y: f32,
    /// Width in display pixels
    pub width: f32,
    /// Height in display pixels
    pub height: f32,
}

/// One row of the recently-seen list.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenRow {
    /// Reference name or the unknown label
    pub label: String,
    /// Payload, truncated for display
    pub payload_short: String,
    /// 0 while the code is visible, otherwise whole seconds since it was
    /// last localized
    pub seconds_ago: u64,
}

/// Read-only snapshot of everything the page renders.
#[derive(Debug, Clone, Default)]
pub struct DisplaySnapshot {
    /// One box per currently visible record
    pub overlays: Vec<OverlayBox>,
    /// Records seen inside the recent window, most recent first
    pub recent: Vec<SeenRow>,
}

impl DisplaySnapshot {
    /// Derive a snapshot from the table.
    ///
    /// Overlay rectangles are source-frame rectangles scaled by
    /// display-size over source-frame-size.
    pub fn from_table(
        table: &TrackingTable,
        display_size: (u32, u32),
        frame_size: (u32, u32),
        now_ms: u64,
    ) -> Self {
        let scale_x = if frame_size.0 > 0 {
            display_size.0 as f32 / frame_size.0 as f32
        } else {
            1.0
        };
        let scale_y = if frame_size.1 > 0 {
            display_size.1 as f32 / frame_size.1 as f32
        } else {
            1.0
        };

        let mut overlays = Vec::new();
        for record in table.visible() {
            let Some(rect) = record.last_position else {
                continue;
            };
            overlays.push(OverlayBox {
                payload: record.payload.clone(),
                label: record.label().to_string(),
                color: overlay_color(record).to_string(),
                x: rect.x as f32 * scale_x,
                y: rect.y as f32 * scale_y,
                width: rect.width as f32 * scale_x,
                height: rect.height as f32 * scale_y,
            });
        }

        let recent = table
            .by_recency()
            .into_iter()
            .filter(|record| now_ms.saturating_sub(record.last_seen_ms) <= RECENT_WINDOW_MS)
            .map(|record| SeenRow {
                label: record.label().to_string(),
                payload_short: truncate_payload(&record.payload, PAYLOAD_DISPLAY_CAP),
                seconds_ago: if record.visible {
                    0
                } else {
                    now_ms.saturating_sub(record.last_seen_ms) / 1000
                },
            })
            .collect();

        Self { overlays, recent }
    }
}

/// Overlay color for a record: the matched entry's color, or neutral.
pub fn overlay_color(record: &TrackedCode) -> &str {
    record
        .matched_reference
        .as_ref()
        .map(|entry| entry.color.as_str())
        .unwrap_or(UNMATCHED_COLOR)
}

/// Truncate a payload to `cap` characters, appending an ellipsis when
/// anything was cut.
pub fn truncate_payload(payload: &str, cap: usize) -> String {
    if payload.chars().count() <= cap {
        payload.to_string()
    } else {
        let mut short: String = payload.chars().take(cap).collect();
        short.push_str("...");
        short
    }
}
