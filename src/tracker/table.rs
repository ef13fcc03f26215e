use super::record::TrackedCode;
use crate::matching::{MatchParams, Template, match_template};
use crate::models::{FrameView, LocatedCode, Rect};
use crate::reference::ReferenceEntry;
use log::debug;
use std::collections::HashMap;

/// The stateful registry mapping each distinct payload to its tracking
/// record.
///
/// The table owns its records outright and is only ever mutated through
/// the per-phase methods below, driven once per frame by the scanner in a
/// fixed order: template pass, detection pass, visibility floor, eviction.
/// Presentation code gets read-only access.
#[derive(Debug, Default)]
pub struct TrackingTable {
    records: HashMap<String, TrackedCode>,
}

impl TrackingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked payloads
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record for a payload
    pub fn get(&self, payload: &str) -> Option<&TrackedCode> {
        self.records.get(payload)
    }

    /// Iterate all records (order unspecified)
    pub fn iter(&self) -> impl Iterator<Item = &TrackedCode> {
        self.records.values()
    }

    /// Records whose overlay should currently be shown
    pub fn visible(&self) -> impl Iterator<Item = &TrackedCode> {
        self.records.values().filter(|rec| rec.visible)
    }

    /// Records sorted most-recently-seen first, for the seen list
    pub fn by_recency(&self) -> Vec<&TrackedCode> {
        let mut records: Vec<&TrackedCode> = self.records.values().collect();
        records.sort_by(|a, b| b.last_seen_ms.cmp(&a.last_seen_ms));
        records
    }

    /// Detection pass: the decode primitive located `code` this frame.
    ///
    /// A known payload has its record refreshed in place (template and
    /// position replaced wholesale when `capture` is present); a novel
    /// payload gets a new record with the minimum-visibility floor set to
    /// `now_ms + min_visible_ms`. At most one record per payload ever
    /// exists.
    pub fn apply_detection(
        &mut self,
        code: &LocatedCode,
        capture: Option<(Template, Rect)>,
        reference: Option<&ReferenceEntry>,
        now_ms: u64,
        min_visible_ms: u64,
    ) {
        if let Some(record) = self.records.get_mut(&code.payload) {
            record.refresh_detection(capture, now_ms);
        } else {
            debug!(
                "new track \"{}\" ({})",
                code.payload,
                reference.map(|r| r.name.as_str()).unwrap_or("unmatched")
            );
            self.records.insert(
                code.payload.clone(),
                TrackedCode::new(
                    code.payload.clone(),
                    reference.cloned(),
                    capture,
                    now_ms,
                    min_visible_ms,
                ),
            );
        }
    }

    /// Template pass: try to re-localize every record near its last known
    /// position.
    ///
    /// A record with no usable template counts one failure for the cycle,
    /// so the grace and eviction windows still bound its lifetime.
    pub fn run_template_pass(
        &mut self,
        frame: &FrameView<'_>,
        params: &MatchParams,
        grace_frames: u32,
        now_ms: u64,
    ) {
        for record in self.records.values_mut() {
            let found = match (&record.template, &record.last_position) {
                (Some(template), Some(last)) => match_template(frame, template, last, params),
                _ => None,
            };
            match found {
                Some(hit) => record.record_match(hit.rect, now_ms),
                None => record.record_failure(grace_frames),
            }
        }
    }

    /// Visibility floor: newly created records stay visible for the
    /// minimum window regardless of tracking outcomes.
    pub fn enforce_visibility_floor(&mut self, now_ms: u64) {
        for record in self.records.values_mut() {
            if now_ms < record.min_visible_until_ms {
                record.visible = true;
            }
        }
    }

    /// Eviction: drop records that have been invisible for longer than
    /// `evict_after_ms`. A visible record is never removed, regardless of
    /// age. Returns the evicted payloads so the caller can drop their
    /// presentation elements.
    pub fn evict_expired(&mut self, now_ms: u64, evict_after_ms: u64) -> Vec<String> {
        let mut evicted = Vec::new();
        self.records.retain(|payload, record| {
            let keep = record.visible || now_ms.saturating_sub(record.last_seen_ms) <= evict_after_ms;
            if !keep {
                debug!("evicting track \"{payload}\"");
                evicted.push(payload.clone());
            }
            keep
        });
        evicted
    }

    /// Remove every record unconditionally (scanner stop)
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Corners, Point};

    fn located(payload: &str) -> LocatedCode {
        let corners = Corners {
            top_left: Point::new(40.0, 40.0),
            top_right: Point::new(80.0, 40.0),
            bottom_left: Point::new(40.0, 80.0),
            bottom_right: Point::new(80.0, 80.0),
        };
        LocatedCode::new(payload, corners)
    }

    fn capture() -> (Template, Rect) {
        (
            Template::new(vec![7u8; 100], 10, 10).unwrap(),
            Rect::new(40, 40, 10, 10),
        )
    }

    #[test]
    fn test_one_record_per_payload() {
        let mut table = TrackingTable::new();
        table.apply_detection(&located("A"), Some(capture()), None, 0, 1000);
        table.apply_detection(&located("A"), Some(capture()), None, 100, 1000);
        table.apply_detection(&located("A"), None, None, 200, 1000);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("A").unwrap().last_seen_ms, 200);
    }

    #[test]
    fn test_redetection_replaces_capture_wholesale() {
        let mut table = TrackingTable::new();
        table.apply_detection(&located("A"), Some(capture()), None, 0, 1000);

        let replacement = (
            Template::new(vec![9u8; 64], 8, 8).unwrap(),
            Rect::new(50, 50, 8, 8),
        );
        table.apply_detection(&located("A"), Some(replacement.clone()), None, 50, 1000);

        let record = table.get("A").unwrap();
        assert_eq!(record.template, Some(replacement.0));
        assert_eq!(record.last_position, Some(replacement.1));
        assert_eq!(record.consecutive_failures, 0);
    }

    #[test]
    fn test_template_pass_counts_failure_without_template() {
        let mut table = TrackingTable::new();
        table.apply_detection(&located("A"), None, None, 0, 1000);

        let data = vec![0u8; 100 * 100];
        let frame = FrameView::new(&data, 100, 100).unwrap();
        table.run_template_pass(&frame, &MatchParams::default(), 90, 33);
        assert_eq!(table.get("A").unwrap().consecutive_failures, 1);
    }

    #[test]
    fn test_visibility_floor_overrides_failures() {
        let mut table = TrackingTable::new();
        table.apply_detection(&located("A"), None, None, 0, 1000);

        let data = vec![0u8; 100 * 100];
        let frame = FrameView::new(&data, 100, 100).unwrap();
        // Fail far past the grace window with a tiny grace threshold.
        for _ in 0..5 {
            table.run_template_pass(&frame, &MatchParams::default(), 2, 100);
        }
        assert!(!table.get("A").unwrap().visible);

        table.enforce_visibility_floor(999);
        assert!(table.get("A").unwrap().visible, "floor still in effect");

        // Re-run the failure path after the floor has elapsed; nothing
        // forces visibility back on.
        table.run_template_pass(&frame, &MatchParams::default(), 2, 1_100);
        table.enforce_visibility_floor(1_100);
        assert!(!table.get("A").unwrap().visible);
    }

    #[test]
    fn test_eviction_window() {
        let mut table = TrackingTable::new();
        table.apply_detection(&located("A"), None, None, 0, 1000);
        table.get_mut_for_test("A").visible = false;

        // 9.9 seconds invisible: retained.
        assert!(table.evict_expired(9_900, 10_000).is_empty());
        assert_eq!(table.len(), 1);

        // Just past the window: removed.
        let evicted = table.evict_expired(10_001, 10_000);
        assert_eq!(evicted, vec!["A".to_string()]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_visible_record_never_evicted() {
        let mut table = TrackingTable::new();
        table.apply_detection(&located("A"), None, None, 0, 1000);
        assert!(table.get("A").unwrap().visible);
        assert!(table.evict_expired(1_000_000, 10_000).is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut table = TrackingTable::new();
        table.apply_detection(&located("A"), None, None, 0, 1000);
        table.apply_detection(&located("B"), None, None, 0, 1000);
        table.apply_detection(&located("C"), None, None, 0, 1000);
        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_by_recency_sorts_most_recent_first() {
        let mut table = TrackingTable::new();
        table.apply_detection(&located("OLD"), None, None, 0, 1000);
        table.apply_detection(&located("NEW"), None, None, 2_000, 1000);
        table.apply_detection(&located("MID"), None, None, 1_000, 1000);

        let order: Vec<&str> = table
            .by_recency()
            .iter()
            .map(|r| r.payload.as_str())
            .collect();
        assert_eq!(order, vec!["NEW", "MID", "OLD"]);
    }

    impl TrackingTable {
        fn get_mut_for_test(&mut self, payload: &str) -> &mut TrackedCode {
            self.records.get_mut(payload).unwrap()
        }
    }
}
