use crate::matching::Template;
use crate::models::Rect;
use crate::reference::ReferenceEntry;

/// Lifecycle state of a tracked code, for reporting and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Created this frame by a decode of a novel payload
    #[default]
    New,
    /// The decode primitive re-detected the payload
    Redetected,
    /// Template matching re-localized the code this frame
    TemplateTracked,
    /// Re-localization is failing; shown at the stale last position
    Grace,
    /// Invisible past the eviction window; about to leave the table
    Evicted,
}

/// Display label for payloads with no reference entry.
pub const UNKNOWN_LABEL: &str = "Unknown QR Code";

/// One tracked code: everything the table knows about a distinct payload.
///
/// `template` and `last_position` are either both present and mutually
/// consistent (the template was captured from exactly that rectangle) or
/// both absent; they are only ever replaced together.
#[derive(Debug, Clone)]
pub struct TrackedCode {
    /// Decoded payload string; the identity key
    pub payload: String,
    /// Reference entry matched by exact payload equality, if any
    pub matched_reference: Option<ReferenceEntry>,
    /// When the payload was first decoded
    pub first_seen_ms: u64,
    /// Last successful localization (decode or template match)
    pub last_seen_ms: u64,
    /// Visibility is forced until this time elapses
    pub min_visible_until_ms: u64,
    /// Snapshot used to bridge frames the decoder misses
    pub template: Option<Template>,
    /// Where the code was last localized, in source-frame coordinates
    pub last_position: Option<Rect>,
    /// Consecutive frames where re-localization failed
    pub consecutive_failures: u32,
    /// Whether an overlay should currently be shown
    pub visible: bool,
    /// Lifecycle state as of the last update
    pub state: TrackState,
}

impl TrackedCode {
    pub(crate) fn new(
        payload: String,
        matched_reference: Option<ReferenceEntry>,
        capture: Option<(Template, Rect)>,
        now_ms: u64,
        min_visible_ms: u64,
    ) -> Self {
        let (template, last_position) = match capture {
            Some((template, rect)) => (Some(template), Some(rect)),
            None => (None, None),
        };
        Self {
            payload,
            matched_reference,
            first_seen_ms: now_ms,
            last_seen_ms: now_ms,
            min_visible_until_ms: now_ms + min_visible_ms,
            template,
            last_position,
            consecutive_failures: 0,
            visible: true,
            state: TrackState::New,
        }
    }

    /// Display name: the matched reference's name, or the unknown label.
    pub fn label(&self) -> &str {
        self.matched_reference
            .as_ref()
            .map(|entry| entry.name.as_str())
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// The decode primitive saw this payload again. The template and
    /// position are replaced wholesale when a fresh capture is available;
    /// a failed capture keeps the previous consistent pair.
    pub(crate) fn refresh_detection(&mut self, capture: Option<(Template, Rect)>, now_ms: u64) {
        if let Some((template, rect)) = capture {
            self.template = Some(template);
            self.last_position = Some(rect);
        }
        self.last_seen_ms = now_ms;
        self.consecutive_failures = 0;
        self.visible = true;
        self.state = TrackState::Redetected;
    }

    /// Template matching found the code this frame.
    pub(crate) fn record_match(&mut self, rect: Rect, now_ms: u64) {
        self.last_position = Some(rect);
        self.last_seen_ms = now_ms;
        self.consecutive_failures = 0;
        self.visible = true;
        self.state = TrackState::TemplateTracked;
    }

    /// Re-localization failed this frame. The overlay survives at the
    /// stale position until `grace_frames` consecutive failures.
    pub(crate) fn record_failure(&mut self, grace_frames: u32) {
        self.consecutive_failures += 1;
        if self.consecutive_failures < grace_frames {
            self.visible = true;
            self.state = TrackState::Grace;
        } else {
            self.visible = false;
        }
    }
}
