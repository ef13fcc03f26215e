//! Frame loop controller.
//!
//! Drives one decode/track/update cycle per rendered frame and owns the
//! tracking table for the lifetime of a scanning session. All work is
//! synchronous inside [`Scanner::tick`]; there is exactly one logical
//! thread of control and no locking.

use crate::matching::{MatchParams, Template};
use crate::models::{FrameView, LocatedCode};
use crate::reference::ReferenceSet;
use crate::tracker::TrackingTable;
use crate::utils::grayscale::rgb_to_grayscale_into;
use crate::utils::pool::FrameBuffers;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The one-shot decode primitive: locates at most one code per frame.
///
/// Consumed as a black box; `None` is the expected common case, not an
/// error. Implemented for any closure of the matching shape.
pub trait Decoder {
    /// Attempt to locate one code in a grayscale frame
    fn decode(&mut self, gray: &[u8], width: usize, height: usize) -> Option<LocatedCode>;
}

impl<F> Decoder for F
where
    F: FnMut(&[u8], usize, usize) -> Option<LocatedCode>,
{
    fn decode(&mut self, gray: &[u8], width: usize, height: usize) -> Option<LocatedCode> {
        self(gray, width, height)
    }
}

/// Policy constants for a scanning session.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Half-width of the template search window in pixels
    pub search_radius: u32,
    /// Step between candidate offsets in the template search
    pub scan_stride: usize,
    /// Pixel subsampling step inside the correlation sum
    pub sample_stride: usize,
    /// Minimum correlation score for an accepted match
    pub match_threshold: f32,
    /// Padding around a located code when capturing its template
    pub template_margin: u32,
    /// How long a new record stays visible no matter what
    pub min_visible_ms: u64,
    /// Consecutive failed frames before the overlay is dropped
    pub grace_frames: u32,
    /// How long a record may stay invisible before eviction
    pub evict_after_ms: u64,
    /// Per-frame chance of invoking the decode primitive; template
    /// matching carries continuity between the sparse full decodes
    pub redetect_probability: f64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            search_radius: 50,
            scan_stride: 3,
            sample_stride: 2,
            match_threshold: 0.6,
            template_margin: 10,
            min_visible_ms: 1000,
            grace_frames: 90,
            evict_after_ms: 10_000,
            redetect_probability: 0.3,
        }
    }
}

impl ScannerConfig {
    fn match_params(&self) -> MatchParams {
        MatchParams {
            search_radius: self.search_radius,
            scan_stride: self.scan_stride,
            sample_stride: self.sample_stride,
            min_score: self.match_threshold,
        }
    }
}

/// A scanning session: tracking table, reference set, and the per-frame
/// update cycle.
///
/// The caller's frame-presentation mechanism invokes [`Scanner::tick`]
/// once per rendered frame with the current timestamp; cancellation is a
/// plain flag checked at the top of each tick.
pub struct Scanner {
    config: ScannerConfig,
    references: ReferenceSet,
    table: TrackingTable,
    rng: StdRng,
    buffers: FrameBuffers,
    running: bool,
    frames_processed: u64,
}

impl Scanner {
    /// Create an idle scanner with default policy
    pub fn new(references: ReferenceSet) -> Self {
        Self::with_config(references, ScannerConfig::default())
    }

    /// Create an idle scanner with explicit policy
    pub fn with_config(references: ReferenceSet, config: ScannerConfig) -> Self {
        Self {
            config,
            references,
            table: TrackingTable::new(),
            rng: StdRng::from_entropy(),
            buffers: FrameBuffers::new(),
            running: false,
            frames_processed: 0,
        }
    }

    /// Create a scanner with a fixed RNG seed, so the probabilistic
    /// re-detection schedule is reproducible (tests, session replay)
    pub fn with_seed(references: ReferenceSet, config: ScannerConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::with_config(references, config)
        }
    }

    /// Begin scanning; ticks are ignored until this is called
    pub fn start(&mut self) {
        info!("scanner started ({} reference entries)", self.references.len());
        self.running = true;
    }

    /// Stop scanning. The table is cleared unconditionally: no grace
    /// period, no minimum-visibility floor, nothing survives a stop.
    pub fn stop(&mut self) {
        info!("scanner stopped, dropping {} tracks", self.table.len());
        self.running = false;
        self.table.clear();
    }

    /// Whether ticks are currently being processed
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Read-only view of the tracking table for presentation
    pub fn table(&self) -> &TrackingTable {
        &self.table
    }

    /// Reference set this session matches against
    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    /// Frames processed since the session started
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// One frame of the update cycle, on an already-grayscale frame:
    /// template pass, probabilistic re-detection pass, visibility floor,
    /// eviction. Returns the payloads evicted this tick.
    pub fn tick<D: Decoder>(
        &mut self,
        frame: FrameView<'_>,
        now_ms: u64,
        decoder: &mut D,
    ) -> Vec<String> {
        if !self.running {
            return Vec::new();
        }
        self.frames_processed += 1;

        self.table.run_template_pass(
            &frame,
            &self.config.match_params(),
            self.config.grace_frames,
            now_ms,
        );

        // The decode primitive is assumed expensive relative to template
        // matching, so it only runs on a sampled subset of frames.
        let probability = self.config.redetect_probability.clamp(0.0, 1.0);
        if probability > 0.0 && self.rng.gen_bool(probability) {
            if let Some(code) = decoder.decode(frame.data(), frame.width(), frame.height()) {
                debug!("decode hit \"{}\"", code.payload);
                let capture = Template::extract(&frame, &code.corners, self.config.template_margin);
                let reference = self.references.lookup(&code.payload);
                self.table.apply_detection(
                    &code,
                    capture,
                    reference,
                    now_ms,
                    self.config.min_visible_ms,
                );
            }
        }

        self.table.enforce_visibility_floor(now_ms);
        self.table.evict_expired(now_ms, self.config.evict_after_ms)
    }

    /// Like [`Scanner::tick`] but accepts RGB input, converting through a
    /// reused grayscale buffer.
    pub fn tick_rgb<D: Decoder>(
        &mut self,
        rgb: &[u8],
        width: usize,
        height: usize,
        now_ms: u64,
        decoder: &mut D,
    ) -> Vec<String> {
        if !self.running || rgb.len() < width * height * 3 {
            return Vec::new();
        }
        // The buffer leaves the pool for the duration of the tick so the
        // frame view can borrow it while the table mutates.
        let mut gray = self.buffers.take_grayscale(width * height);
        rgb_to_grayscale_into(rgb, width, height, &mut gray[..width * height]);
        let result = match FrameView::new(&gray, width, height) {
            Some(frame) => self.tick(frame, now_ms, decoder),
            None => Vec::new(),
        };
        self.buffers.put_back(gray);
        result
    }
}
