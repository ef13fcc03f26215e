//! Windowed template matching via normalized cross-correlation.
//!
//! The matcher re-localizes a previously captured template near its last
//! known position. It is a coarse grid search: candidate offsets are
//! visited at a fixed stride, and the correlation itself subsamples pixels,
//! trading accuracy for per-frame latency.

use super::Template;
use crate::models::{FrameView, Rect};

/// Tuning knobs for [`match_template`].
#[derive(Debug, Clone)]
pub struct MatchParams {
    /// Half-width of the square search window around the last position
    pub search_radius: u32,
    /// Step between candidate top-left offsets inside the window
    pub scan_stride: usize,
    /// Pixel subsampling step inside the correlation sum
    pub sample_stride: usize,
    /// Scores at or below this are rejected as ambiguous or lost
    pub min_score: f32,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            search_radius: 50,
            scan_stride: 3,
            sample_stride: 2,
            min_score: 0.6,
        }
    }
}

/// A confident re-localization of a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    /// Where the template was found, in source-frame coordinates
    pub rect: Rect,
    /// Normalized cross-correlation score, in (min_score, 1]
    pub score: f32,
}

/// Search for `template` inside a square window centered on `last`.
///
/// Returns the best-scoring candidate only if its score strictly exceeds
/// `params.min_score`; `None` means the track is ambiguous or lost and the
/// caller must not guess a position. Pure with respect to its inputs:
/// identical frame, template, and last position always produce the same
/// result.
pub fn match_template(
    frame: &FrameView<'_>,
    template: &Template,
    last: &Rect,
    params: &MatchParams,
) -> Option<TemplateMatch> {
    let frame_width = frame.width();
    let frame_height = frame.height();
    let template_width = template.width();
    let template_height = template.height();

    if template_width == 0
        || template_height == 0
        || template_width > frame_width
        || template_height > frame_height
    {
        return None;
    }

    // Valid top-left offsets: the square window around the last position,
    // clipped to frame bounds minus the template dimensions. The offset
    // grid is anchored on the last position itself so a stationary code
    // re-matches at its exact location.
    let max_x = (frame_width - template_width) as i64;
    let max_y = (frame_height - template_height) as i64;
    let stride = params.scan_stride.max(1) as i64;
    let steps = params.search_radius as i64 / stride;
    let template_energy = template.energy(params.sample_stride);

    let mut best: Option<TemplateMatch> = None;
    for ky in -steps..=steps {
        let y = last.y as i64 + ky * stride;
        if y < 0 || y > max_y {
            continue;
        }
        for kx in -steps..=steps {
            let x = last.x as i64 + kx * stride;
            if x < 0 || x > max_x {
                continue;
            }
            let score = correlation_at(
                frame,
                template,
                x as usize,
                y as usize,
                params.sample_stride,
                template_energy,
            );
            if best.is_none_or(|b| score > b.score) {
                best = Some(TemplateMatch {
                    rect: Rect::new(
                        x as u32,
                        y as u32,
                        template_width as u32,
                        template_height as u32,
                    ),
                    score,
                });
            }
        }
    }

    best.filter(|b| b.score > params.min_score)
}

/// Normalized cross-correlation of the template against the frame region
/// with top-left corner at (left, top), subsampled at `stride`:
/// `sum(I*T) / sqrt(sum(I^2) * sum(T^2))`. Degenerate regions (zero
/// variance on either side, or an empty overlap) score 0.
fn correlation_at(
    frame: &FrameView<'_>,
    template: &Template,
    left: usize,
    top: usize,
    stride: usize,
    template_energy: f32,
) -> f32 {
    if template_energy <= 0.0 {
        return 0.0;
    }

    let stride = stride.max(1);
    let mut dot = 0.0f32;
    let mut frame_energy = 0.0f32;

    let mut ty = 0;
    while ty < template.height() {
        let frame_row = frame.row(top + ty);
        let template_row = template.row(ty);
        let mut tx = 0;
        while tx < template.width() {
            let image = frame_row[left + tx] as f32;
            let tmpl = template_row[tx] as f32;
            dot += image * tmpl;
            frame_energy += image * image;
            tx += stride;
        }
        ty += stride;
    }

    if frame_energy <= 0.0 {
        return 0.0;
    }

    dot / (frame_energy * template_energy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic non-uniform texture so correlation peaks are sharp.
    fn textured_frame(width: usize, height: usize) -> Vec<u8> {
        let mut data = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                data[y * width + x] = ((x * 7 + y * 13) % 256) as u8 ^ ((x * y) % 128) as u8;
            }
        }
        data
    }

    #[test]
    fn test_finds_template_at_origin_position() {
        let data = textured_frame(200, 200);
        let frame = FrameView::new(&data, 200, 200).unwrap();
        let region = Rect::new(60, 60, 40, 40);
        let template = Template::from_region(&frame, &region).unwrap();

        let found = match_template(&frame, &template, &region, &MatchParams::default()).unwrap();
        assert_eq!(found.rect, region);
        assert!(found.score > 0.99);
    }

    #[test]
    fn test_finds_template_after_small_shift() {
        let data = textured_frame(200, 200);
        let frame = FrameView::new(&data, 200, 200).unwrap();
        let region = Rect::new(60, 60, 40, 40);
        let template = Template::from_region(&frame, &region).unwrap();

        // Pretend the code was last seen a little away from where it
        // actually is; the window must still cover the true position.
        let stale = Rect::new(42, 75, 40, 40);
        let found = match_template(&frame, &template, &stale, &MatchParams::default()).unwrap();
        // Grid stride is 3, so the recovered offset lands within one step
        // of the true position.
        assert!(found.rect.x.abs_diff(region.x) <= 3);
        assert!(found.rect.y.abs_diff(region.y) <= 3);
    }

    #[test]
    fn test_never_returns_score_at_or_below_threshold() {
        // An all-black frame has zero energy everywhere: every candidate
        // scores 0, which must be rejected.
        let data = vec![0u8; 200 * 200];
        let frame = FrameView::new(&data, 200, 200).unwrap();
        let template = Template::new(vec![200u8; 40 * 40], 40, 40).unwrap();
        let last = Rect::new(80, 80, 40, 40);
        assert!(match_template(&frame, &template, &last, &MatchParams::default()).is_none());
    }

    #[test]
    fn test_deterministic() {
        let data = textured_frame(160, 160);
        let frame = FrameView::new(&data, 160, 160).unwrap();
        let region = Rect::new(50, 40, 30, 30);
        let template = Template::from_region(&frame, &region).unwrap();
        let params = MatchParams::default();

        let a = match_template(&frame, &template, &region, &params);
        let b = match_template(&frame, &template, &region, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_template_larger_than_frame() {
        let data = textured_frame(20, 20);
        let frame = FrameView::new(&data, 20, 20).unwrap();
        let template = Template::new(vec![128u8; 30 * 30], 30, 30).unwrap();
        let last = Rect::new(0, 0, 30, 30);
        assert!(match_template(&frame, &template, &last, &MatchParams::default()).is_none());
    }

    #[test]
    fn test_window_clipped_at_frame_edge() {
        let data = textured_frame(120, 120);
        let frame = FrameView::new(&data, 120, 120).unwrap();
        // Template sits in the frame's bottom-right corner; the window
        // around it must clamp instead of running out of bounds.
        let region = Rect::new(90, 90, 30, 30);
        let template = Template::from_region(&frame, &region).unwrap();
        let found = match_template(&frame, &template, &region, &MatchParams::default()).unwrap();
        assert_eq!(found.rect, region);
    }
}
