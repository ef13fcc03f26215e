use super::{Point, Rect};
use serde::{Deserialize, Serialize};

/// The four corner points of a located code's bounding quadrilateral,
/// in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Corners {
    /// Top-left corner
    pub top_left: Point,
    /// Top-right corner
    pub top_right: Point,
    /// Bottom-left corner
    pub bottom_left: Point,
    /// Bottom-right corner
    pub bottom_right: Point,
}

impl Corners {
    /// Corners as an array, top-left first, clockwise
    pub fn points(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Padded bounding rectangle clipped to frame bounds.
    ///
    /// `None` when the geometry is degenerate or lies entirely outside
    /// the frame.
    pub fn bounding_rect(&self, margin: u32, frame_width: u32, frame_height: u32) -> Option<Rect> {
        Rect::from_points_clipped(&self.points(), margin, frame_width, frame_height)
    }
}

/// One code located by the decode primitive: the decoded payload plus the
/// quadrilateral it was read from.
///
/// The decode primitive yields at most one of these per frame; absence is
/// modeled as `Option<LocatedCode>`, not as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedCode {
    /// Decoded payload string; the tracking identity key
    pub payload: String,
    /// Corner points of the code in the frame it was decoded from
    pub corners: Corners,
}

impl LocatedCode {
    /// Create a located code from a payload and its corners
    pub fn new(payload: impl Into<String>, corners: Corners) -> Self {
        Self {
            payload: payload.into(),
            corners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Corners {
        Corners {
            top_left: Point::new(x, y),
            top_right: Point::new(x + size, y),
            bottom_left: Point::new(x, y + size),
            bottom_right: Point::new(x + size, y + size),
        }
    }

    #[test]
    fn test_bounding_rect_with_margin() {
        let corners = square(50.0, 50.0, 20.0);
        let rect = corners.bounding_rect(10, 640, 480).unwrap();
        assert_eq!(rect, Rect::new(40, 40, 40, 40));
    }

    #[test]
    fn test_bounding_rect_degenerate() {
        let corners = square(f32::NAN, 50.0, 20.0);
        assert!(corners.bounding_rect(10, 640, 480).is_none());
    }
}
