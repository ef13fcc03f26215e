use crate::models::{Corners, FrameView, Rect};

/// Owned grayscale snapshot of the region around a located code.
///
/// A template is captured once and then only ever replaced wholesale on a
/// later successful detection; its pixels are never partially mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

impl Template {
    /// Build a template from raw grayscale pixels.
    ///
    /// Returns `None` when the buffer does not hold `width * height` bytes
    /// or the dimensions are zero.
    pub fn new(pixels: Vec<u8>, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return None;
        }
        Some(Self {
            pixels,
            width,
            height,
        })
    }

    /// Capture the pixels of `region` from a frame. The region must already
    /// be clipped to frame bounds; `None` otherwise.
    pub fn from_region(frame: &FrameView<'_>, region: &Rect) -> Option<Self> {
        let right = region.right() as usize;
        let bottom = region.bottom() as usize;
        if region.width == 0
            || region.height == 0
            || right > frame.width()
            || bottom > frame.height()
        {
            return None;
        }

        let width = region.width as usize;
        let height = region.height as usize;
        let mut pixels = Vec::with_capacity(width * height);
        for y in region.y as usize..bottom {
            let row = frame.row(y);
            pixels.extend_from_slice(&row[region.x as usize..right]);
        }

        Some(Self {
            pixels,
            width,
            height,
        })
    }

    /// Capture a template around a located code: bounding rectangle of the
    /// four corners, padded by `margin` on all sides, clipped to frame
    /// bounds.
    ///
    /// Returns the template together with the rectangle it was captured
    /// from, so callers can store the pair consistently. `None` for
    /// degenerate geometry.
    pub fn extract(
        frame: &FrameView<'_>,
        corners: &Corners,
        margin: u32,
    ) -> Option<(Self, Rect)> {
        let rect = corners.bounding_rect(margin, frame.width() as u32, frame.height() as u32)?;
        let template = Self::from_region(frame, &rect)?;
        Some((template, rect))
    }

    /// Template width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Template height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw grayscale pixels, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// One row of pixels
    pub(crate) fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Sum of squared pixel values over the subsampled grid used by the
    /// matcher. Constant per template, so computed once per match call.
    pub(crate) fn energy(&self, stride: usize) -> f32 {
        let stride = stride.max(1);
        let mut sum = 0.0f32;
        let mut y = 0;
        while y < self.height {
            let row = self.row(y);
            let mut x = 0;
            while x < self.width {
                let v = row[x] as f32;
                sum += v * v;
                x += stride;
            }
            y += stride;
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn frame_data(width: usize, height: usize) -> Vec<u8> {
        (0..width * height).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_from_region_copies_exact_rect() {
        let data = frame_data(10, 10);
        let frame = FrameView::new(&data, 10, 10).unwrap();
        let template = Template::from_region(&frame, &Rect::new(2, 3, 4, 2)).unwrap();
        assert_eq!(template.width(), 4);
        assert_eq!(template.height(), 2);
        assert_eq!(template.row(0), &data[32..36]);
        assert_eq!(template.row(1), &data[42..46]);
    }

    #[test]
    fn test_from_region_out_of_bounds() {
        let data = frame_data(10, 10);
        let frame = FrameView::new(&data, 10, 10).unwrap();
        assert!(Template::from_region(&frame, &Rect::new(8, 8, 4, 4)).is_none());
        assert!(Template::from_region(&frame, &Rect::new(0, 0, 0, 4)).is_none());
    }

    #[test]
    fn test_extract_pads_and_clips() {
        let data = frame_data(100, 100);
        let frame = FrameView::new(&data, 100, 100).unwrap();
        let corners = Corners {
            top_left: Point::new(20.0, 20.0),
            top_right: Point::new(40.0, 20.0),
            bottom_left: Point::new(20.0, 40.0),
            bottom_right: Point::new(40.0, 40.0),
        };
        let (template, rect) = Template::extract(&frame, &corners, 10).unwrap();
        assert_eq!(rect, Rect::new(10, 10, 40, 40));
        assert_eq!(template.width() as u32, rect.width);
        assert_eq!(template.height() as u32, rect.height);
    }

    #[test]
    fn test_extract_degenerate_geometry() {
        let data = frame_data(100, 100);
        let frame = FrameView::new(&data, 100, 100).unwrap();
        let corners = Corners {
            top_left: Point::new(f32::NAN, 20.0),
            ..Corners::default()
        };
        assert!(Template::extract(&frame, &corners, 10).is_none());
    }

    #[test]
    fn test_energy_subsampled() {
        let template = Template::new(vec![2u8; 16], 4, 4).unwrap();
        // Stride 2 visits 4 of 16 pixels.
        assert_eq!(template.energy(2), 16.0);
        assert_eq!(template.energy(1), 64.0);
    }
}
