//! Pixel-level analysis of captured frames.
//!
//! This module provides:
//! - Edge maps and contour hierarchies built on `image` buffers
//! - Tile preprocessing (Otsu binarization, inversion, upscaling)
//! - Playing-field localization (`locate_field`)
//! - Tile segmentation (`segment_tiles`)

pub mod contours;
pub mod edges;
pub mod locator;
pub mod preprocess;
pub mod segmenter;

pub use contours::{find_contours, Contour, Retrieval};
pub use edges::canny;
pub use locator::{locate_field, LocatedField};
pub use preprocess::to_gray;
pub use segmenter::segment_tiles;

/// An axis-aligned rectangle in pixel coordinates.
///
/// Coordinates are signed because padding a rectangle near the screen edge
/// can push its origin below zero; `clamp_to` brings it back inside an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Width over height; 0.0 for degenerate rectangles.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height <= 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Grows the rectangle by `padding` in total along each axis, half per side.
    pub fn padded(&self, padding: i32) -> Self {
        Self {
            x: self.x - padding / 2,
            y: self.y - padding / 2,
            width: self.width + padding,
            height: self.height + padding,
        }
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Intersects the rectangle with a `width` x `height` image.
    ///
    /// Returns `None` when nothing of the rectangle lies inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = (self.x + self.width).min(width as i32);
        let y1 = (self.y + self.height).min(height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_keeps_center() {
        let rect = BoundingRect::new(20, 30, 100, 100);
        let padded = rect.padded(10);
        assert_eq!(padded, BoundingRect::new(15, 25, 110, 110));
        assert_eq!(padded.center(), rect.center());
    }

    #[test]
    fn test_clamp_to_image() {
        let rect = BoundingRect::new(-5, -5, 20, 20);
        assert_eq!(rect.clamp_to(100, 100), Some(BoundingRect::new(0, 0, 15, 15)));

        let edge = BoundingRect::new(90, 95, 20, 20);
        assert_eq!(edge.clamp_to(100, 100), Some(BoundingRect::new(90, 95, 10, 5)));

        let outside = BoundingRect::new(200, 200, 10, 10);
        assert_eq!(outside.clamp_to(100, 100), None);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(BoundingRect::new(0, 0, 50, 25).aspect_ratio(), 2.0);
        assert_eq!(BoundingRect::new(0, 0, 50, 0).aspect_ratio(), 0.0);
    }
}
