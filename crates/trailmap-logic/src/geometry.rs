//! Point, size and rectangle primitives shared by generation and movement.
//!
//! Canvas coordinates: origin at the top-left, x grows right, y grows down.

use serde::{Deserialize, Serialize};

/// 2D position on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Linear interpolation towards `other`; `t` is not clamped.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Canvas dimensions in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or NaN.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn min_x(&self) -> f32 {
        self.x
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn min_y(&self) -> f32 {
        self.y
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive on all edges, so shared borders belong to both neighbours.
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Shrink by `padding` on every side. Collapses onto the center line
    /// instead of going negative.
    pub fn inset(&self, padding: f32) -> Self {
        let dx = padding.min(self.width / 2.0).max(0.0);
        let dy = padding.min(self.height / 2.0).max(0.0);
        Self::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    /// Nearest point inside the rectangle.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.min_x(), self.max_x()),
            point.y.clamp(self.min_y(), self.max_y()),
        )
    }

    /// Strict interior overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Point::new(10.0, 20.0);
        let b = Point::new(30.0, 60.0);
        assert_eq!(a.lerp(&b, 0.5), Point::new(20.0, 40.0));
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_empty_size() {
        assert!(Size::new(0.0, 100.0).is_empty());
        assert!(Size::new(100.0, -1.0).is_empty());
        assert!(Size::new(f32::NAN, 5.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_contains_edges() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(r.contains(&Point::new(0.0, 0.0)));
        assert!(r.contains(&Point::new(100.0, 50.0)));
        assert!(!r.contains(&Point::new(100.1, 10.0)));
    }

    #[test]
    fn test_inset_collapses() {
        let r = Rect::new(0.0, 0.0, 10.0, 100.0);
        let inner = r.inset(20.0);
        assert_eq!(inner.width, 0.0);
        assert_eq!(inner.x, 5.0);
        assert_eq!(inner.height, 60.0);
    }

    #[test]
    fn test_clamp_and_overlap() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert_eq!(r.clamp(Point::new(0.0, 50.0)), Point::new(10.0, 30.0));
        assert!(r.overlaps(&Rect::new(25.0, 25.0, 10.0, 10.0)));
        assert!(!r.overlaps(&Rect::new(30.0, 10.0, 10.0, 10.0)));
    }
}
