//! Geometry primitives: [`Point`] and [`Range`].
//!
//! Coordinates are terminal cells: X grows right, Y grows down.

use std::fmt;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D integer point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return a point shifted by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle \[min, max). `min` is inclusive, `max` is exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// Create a new range from two corners, canonicalized so that
    /// `min` ≤ `max` on each axis.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// A range of the given size whose top-left corner is `origin`.
    #[inline]
    pub fn at(origin: Point, size: Point) -> Self {
        Self::new(origin.x, origin.y, origin.x + size.x, origin.y + size.y)
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    /// Whether the range has zero or negative area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Whether `p` is inside the half-open range.
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Intersection of two ranges; the zero range when they do not overlap.
    #[inline]
    pub fn intersect(self, other: Range) -> Self {
        let r = Self {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_empty() { Self::default() } else { r }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_canonicalizes_corners() {
        let r = Range::new(5, 4, 1, 2);
        assert_eq!(r.min, Point::new(1, 2));
        assert_eq!(r.max, Point::new(5, 4));
        assert_eq!(r.width(), 4);
    }

    #[test]
    fn contains_is_half_open() {
        let r = Range::at(Point::new(2, 3), Point::new(4, 2));
        assert!(r.contains(Point::new(2, 3)));
        assert!(r.contains(Point::new(5, 4)));
        assert!(!r.contains(Point::new(6, 4)));
        assert!(!r.contains(Point::new(5, 5)));
        assert!(!r.contains(Point::new(1, 3)));
    }

    #[test]
    fn intersect_clips_or_empties() {
        let a = Range::new(0, 0, 4, 4);
        let b = Range::new(2, 2, 6, 6);
        assert_eq!(a.intersect(b), Range::new(2, 2, 4, 4));
        assert_eq!(a.intersect(Range::new(10, 10, 12, 12)), Range::default());
    }
}
