#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Sizes are whole pixels (`u32`). Pointer coordinates are `f64` because
//! hosts commonly report sub-pixel positions.

use serde::{Deserialize, Serialize};

/// Axis along which a split layout arranges its items.
///
/// `Horizontal` places items side by side (the split axis is the width);
/// `Vertical` stacks them (the split axis is the height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The other axis.
    #[inline]
    #[must_use]
    pub const fn orthogonal(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Extent along the split axis of `orientation`.
    #[inline]
    #[must_use]
    pub const fn along(self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Extent across the split axis of `orientation`.
    #[inline]
    #[must_use]
    pub const fn across(self, orientation: Orientation) -> u32 {
        self.along(orientation.orthogonal())
    }

    /// Build dimensions from an extent along `orientation` and one across it.
    #[inline]
    #[must_use]
    pub const fn from_axes(orientation: Orientation, along: u32, across: u32) -> Self {
        match orientation {
            Orientation::Horizontal => Self::new(along, across),
            Orientation::Vertical => Self::new(across, along),
        }
    }
}

/// A pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Coordinate along the split axis of `orientation`.
    #[inline]
    #[must_use]
    pub const fn along(self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }
}

/// An axis-aligned rectangle in pixels, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given dimensions.
    #[inline]
    #[must_use]
    pub const fn from_dimensions(dimensions: Dimensions) -> Self {
        Self::new(0, 0, dimensions.width, dimensions.height)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= f64::from(self.x)
            && point.x < f64::from(self.right())
            && point.y >= f64::from(self.y)
            && point.y < f64::from(self.bottom())
    }

    /// Offset of `point` relative to the top-left corner.
    #[inline]
    #[must_use]
    pub fn relative(&self, point: Point) -> Point {
        Point::new(point.x - f64::from(self.x), point.y - f64::from(self.y))
    }

    /// Split off a leading slice of `extent` pixels along `orientation`.
    ///
    /// Returns `(leading, rest)`; `extent` saturates at the available size.
    #[must_use]
    pub fn split_along(&self, orientation: Orientation, extent: u32) -> (Rect, Rect) {
        match orientation {
            Orientation::Horizontal => {
                let first = extent.min(self.width);
                (
                    Rect::new(self.x, self.y, first, self.height),
                    Rect::new(
                        self.x.saturating_add(first),
                        self.y,
                        self.width - first,
                        self.height,
                    ),
                )
            }
            Orientation::Vertical => {
                let first = extent.min(self.height);
                (
                    Rect::new(self.x, self.y, self.width, first),
                    Rect::new(
                        self.x,
                        self.y.saturating_add(first),
                        self.width,
                        self.height - first,
                    ),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_flips_axis() {
        assert_eq!(Orientation::Horizontal.orthogonal(), Orientation::Vertical);
        assert_eq!(Orientation::Vertical.orthogonal(), Orientation::Horizontal);
    }

    #[test]
    fn orientation_serializes_screaming_case() {
        let json = serde_json::to_string(&Orientation::Horizontal).expect("serialize");
        assert_eq!(json, "\"HORIZONTAL\"");
        let parsed: Orientation = serde_json::from_str("\"VERTICAL\"").expect("deserialize");
        assert_eq!(parsed, Orientation::Vertical);
    }

    #[test]
    fn dimensions_axes() {
        let dims = Dimensions::new(800, 600);
        assert_eq!(dims.along(Orientation::Horizontal), 800);
        assert_eq!(dims.across(Orientation::Horizontal), 600);
        assert_eq!(dims.along(Orientation::Vertical), 600);
        assert_eq!(Dimensions::from_axes(Orientation::Vertical, 600, 800), dims);
        assert_eq!(Dimensions::from_axes(Orientation::Horizontal, 800, 600), dims);
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(10, 10, 20, 20);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(29.5, 29.5)));
        assert!(!r.contains(Point::new(30.0, 15.0)));
        assert!(!r.contains(Point::new(9.9, 15.0)));
    }

    #[test]
    fn rect_relative_offsets_from_origin() {
        let r = Rect::new(100, 50, 20, 20);
        assert_eq!(r.relative(Point::new(110.0, 55.0)), Point::new(10.0, 5.0));
    }

    #[test]
    fn split_along_saturates() {
        let r = Rect::new(0, 0, 100, 40);
        let (a, b) = r.split_along(Orientation::Horizontal, 30);
        assert_eq!(a, Rect::new(0, 0, 30, 40));
        assert_eq!(b, Rect::new(30, 0, 70, 40));

        let (a, b) = r.split_along(Orientation::Vertical, 100);
        assert_eq!(a, Rect::new(0, 0, 100, 40));
        assert!(b.is_empty());
    }
}
