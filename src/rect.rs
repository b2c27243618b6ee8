//! Rectangles.

use cgmath::{EuclideanSpace, Point2, Vector2, Zero};

/// A rectangle.
///
/// All control geometry lives in window coordinates: the origin is the top left corner of the
/// window’s content area and positive y points down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Vector2<f64>,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2<f64>, size: Vector2<f64>) -> Rect {
        Rect { origin, size }
    }

    /// Creates a rectangle from its edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Rect {
        Rect {
            origin: Point2::new(left, top),
            size: Vector2::new(right - left, bottom - top),
        }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size: Vector2::zero(),
        }
    }

    pub fn left(&self) -> f64 {
        self.origin.x
    }

    pub fn top(&self) -> f64 {
        self.origin.y
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.x
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.y
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// The left and top edges are inclusive, the right and bottom edges are not.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    /// Returns a new rectangle scaled about the coordinate origin.
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect {
            origin: Point2::from_vec(self.origin.to_vec() * factor),
            size: self.size * factor,
        }
    }
}

/// Padding on the four sides of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Insets {
    pub fn uniform(amount: f64) -> Insets {
        Insets {
            left: amount,
            top: amount,
            right: amount,
            bottom: amount,
        }
    }

    /// Shrinks a rectangle by these insets.
    pub fn apply(&self, rect: Rect) -> Rect {
        Rect::from_edges(
            rect.left() + self.left,
            rect.top() + self.top,
            rect.right() - self.right,
            rect.bottom() - self.bottom,
        )
    }
}

impl Default for Insets {
    fn default() -> Self {
        Insets::uniform(5.)
    }
}

#[test]
fn test_rect_edges_and_containment() {
    let rect = Rect::from_edges(10., 10., 110., 40.);
    assert_eq!(rect.width(), 100.);
    assert_eq!(rect.height(), 30.);
    assert_eq!((rect.right(), rect.bottom()), (110., 40.));

    assert!(rect.contains(Point2::new(50., 20.)));
    assert!(rect.contains(Point2::new(10., 10.)), "top left edge is inclusive");
    assert!(!rect.contains(Point2::new(110., 20.)), "right edge is exclusive");
    assert!(!Rect::zero().contains(Point2::new(0., 0.)), "empty rects contain nothing");
}

#[test]
fn test_rect_scaled_and_padded() {
    let rect = Rect::new(Point2::new(2., 4.), Vector2::new(10., 20.));
    assert_eq!(rect.scaled(2.), Rect::new(Point2::new(4., 8.), Vector2::new(20., 40.)));
    assert_eq!(Insets::uniform(1.).apply(rect), Rect::from_edges(3., 5., 11., 23.));
}
