//! The vertical scrollbar attached to every control.

use crate::backend::RenderTarget;
use crate::color::Color;
use crate::error::BackendError;
use crate::rect::Rect;
use crate::resources::CacheSet;
use cgmath::Point2;

const MIN_THUMB_HEIGHT: f64 = 20.;

/// A vertical scrollbar; hidden until its owner makes it visible.
#[derive(Debug, Clone)]
pub struct VerticalScroll {
    pub min: f64,
    pub max: f64,
    value: f64,
    pub visible: bool,
    pub enabled: bool,
    pub width: f64,
    pub background: Color,
    pub thumb: Color,
    bounds: Rect,
    dragging: bool,
    last_y: f64,
    mouse_over: bool,
}

impl VerticalScroll {
    pub fn new(width: f64) -> VerticalScroll {
        VerticalScroll {
            min: 0.,
            max: 100.,
            value: 0.,
            visible: false,
            enabled: true,
            width,
            background: Color::rgba(0.3, 0.3, 0.3, 1.),
            thumb: Color::rgba(0.6, 0.73, 0.89, 1.),
            bounds: Rect::zero(),
            dragging: false,
            last_y: 0.,
            mouse_over: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Sets the value, clamped to `[min, max]`. Returns true if it changed.
    pub fn set_value(&mut self, value: f64) -> bool {
        let value = value.max(self.min).min(self.max);
        if value != self.value {
            self.value = value;
            true
        } else {
            false
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// True if the scrollbar is shown and reacts to input.
    pub fn is_active(&self) -> bool {
        self.visible && self.enabled
    }

    pub fn is_mouse_over(&self) -> bool {
        self.mouse_over
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Places the scrollbar flush against the right edge of its owner, spanning its height.
    pub fn layout(&mut self, owner: Rect) {
        self.bounds = Rect::from_edges(
            owner.right() - self.width,
            owner.top(),
            owner.right(),
            owner.bottom(),
        );
    }

    pub fn thumb_rect(&self) -> Rect {
        let height = self.bounds.height();
        let range = self.max - self.min + height;
        let thumb_height = if range > 0. {
            (height * (height / range)).max(MIN_THUMB_HEIGHT)
        } else {
            MIN_THUMB_HEIGHT
        };
        let fraction = if self.max != 0. { self.value / self.max } else { 0. };
        let thumb_top = self.bounds.top() + fraction * (height - thumb_height);
        Rect::from_edges(
            self.bounds.left(),
            thumb_top,
            self.bounds.right(),
            thumb_top + thumb_height,
        )
    }

    /// Tracks whether the pointer is over the scrollbar. Returns the new value if a drag moved it.
    pub(crate) fn pointer_moved(&mut self, point: Point2<f64>) -> Option<f64> {
        self.mouse_over = self.bounds.contains(point);
        if !self.dragging {
            return None;
        }
        let delta = point.y - self.last_y;
        self.last_y = point.y;
        if self.set_value(self.value + delta) {
            Some(self.value)
        } else {
            None
        }
    }

    /// Starts a drag if the point is on the scrollbar. Returns true if it did.
    pub(crate) fn pointer_down(&mut self, point: Point2<f64>) -> bool {
        if self.bounds.contains(point) {
            self.dragging = true;
            self.last_y = point.y;
            true
        } else {
            false
        }
    }

    pub(crate) fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Scrolls by a wheel delta (positive scrolls up). Returns the new value if it changed.
    pub(crate) fn wheel(&mut self, steps: f64) -> Option<f64> {
        if self.set_value(self.value - steps) {
            Some(self.value)
        } else {
            None
        }
    }

    pub(crate) fn scale(&mut self, factor: f64) {
        self.width *= factor;
    }

    pub(crate) fn paint(
        &self,
        target: &mut dyn RenderTarget,
        caches: &mut CacheSet,
    ) -> Result<(), BackendError> {
        let background = caches.control.solid(target, self.background)?;
        target.fill_rect(self.bounds, &background);
        let thumb = caches.border.solid(target, self.thumb)?;
        target.fill_rect(self.thumb_rect(), &thumb);
        Ok(())
    }
}

#[test]
fn test_scroll_layout_and_thumb() {
    let mut scroll = VerticalScroll::new(15.);
    scroll.layout(Rect::from_edges(0., 0., 200., 100.));
    assert_eq!(scroll.bounds(), Rect::from_edges(185., 0., 200., 100.));

    // 100 * 100 / 200
    assert_eq!(scroll.thumb_rect().height(), 50.);
    assert_eq!(scroll.thumb_rect().top(), 0.);

    assert!(scroll.set_value(100.));
    assert_eq!(scroll.thumb_rect().bottom(), 100.);
    assert!(!scroll.set_value(250.), "clamped to max, unchanged");
}

#[test]
fn test_scroll_drag() {
    let mut scroll = VerticalScroll::new(15.);
    scroll.layout(Rect::from_edges(0., 0., 200., 100.));

    assert!(!scroll.pointer_down(Point2::new(10., 10.)));
    assert!(scroll.pointer_down(Point2::new(190., 10.)));
    assert_eq!(scroll.pointer_moved(Point2::new(190., 30.)), Some(20.));
    assert!(scroll.is_mouse_over());
    scroll.pointer_up();
    assert_eq!(scroll.pointer_moved(Point2::new(190., 60.)), None);
    assert_eq!(scroll.wheel(5.), Some(15.));
}
