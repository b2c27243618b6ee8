//! Traits for backends.
//!
//! A host talks to two collaborators: a [`Platform`] that owns real windows and the native event
//! queue, and a [`Graphics`] factory that creates one [`RenderTarget`] per window along with text
//! formats. Brushes are allocated by the render target they will be drawn on.

use crate::color::Color;
use crate::error::{BackendError, PlatformError};
use crate::events::NativeEvent;
use crate::rect::Rect;
use crate::resources::FontDescription;
use cgmath::{Point2, Vector2};
use core::any::Any;
use core::fmt;
use crossbeam::channel::Sender;
use std::sync::Arc;

/// The platform identity of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u32);

/// Where a platform pushes its native events.
pub type EventSender = Sender<NativeEvent>;

/// A windowing platform.
pub trait Platform {
    /// Connects the native event queue to a host.
    ///
    /// Every native event must be sent through `sender` in the order it occurred.
    fn attach(&mut self, sender: EventSender);

    /// Moves pending native events into the attached sender.
    ///
    /// Called once per main loop iteration; must not block.
    fn pump_events(&mut self) {}

    /// Creates and shows a window. The platform should report `WindowEvent::Shown` once the
    /// window has been realized.
    fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<WindowId, PlatformError>;

    /// Destroys a window.
    fn destroy_window(&mut self, window: WindowId);

    /// Raises a window.
    fn show_window(&mut self, _window: WindowId) {}

    fn set_window_title(&mut self, _window: WindowId, _title: &str) {}

    /// Returns the horizontal DPI of the display the window is on, if known.
    fn display_dpi(&self, window: WindowId) -> Option<f64>;

    /// Called once when the host shuts down.
    fn quit(&mut self) {}
}

/// An opaque drawing resource (a brush or a text format) owned by a backend.
pub trait Resource: Any + fmt::Debug + Send + Sync {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Releases the backend object.
    ///
    /// Called exactly once, by the cache that allocated the resource, when it is torn down.
    fn release(&self) {}
}

pub type Brush = Arc<dyn Resource>;
pub type TextFormat = Arc<dyn Resource>;

/// Parameters of a two-stop linear gradient brush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub start_color: Color,
    pub end_color: Color,
    pub start_point: Point2<f64>,
    pub end_point: Point2<f64>,
}

/// A segment of a path geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point2<f64>),
    LineTo(Point2<f64>),
    QuadTo(Point2<f64>, Point2<f64>),
    CubicTo(Point2<f64>, Point2<f64>, Point2<f64>),
    Close,
}

/// An arbitrary path geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Path {
        Path::default()
    }

    pub fn move_to(mut self, point: Point2<f64>) -> Path {
        self.segments.push(PathSegment::MoveTo(point));
        self
    }

    pub fn line_to(mut self, point: Point2<f64>) -> Path {
        self.segments.push(PathSegment::LineTo(point));
        self
    }

    pub fn close(mut self) -> Path {
        self.segments.push(PathSegment::Close);
        self
    }
}

/// A per-window drawing surface.
///
/// Dropping the render target releases it.
pub trait RenderTarget: fmt::Debug {
    /// Size in pixels.
    fn size(&self) -> Vector2<f64>;

    fn begin_draw(&mut self);

    /// Finishes a frame and presents it.
    fn end_draw(&mut self) -> Result<(), BackendError>;

    fn resize(&mut self, size: Vector2<f64>) -> Result<(), BackendError>;

    fn fill_rect(&mut self, rect: Rect, brush: &Brush);
    fn draw_rect(&mut self, rect: Rect, brush: &Brush, thickness: f64);
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, brush: &Brush);
    fn draw_rounded_rect(&mut self, rect: Rect, radius: f64, brush: &Brush, thickness: f64);
    fn fill_ellipse(&mut self, center: Point2<f64>, radii: Vector2<f64>, brush: &Brush);
    fn draw_ellipse(
        &mut self,
        center: Point2<f64>,
        radii: Vector2<f64>,
        brush: &Brush,
        thickness: f64,
    );
    fn fill_path(&mut self, path: &Path, brush: &Brush);
    fn draw_path(&mut self, path: &Path, brush: &Brush, thickness: f64);
    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>, brush: &Brush, thickness: f64);
    fn draw_text(&mut self, text: &str, format: &TextFormat, rect: Rect, brush: &Brush);

    fn create_solid_brush(&mut self, color: Color) -> Result<Brush, BackendError>;
    fn create_gradient_brush(&mut self, gradient: &LinearGradient) -> Result<Brush, BackendError>;
}

/// The shared graphics factory.
pub trait Graphics {
    /// Creates the render target for a window.
    fn create_render_target(
        &mut self,
        window: WindowId,
        size: Vector2<f64>,
    ) -> Result<Box<dyn RenderTarget>, BackendError>;

    fn create_text_format(&mut self, font: &FontDescription) -> Result<TextFormat, BackendError>;

    /// Measures laid-out text within a maximum size.
    fn measure_text(&self, text: &str, format: &TextFormat, max_size: Vector2<f64>)
        -> Vector2<f64>;

    /// Releases the factory. Called once when the host shuts down.
    fn release(&mut self) {}
}
