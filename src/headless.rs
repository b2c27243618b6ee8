//! A platform and graphics backend that draw nothing.
//!
//! Everything the backend is asked to do is written to a shared [`Journal`], so tests and
//! off-screen tooling can inspect it afterwards.

use crate::backend::{
    Brush, EventSender, Graphics, LinearGradient, Path, Platform, RenderTarget, Resource,
    TextFormat, WindowId,
};
use crate::color::Color;
use crate::error::{BackendError, PlatformError};
use crate::events::{NativeEvent, WindowEvent};
use crate::rect::Rect;
use crate::resources::FontDescription;
use cgmath::{Point2, Vector2};
use core::any::Any;
use log::trace;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// One recorded drawing operation.
///
/// `color` is the brush color for solid brushes and `None` for gradients.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Option<Color> },
    DrawRect { rect: Rect, color: Option<Color> },
    FillRoundedRect { rect: Rect, radius: f64, color: Option<Color> },
    DrawRoundedRect { rect: Rect, radius: f64, color: Option<Color> },
    FillEllipse { center: Point2<f64>, radii: Vector2<f64> },
    DrawEllipse { center: Point2<f64>, radii: Vector2<f64> },
    FillPath { segments: usize },
    DrawPath { segments: usize },
    DrawLine { from: Point2<f64>, to: Point2<f64> },
    DrawText { text: String, rect: Rect },
}

#[derive(Debug, Default)]
pub struct JournalState {
    /// Number of brushes and text formats created.
    pub allocations: usize,
    /// Number of brushes and text formats released.
    pub releases: usize,
    pub commands: Vec<DrawCommand>,
    /// Number of completed frames.
    pub frames: usize,
    pub render_targets: usize,
}

pub type Journal = Arc<Mutex<JournalState>>;

#[derive(Debug)]
enum Paint {
    Solid(Color),
    Gradient,
    /// A text format of the given font size.
    Text(f64),
}

#[derive(Debug)]
struct HeadlessResource {
    paint: Paint,
    journal: Journal,
}

impl Resource for HeadlessResource {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn release(&self) {
        self.journal.lock().releases += 1;
    }
}

fn brush_color(brush: &Brush) -> Option<Color> {
    match brush.as_any().downcast_ref::<HeadlessResource>() {
        Some(HeadlessResource {
            paint: Paint::Solid(color),
            ..
        }) => Some(*color),
        _ => None,
    }
}

/// A render target that records draw calls.
#[derive(Debug)]
pub struct RecordingTarget {
    window: WindowId,
    size: Vector2<f64>,
    journal: Journal,
    drawing: bool,
}

impl RecordingTarget {
    pub fn window(&self) -> WindowId {
        self.window
    }

    fn record(&mut self, command: DrawCommand) {
        self.journal.lock().commands.push(command);
    }

    fn allocate(&mut self, paint: Paint) -> Brush {
        self.journal.lock().allocations += 1;
        Arc::new(HeadlessResource {
            paint,
            journal: Arc::clone(&self.journal),
        })
    }
}

impl RenderTarget for RecordingTarget {
    fn size(&self) -> Vector2<f64> {
        self.size
    }

    fn begin_draw(&mut self) {
        self.drawing = true;
    }

    fn end_draw(&mut self) -> Result<(), BackendError> {
        if !self.drawing {
            return Err(BackendError::TargetLost("end_draw without begin_draw".into()));
        }
        self.drawing = false;
        self.journal.lock().frames += 1;
        Ok(())
    }

    fn resize(&mut self, size: Vector2<f64>) -> Result<(), BackendError> {
        self.size = size;
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, brush: &Brush) {
        let color = brush_color(brush);
        self.record(DrawCommand::FillRect { rect, color });
    }

    fn draw_rect(&mut self, rect: Rect, brush: &Brush, _: f64) {
        let color = brush_color(brush);
        self.record(DrawCommand::DrawRect { rect, color });
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, brush: &Brush) {
        let color = brush_color(brush);
        self.record(DrawCommand::FillRoundedRect { rect, radius, color });
    }

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f64, brush: &Brush, _: f64) {
        let color = brush_color(brush);
        self.record(DrawCommand::DrawRoundedRect { rect, radius, color });
    }

    fn fill_ellipse(&mut self, center: Point2<f64>, radii: Vector2<f64>, _: &Brush) {
        self.record(DrawCommand::FillEllipse { center, radii });
    }

    fn draw_ellipse(&mut self, center: Point2<f64>, radii: Vector2<f64>, _: &Brush, _: f64) {
        self.record(DrawCommand::DrawEllipse { center, radii });
    }

    fn fill_path(&mut self, path: &Path, _: &Brush) {
        let segments = path.segments.len();
        self.record(DrawCommand::FillPath { segments });
    }

    fn draw_path(&mut self, path: &Path, _: &Brush, _: f64) {
        let segments = path.segments.len();
        self.record(DrawCommand::DrawPath { segments });
    }

    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>, _: &Brush, _: f64) {
        self.record(DrawCommand::DrawLine { from, to });
    }

    fn draw_text(&mut self, text: &str, _: &TextFormat, rect: Rect, _: &Brush) {
        let text = text.to_string();
        self.record(DrawCommand::DrawText { text, rect });
    }

    fn create_solid_brush(&mut self, color: Color) -> Result<Brush, BackendError> {
        Ok(self.allocate(Paint::Solid(color)))
    }

    fn create_gradient_brush(&mut self, _: &LinearGradient) -> Result<Brush, BackendError> {
        Ok(self.allocate(Paint::Gradient))
    }
}

/// A graphics factory whose render targets record into one journal.
#[derive(Debug, Default)]
pub struct HeadlessGraphics {
    journal: Journal,
    released: bool,
}

impl HeadlessGraphics {
    pub fn new() -> HeadlessGraphics {
        HeadlessGraphics::default()
    }

    pub fn journal(&self) -> Journal {
        Arc::clone(&self.journal)
    }

    /// True once the host has released the factory.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Graphics for HeadlessGraphics {
    fn create_render_target(
        &mut self,
        window: WindowId,
        size: Vector2<f64>,
    ) -> Result<Box<dyn RenderTarget>, BackendError> {
        self.journal.lock().render_targets += 1;
        Ok(Box::new(RecordingTarget {
            window,
            size,
            journal: Arc::clone(&self.journal),
            drawing: false,
        }))
    }

    fn create_text_format(&mut self, font: &FontDescription) -> Result<TextFormat, BackendError> {
        self.journal.lock().allocations += 1;
        Ok(Arc::new(HeadlessResource {
            paint: Paint::Text(font.size),
            journal: Arc::clone(&self.journal),
        }))
    }

    /// Pretends every glyph is half as wide as the font is tall.
    fn measure_text(&self, text: &str, format: &TextFormat, max_size: Vector2<f64>) -> Vector2<f64> {
        let size = match format.as_any().downcast_ref::<HeadlessResource>() {
            Some(HeadlessResource {
                paint: Paint::Text(size),
                ..
            }) => *size,
            _ => 0.,
        };
        let width = text.chars().count() as f64 * size * 0.5;
        Vector2::new(width.min(max_size.x), size.min(max_size.y))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// State of a headless window.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindow {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Number of times the window was raised.
    pub raised: usize,
}

/// A platform without a display.
///
/// Native events are queued with [`HeadlessPlatform::push`] and handed to the host on the next
/// `pump_events`. Creating a window queues `Shown` and `FocusGained` for it.
#[derive(Debug)]
pub struct HeadlessPlatform {
    next_window: u32,
    windows: BTreeMap<WindowId, HeadlessWindow>,
    pending: VecDeque<NativeEvent>,
    sender: Option<EventSender>,
    /// The DPI every window reports; `None` means unknown.
    pub dpi: Option<f64>,
    quit: bool,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        HeadlessPlatform {
            next_window: 1,
            windows: BTreeMap::new(),
            pending: VecDeque::new(),
            sender: None,
            dpi: Some(96.),
            quit: false,
        }
    }
}

impl HeadlessPlatform {
    pub fn new() -> HeadlessPlatform {
        HeadlessPlatform::default()
    }

    /// A platform whose windows report the given DPI.
    pub fn with_dpi(dpi: f64) -> HeadlessPlatform {
        HeadlessPlatform {
            dpi: Some(dpi),
            ..HeadlessPlatform::default()
        }
    }

    /// Queues a native event.
    pub fn push(&mut self, event: NativeEvent) {
        self.pending.push_back(event);
    }

    pub fn window(&self, window: WindowId) -> Option<&HeadlessWindow> {
        self.windows.get(&window)
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn has_quit(&self) -> bool {
        self.quit
    }
}

impl Platform for HeadlessPlatform {
    fn attach(&mut self, sender: EventSender) {
        self.sender = Some(sender);
    }

    fn pump_events(&mut self) {
        let sender = match &self.sender {
            Some(sender) => sender,
            None => return,
        };
        while let Some(event) = self.pending.pop_front() {
            if sender.send(event).is_err() {
                break;
            }
        }
    }

    fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<WindowId, PlatformError> {
        if width == 0 || height == 0 {
            return Err(PlatformError::WindowCreation(format!(
                "invalid size {}x{}",
                width, height
            )));
        }
        let window = WindowId(self.next_window);
        self.next_window += 1;
        self.windows.insert(
            window,
            HeadlessWindow {
                title: title.to_string(),
                width,
                height,
                raised: 0,
            },
        );
        trace!("headless window {:?} created", window);
        self.push(NativeEvent::Window {
            window,
            event: WindowEvent::Shown,
        });
        self.push(NativeEvent::Window {
            window,
            event: WindowEvent::FocusGained,
        });
        Ok(window)
    }

    fn destroy_window(&mut self, window: WindowId) {
        self.windows.remove(&window);
    }

    fn show_window(&mut self, window: WindowId) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.raised += 1;
        }
    }

    fn set_window_title(&mut self, window: WindowId, title: &str) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.title = title.to_string();
        }
    }

    fn display_dpi(&self, window: WindowId) -> Option<f64> {
        if self.windows.contains_key(&window) {
            self.dpi
        } else {
            None
        }
    }

    fn quit(&mut self) {
        self.quit = true;
    }
}
