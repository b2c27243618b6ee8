//! Controls: the state record every node carries, and the behaviors attached to it.
//!
//! A control does not subclass anything. Its look comes from a [`Paintable`] and its reactions
//! from an optional [`Interactive`]; both are plain trait objects stored next to the state.

use crate::backend::{Brush, Graphics, LinearGradient, RenderTarget, TextFormat, WindowId};
use crate::color::Color;
use crate::error::{Result, UiError};
use crate::events::ControlEvent;
use crate::rect::{Insets, Rect};
use crate::resources::{BrushSlot, CacheSet, FontDescription};
use crate::scroll::VerticalScroll;
use crate::tree::{ControlId, ControlTree};
use cgmath::{Point2, Vector2};
use core::fmt;

/// How a control’s border is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    None,
    Single,
    Rounded,
}

/// Visual attributes of a control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub background: Color,
    pub border: Color,
    pub font_color: Color,
    pub accent: Color,
    pub border_style: BorderStyle,
    pub padding: Insets,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            background: Color::WHITE,
            border: Color::rgba(0.6, 0.6, 0.6, 1.),
            font_color: Color::BLACK,
            accent: Color::rgba(0.2, 0.47, 0.84, 1.),
            border_style: BorderStyle::Rounded,
            padding: Insets::default(),
        }
    }
}

/// Tab order of controls that take no part in tab navigation.
pub const NO_TAB_ORDER: i32 = -1;

/// The state of one control in a [`ControlTree`].
pub struct ControlNode {
    pub(crate) id: ControlId,
    pub(crate) name: String,
    pub(crate) text: String,
    pub(crate) location: Point2<f64>,
    pub(crate) size: Vector2<f64>,
    pub style: Style,
    pub(crate) font: FontDescription,
    pub(crate) children: Vec<ControlId>,
    pub(crate) parent: Option<ControlId>,
    pub(crate) tab_order: i32,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    /// Platform identity; bound on roots once their window has been shown.
    pub(crate) window: Option<WindowId>,
    /// The window whose render target this control draws into.
    pub(crate) surface: Option<WindowId>,
    pub(crate) caches: Option<CacheSet>,
    pub scroll: VerticalScroll,
    pub(crate) first_shown: bool,
    pub(crate) has_entered: bool,
    pub(crate) disposed: bool,
    pub(crate) painter: Option<Box<dyn Paintable>>,
    pub(crate) behavior: Option<Box<dyn Interactive>>,
}

impl ControlNode {
    pub(crate) fn new(id: ControlId, font: FontDescription, scrollbar_width: f64) -> ControlNode {
        ControlNode {
            id,
            name: String::new(),
            text: String::new(),
            location: Point2::new(0., 0.),
            size: Vector2::new(0., 0.),
            style: Style::default(),
            font,
            children: Vec::new(),
            parent: None,
            tab_order: NO_TAB_ORDER,
            visible: true,
            enabled: true,
            window: None,
            surface: None,
            caches: None,
            scroll: VerticalScroll::new(scrollbar_width),
            first_shown: true,
            has_entered: false,
            disposed: false,
            painter: Some(Box::new(DefaultSkin)),
            behavior: None,
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> Point2<f64> {
        self.location
    }

    pub fn size(&self) -> Vector2<f64> {
        self.size
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    pub fn left(&self) -> f64 {
        self.location.x
    }

    pub fn top(&self) -> f64 {
        self.location.y
    }

    pub fn right(&self) -> f64 {
        self.location.x + self.size.x
    }

    pub fn bottom(&self) -> f64 {
        self.location.y + self.size.y
    }

    /// The control’s rectangle in window coordinates; used for hit testing.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.location, self.size)
    }

    /// The bounds minus padding.
    pub fn content_bounds(&self) -> Rect {
        self.style.padding.apply(self.bounds())
    }

    pub fn font(&self) -> &FontDescription {
        &self.font
    }

    pub fn children(&self) -> &[ControlId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ControlId> {
        self.parent
    }

    pub fn tab_order(&self) -> i32 {
        self.tab_order
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The bound platform window, if this is a realized root.
    pub fn window(&self) -> Option<WindowId> {
        self.window
    }

    /// True once resources have been propagated to this control.
    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn caches(&self) -> Option<&CacheSet> {
        self.caches.as_ref()
    }
}

impl fmt::Debug for ControlNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ControlNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bounds", &self.bounds())
            .field("tab_order", &self.tab_order)
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("window", &self.window)
            .field("children", &self.children)
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Dynamically computed corner radius for rounded borders.
pub fn corner_radius(bounds: Rect) -> f64 {
    const BASE_RADIUS: f64 = 6.;
    const SCALE_FACTOR: f64 = 0.15;
    const MAX_RADIUS: f64 = 24.;

    let min_dimension = bounds.width().min(bounds.height());
    let radius = (min_dimension * SCALE_FACTOR).ln();
    if radius.is_nan() {
        BASE_RADIUS
    } else {
        radius.max(BASE_RADIUS).min(MAX_RADIUS)
    }
}

/// Everything a [`Paintable`] may draw with.
pub struct PaintCx<'a> {
    pub node: &'a mut ControlNode,
    pub target: &'a mut dyn RenderTarget,
    pub graphics: &'a mut dyn Graphics,
}

impl<'a> PaintCx<'a> {
    fn caches(&mut self) -> Result<&mut CacheSet> {
        let id = self.node.id;
        self.node.caches.as_mut().ok_or(UiError::Uninitialized(id))
    }

    /// Returns a cached solid brush from one of the control’s caches.
    pub fn brush(&mut self, slot: BrushSlot, color: Color) -> Result<Brush> {
        let id = self.node.id;
        let caches = self.node.caches.as_mut().ok_or(UiError::Uninitialized(id))?;
        Ok(caches.brushes(slot).solid(&mut *self.target, color)?)
    }

    /// Returns a cached gradient brush from one of the control’s caches.
    pub fn gradient(&mut self, slot: BrushSlot, gradient: &LinearGradient) -> Result<Brush> {
        let id = self.node.id;
        let caches = self.node.caches.as_mut().ok_or(UiError::Uninitialized(id))?;
        Ok(caches.brushes(slot).gradient(&mut *self.target, gradient)?)
    }

    /// Returns the text format for the control’s font.
    pub fn text_format(&mut self) -> Result<TextFormat> {
        let font = self.node.font.clone();
        let id = self.node.id;
        let caches = self.node.caches.as_mut().ok_or(UiError::Uninitialized(id))?;
        Ok(caches.fonts.get(&mut *self.graphics, &font)?)
    }

    /// Measures text in the control’s font, constrained to its bounds.
    pub fn measure_text(&mut self, text: &str) -> Result<Vector2<f64>> {
        if text.is_empty() || self.node.font.size < f64::EPSILON {
            return Ok(Vector2::new(0., 0.));
        }
        let format = self.text_format()?;
        let max_size = self.node.size;
        Ok(self.graphics.measure_text(text, &format, max_size))
    }

    /// Fills a rectangle according to a border style.
    pub fn fill_style(
        &mut self,
        bounds: Rect,
        slot: BrushSlot,
        color: Color,
        style: BorderStyle,
    ) -> Result<()> {
        let brush = self.brush(slot, color)?;
        match style {
            BorderStyle::Rounded => {
                self.target
                    .fill_rounded_rect(bounds, corner_radius(bounds), &brush)
            }
            BorderStyle::Single | BorderStyle::None => self.target.fill_rect(bounds, &brush),
        }
        Ok(())
    }

    /// Strokes a border according to a border style.
    pub fn draw_border(
        &mut self,
        bounds: Rect,
        slot: BrushSlot,
        color: Color,
        style: BorderStyle,
    ) -> Result<()> {
        if style == BorderStyle::None {
            return Ok(());
        }
        let brush = self.brush(slot, color)?;
        let thickness = self.caches()?.brushes(slot).thickness;
        match style {
            BorderStyle::Rounded => self.target.draw_rounded_rect(
                bounds,
                corner_radius(bounds),
                &brush,
                thickness,
            ),
            BorderStyle::Single => self.target.draw_rect(bounds, &brush, thickness),
            BorderStyle::None => (),
        }
        Ok(())
    }

    /// Draws text in the control’s font and font color.
    pub fn draw_text(&mut self, text: &str, rect: Rect) -> Result<()> {
        let format = self.text_format()?;
        let color = self.node.style.font_color;
        let brush = self.brush(BrushSlot::Font, color)?;
        self.target.draw_text(text, &format, rect, &brush);
        Ok(())
    }

    /// Fills the background and draws the border using the control’s style.
    ///
    /// Disabled controls are drawn with a dimmed background.
    pub fn paint_default_background(&mut self) -> Result<()> {
        let bounds = self.node.bounds();
        let style = self.node.style;
        let background = if self.node.enabled {
            style.background
        } else {
            style.background.dimmed(0.3)
        };
        self.fill_style(bounds, BrushSlot::Control, background, style.border_style)?;
        self.draw_border(bounds, BrushSlot::Border, style.border, style.border_style)
    }
}

/// Paint hooks of a control, run in order `update`, `paint_background`, `paint` every frame.
pub trait Paintable: fmt::Debug {
    fn update(&mut self, _cx: &mut PaintCx) -> Result<()> {
        Ok(())
    }

    fn paint_background(&mut self, cx: &mut PaintCx) -> Result<()> {
        cx.paint_default_background()
    }

    fn paint(&mut self, _cx: &mut PaintCx) -> Result<()> {
        Ok(())
    }
}

/// Paints the style’s background and border and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSkin;

impl Paintable for DefaultSkin {}

/// What an [`Interactive`] gets to work with.
pub struct EventCx<'a> {
    pub tree: &'a mut ControlTree,
    pub control: ControlId,
}

/// Reactions of a control to the events the router delivers to it.
///
/// Runs before any registered [`EventHandler`](crate::events::EventHandler) for the same event.
pub trait Interactive: fmt::Debug {
    fn handle(&mut self, cx: &mut EventCx, event: &ControlEvent) -> Result<()>;
}

#[test]
fn test_corner_radius_is_clamped() {
    assert_eq!(corner_radius(Rect::from_edges(0., 0., 100., 30.)), 6.);
    assert_eq!(corner_radius(Rect::zero()), 6.);
    let huge = Rect::from_edges(0., 0., 1e12, 1e12);
    assert_eq!(corner_radius(huge), 24.);
}

#[test]
fn test_measure_text() {
    use crate::config::UiConfig;
    use crate::headless::HeadlessGraphics;

    let mut tree = ControlTree::new(&UiConfig::default());
    let id = tree.create_at(Point2::new(0., 0.), Vector2::new(100., 40.));
    tree.initialize(id, WindowId(1)).unwrap();
    let mut graphics = HeadlessGraphics::new();
    let mut target = graphics
        .create_render_target(WindowId(1), Vector2::new(100., 100.))
        .unwrap();

    let mut cx = PaintCx {
        node: tree.get_mut(id).unwrap(),
        target: &mut *target,
        graphics: &mut graphics,
    };
    assert_eq!(cx.measure_text("").unwrap(), Vector2::new(0., 0.));
    // four glyphs at half of 16
    assert_eq!(cx.measure_text("text").unwrap(), Vector2::new(32., 16.));
    assert_eq!(cx.measure_text("a much longer line").unwrap().x, 100.);
}
