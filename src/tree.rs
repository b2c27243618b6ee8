use crate::backend::{Graphics, RenderTarget, WindowId};
use crate::config::UiConfig;
use crate::control::{ControlNode, EventCx, Interactive, PaintCx, Paintable, Style};
use crate::error::{Result, UiError};
use crate::events::{ControlEvent, EventHandler, EventHandlers, EventKind};
use crate::resources::{CacheSet, FontDescription};
use cgmath::{Point2, Vector2};
use log::debug;

/// Index of a control in its tree’s arena.
///
/// Ids are never reused, so an id that outlives its control keeps referring to the disposed
/// tombstone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(u32);

impl ControlId {
    pub(crate) fn from_raw(index: u32) -> ControlId {
        ControlId(index)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A forest of controls stored in a flat arena.
///
/// Parent and child links are arena indices. Roots have no parent; a root becomes a window root
/// when the window registry binds it to a platform window.
#[derive(Debug)]
pub struct ControlTree {
    nodes: Vec<ControlNode>,
    handlers: EventHandlers,
    default_font: FontDescription,
    scrollbar_width: f64,
}

impl ControlTree {
    pub fn new(config: &UiConfig) -> ControlTree {
        ControlTree {
            nodes: Vec::new(),
            handlers: EventHandlers::new(),
            default_font: FontDescription {
                name: config.default_font.clone(),
                size: config.default_font_size,
                weight: config.default_font_weight,
                style: config.default_font_style,
            },
            scrollbar_width: config.scrollbar_width,
        }
    }

    /// Creates a detached control.
    pub fn create(&mut self) -> ControlId {
        let id = ControlId(self.nodes.len() as u32);
        self.nodes.push(ControlNode::new(
            id,
            self.default_font.clone(),
            self.scrollbar_width,
        ));
        id
    }

    /// Creates a detached control with the given geometry.
    pub fn create_at(&mut self, location: Point2<f64>, size: Vector2<f64>) -> ControlId {
        let id = self.create();
        let node = &mut self.nodes[id.index()];
        node.location = location;
        node.size = size;
        id
    }

    /// Returns a live control.
    pub fn get(&self, id: ControlId) -> Result<&ControlNode> {
        match self.nodes.get(id.index()) {
            Some(node) if node.disposed => Err(UiError::Disposed(id)),
            Some(node) => Ok(node),
            None => Err(UiError::NoSuchControl(id)),
        }
    }

    /// Returns a live control.
    pub fn get_mut(&mut self, id: ControlId) -> Result<&mut ControlNode> {
        match self.nodes.get_mut(id.index()) {
            Some(node) if node.disposed => Err(UiError::Disposed(id)),
            Some(node) => Ok(node),
            None => Err(UiError::NoSuchControl(id)),
        }
    }

    /// Returns true if the id refers to a control that hasn’t been disposed.
    pub fn is_live(&self, id: ControlId) -> bool {
        self.get(id).is_ok()
    }

    /// Number of live controls.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| !node.disposed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }

    /// Registers a callback for one kind of event on one control.
    pub fn on<F>(&mut self, id: ControlId, kind: EventKind, handler: F) -> Result<()>
    where
        F: 'static + FnMut(ControlId, &ControlEvent) + Send,
    {
        self.get(id)?;
        self.handlers
            .add_handler(id, kind, EventHandler::new(handler));
        Ok(())
    }

    pub fn set_painter(&mut self, id: ControlId, painter: Box<dyn Paintable>) -> Result<()> {
        self.get_mut(id)?.painter = Some(painter);
        Ok(())
    }

    pub fn set_behavior(&mut self, id: ControlId, behavior: Box<dyn Interactive>) -> Result<()> {
        self.get_mut(id)?.behavior = Some(behavior);
        Ok(())
    }

    pub(crate) fn emit(&self, id: ControlId, event: ControlEvent) {
        self.handlers.emit(id, &event);
    }

    /// Delivers an event to a control: its behavior runs first, then its registered handlers.
    pub(crate) fn deliver(&mut self, id: ControlId, event: ControlEvent) -> Result<()> {
        if let Some(mut behavior) = self.get_mut(id)?.behavior.take() {
            let result = behavior.handle(
                &mut EventCx {
                    tree: self,
                    control: id,
                },
                &event,
            );
            if let Ok(node) = self.get_mut(id) {
                if node.behavior.is_none() {
                    node.behavior = Some(behavior);
                }
            }
            result?;
        }
        self.handlers.emit(id, &event);
        Ok(())
    }

    // --- structure

    /// Appends `child` to `parent`’s children.
    ///
    /// A child that already has a parent is moved. If `parent` has already been initialized, the
    /// child subtree is initialized right away.
    pub fn add_child(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        self.get(parent)?;
        self.get(child)?;
        if child == parent || self.is_ancestor(child, parent) {
            return Err(UiError::Cycle { parent, child });
        }

        if let Some(old_parent) = self.nodes[child.index()].parent {
            self.remove_child(old_parent, child)?;
        }

        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);

        if let Some(surface) = self.nodes[parent.index()].surface {
            self.initialize(child, surface)?;
        }
        Ok(())
    }

    /// Removes `child` from `parent`. Returns false if it wasn’t a child of `parent`.
    pub fn remove_child(&mut self, parent: ControlId, child: ControlId) -> Result<bool> {
        let children = &mut self.get_mut(parent)?.children;
        match children.iter().position(|id| *id == child) {
            Some(pos) => {
                children.remove(pos);
                if let Some(node) = self.nodes.get_mut(child.index()) {
                    node.parent = None;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn parent(&self, id: ControlId) -> Result<Option<ControlId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: ControlId) -> Result<&[ControlId]> {
        Ok(&self.get(id)?.children)
    }

    /// Returns true if `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ControlId, id: ControlId) -> bool {
        let mut current = self.nodes.get(id.index()).and_then(|node| node.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes.get(parent.index()).and_then(|node| node.parent);
        }
        false
    }

    /// Returns the topmost ancestor of a control (or the control itself).
    pub fn root_of(&self, id: ControlId) -> Result<ControlId> {
        let mut current = id;
        while let Some(parent) = self.get(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Collects all descendants of a control in pre-order, not including the control itself.
    pub fn descendants(&self, id: ControlId) -> Result<Vec<ControlId>> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out)?;
        Ok(out)
    }

    fn collect_descendants(&self, id: ControlId, out: &mut Vec<ControlId>) -> Result<()> {
        for child in &self.get(id)?.children {
            out.push(*child);
            self.collect_descendants(*child, out)?;
        }
        Ok(())
    }

    /// Moves a non-root control to the end of its parent’s children, so that it paints last and
    /// wins hit tests against siblings with the same tab order.
    pub fn bring_to_front(&mut self, id: ControlId) -> Result<()> {
        if let Some(parent) = self.get(id)?.parent {
            let children = &mut self.nodes[parent.index()].children;
            children.retain(|child| *child != id);
            children.push(id);
        }
        Ok(())
    }

    /// Moves a non-root control to the start of its parent’s children.
    pub fn send_to_back(&mut self, id: ControlId) -> Result<()> {
        if let Some(parent) = self.get(id)?.parent {
            let children = &mut self.nodes[parent.index()].children;
            children.retain(|child| *child != id);
            children.insert(0, id);
        }
        Ok(())
    }

    // --- attributes

    pub fn set_location(&mut self, id: ControlId, location: Point2<f64>) -> Result<()> {
        let node = self.get_mut(id)?;
        if node.location != location {
            node.location = location;
            self.emit(id, ControlEvent::LocationChanged);
        }
        Ok(())
    }

    pub fn set_size(&mut self, id: ControlId, size: Vector2<f64>) -> Result<()> {
        let node = self.get_mut(id)?;
        if node.size != size {
            node.size = size;
            self.emit(id, ControlEvent::SizeChanged);
        }
        Ok(())
    }

    /// Moves a control and all of its descendants.
    pub fn move_by(&mut self, id: ControlId, offset: Vector2<f64>) -> Result<()> {
        let mut ids = self.descendants(id)?;
        ids.insert(0, id);
        for id in ids {
            let location = self.get(id)?.location + offset;
            self.set_location(id, location)?;
        }
        Ok(())
    }

    pub fn set_visible(&mut self, id: ControlId, visible: bool) -> Result<()> {
        let node = self.get_mut(id)?;
        if node.visible != visible {
            node.visible = visible;
            self.emit(id, ControlEvent::VisibleChanged(visible));
        }
        Ok(())
    }

    pub fn set_enabled(&mut self, id: ControlId, enabled: bool) -> Result<()> {
        self.get_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn set_text(&mut self, id: ControlId, text: &str) -> Result<()> {
        let node = self.get_mut(id)?;
        if node.text != text {
            node.text = text.to_string();
            self.emit(id, ControlEvent::TextChanged);
        }
        Ok(())
    }

    pub fn set_name(&mut self, id: ControlId, name: &str) -> Result<()> {
        self.get_mut(id)?.name = name.to_string();
        Ok(())
    }

    pub fn set_tab_order(&mut self, id: ControlId, tab_order: i32) -> Result<()> {
        self.get_mut(id)?.tab_order = tab_order;
        Ok(())
    }

    pub fn set_style(&mut self, id: ControlId, style: Style) -> Result<()> {
        self.get_mut(id)?.style = style;
        Ok(())
    }

    pub fn set_font(&mut self, id: ControlId, font: FontDescription) -> Result<()> {
        let node = self.get_mut(id)?;
        if let Some(caches) = node.caches.as_mut() {
            caches.fonts.font = font.clone();
        }
        node.font = font;
        Ok(())
    }

    // --- lifecycle

    /// Creates resource caches for a control and every descendant, binding them to the render
    /// target of `surface`.
    ///
    /// Existing caches are released first, so this may be called again after a window has been
    /// re-realized.
    pub fn initialize(&mut self, id: ControlId, surface: WindowId) -> Result<()> {
        let node = self.get_mut(id)?;
        if let Some(mut caches) = node.caches.take() {
            caches.release();
        }
        node.caches = Some(CacheSet::new(node.font.clone()));
        node.surface = Some(surface);
        if node.name.is_empty() {
            node.name = format!("control{}", id.0);
        }

        let children = node.children.clone();
        for child in children {
            self.initialize(child, surface)?;
            self.nodes[child.index()].first_shown = false;
        }

        debug!("initialized {:?} on {:?}", id, surface);
        self.emit(id, ControlEvent::Initialized);
        Ok(())
    }

    /// Paints a control and its subtree.
    ///
    /// Invisible controls and controls without a render target are skipped along with their
    /// subtree. Order: the `Update` event, then `update`, `paint_background` and `paint`, then
    /// the children in order, then the scrollbar if visible.
    pub fn paint(
        &mut self,
        id: ControlId,
        target: &mut dyn RenderTarget,
        graphics: &mut dyn Graphics,
    ) -> Result<()> {
        let node = self.get(id)?;
        if !node.visible || node.surface.is_none() {
            return Ok(());
        }

        self.emit(id, ControlEvent::Update);

        let node = &mut self.nodes[id.index()];
        let mut painter = node.painter.take();
        let result = match painter.as_mut() {
            Some(painter) => {
                let mut cx = PaintCx {
                    node: &mut *node,
                    target: &mut *target,
                    graphics: &mut *graphics,
                };
                painter
                    .update(&mut cx)
                    .and_then(|_| painter.paint_background(&mut cx))
                    .and_then(|_| painter.paint(&mut cx))
            }
            None => Ok(()),
        };
        node.painter = painter;
        result?;

        let children = node.children.clone();
        for child in children {
            self.paint(child, target, graphics)?;
        }

        let node = &mut self.nodes[id.index()];
        if node.scroll.visible {
            let bounds = node.bounds();
            node.scroll.layout(bounds);
            if let Some(caches) = node.caches.as_mut() {
                node.scroll.paint(target, caches)?;
            }
        }
        Ok(())
    }

    /// Disposes a control and its subtree: fires `Disposing`, releases all caches, detaches it
    /// from its parent, and drops its handlers.
    ///
    /// Returns the ids that were disposed; disposing twice is a no-op.
    pub fn dispose(&mut self, id: ControlId) -> Result<Vec<ControlId>> {
        let mut disposed = Vec::new();
        match self.nodes.get(id.index()) {
            Some(node) if node.disposed => return Ok(disposed),
            Some(_) => (),
            None => return Err(UiError::NoSuchControl(id)),
        }

        if let Some(parent) = self.nodes[id.index()].parent {
            self.remove_child(parent, id)?;
        }
        self.dispose_subtree(id, &mut disposed);
        debug!("disposed {} control(s) under {:?}", disposed.len(), id);
        Ok(disposed)
    }

    fn dispose_subtree(&mut self, id: ControlId, disposed: &mut Vec<ControlId>) {
        self.emit(id, ControlEvent::Disposing);

        let children = std::mem::replace(&mut self.nodes[id.index()].children, Vec::new());
        for child in children {
            self.nodes[child.index()].parent = None;
            self.dispose_subtree(child, disposed);
        }

        let node = &mut self.nodes[id.index()];
        if let Some(mut caches) = node.caches.take() {
            caches.release();
        }
        node.surface = None;
        node.visible = false;
        node.enabled = false;
        node.painter = None;
        node.behavior = None;
        let had_window = node.window.take().is_some();
        if had_window {
            self.emit(id, ControlEvent::HandleDestroyed);
        }

        self.handlers.remove_control(id);
        self.nodes[id.index()].disposed = true;
        disposed.push(id);
    }
}
