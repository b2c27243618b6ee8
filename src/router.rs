//! Translation of native events into control events.
//!
//! Every node is offered every event. A node acts on it only if it qualifies: pointer events need
//! the point inside the node and (for buttons) the node to be the topmost hit; key events need
//! the node to be the active control; window events need the node to be the window’s root.

use crate::backend::{Graphics, Platform, WindowId};
use crate::config::UiConfig;
use crate::dpi::{apply_dpi_scaling, scale_factor};
use crate::error::Result;
use crate::events::{
    ControlEvent, NativeEvent, Pointer, RawButton, RawKey, RawMotion, RawWheel, Scroll,
    WindowEvent,
};
use crate::focus::FocusTracker;
use crate::registry::WindowRegistry;
use crate::tree::{ControlId, ControlTree};
use cgmath::{Point2, Vector2};
use log::{debug, info, trace};

/// Borrows everything translation touches for the duration of one event.
pub struct EventRouter<'a> {
    pub tree: &'a mut ControlTree,
    pub registry: &'a mut WindowRegistry,
    pub focus: &'a mut FocusTracker,
    pub platform: &'a mut dyn Platform,
    pub graphics: &'a mut dyn Graphics,
    pub config: &'a UiConfig,
}

impl<'a> EventRouter<'a> {
    /// Translates a native event on a node, then offers it to each of its children.
    ///
    /// Fails with [`UiError::Disposed`](crate::error::UiError::Disposed) if the node is disposed.
    pub fn translate(&mut self, id: ControlId, event: &NativeEvent) -> Result<()> {
        let visible = self.tree.get(id)?.is_visible();

        match event {
            NativeEvent::Window { window, event } => {
                if self.registry.root(*window) == Some(id) {
                    self.window_event(id, *window, *event)?;
                }
                // window events only concern roots
                return Ok(());
            }
            NativeEvent::ButtonDown(raw) if visible => self.button_down(id, raw)?,
            NativeEvent::ButtonUp(raw) if visible => self.button_up(id, raw)?,
            NativeEvent::Motion(raw) if visible => self.motion(id, raw)?,
            NativeEvent::Wheel(raw) if visible => self.wheel(id, raw)?,
            NativeEvent::KeyDown(raw) => self.key(id, raw, true)?,
            NativeEvent::KeyUp(raw) => self.key(id, raw, false)?,
            NativeEvent::Quit => return Ok(()),
            // pointer events skip invisible subtrees
            _ => return Ok(()),
        }

        let children = match self.tree.get(id) {
            Ok(node) => node.children().to_vec(),
            Err(_) => return Ok(()),
        };
        for child in children {
            // a handler may have moved or disposed it
            if matches!(self.tree.parent(child), Ok(Some(parent)) if parent == id) {
                self.translate(child, event)?;
            }
        }
        Ok(())
    }

    fn window_event(&mut self, id: ControlId, window: WindowId, event: WindowEvent) -> Result<()> {
        match event {
            WindowEvent::Shown => {
                if self.tree.get(id)?.first_shown {
                    self.realize(id, window)?;
                }
                self.tree.set_visible(id, true)?;
                self.tree.emit(id, ControlEvent::Shown);
            }
            WindowEvent::FocusGained => {
                trace!("{:?} gained focus", window);
                self.registry.set_active(window);
            }
            WindowEvent::Hidden => self.tree.set_visible(id, false)?,
            WindowEvent::Resized { width, height } => {
                let scale = self.registry.dpi_scale(window);
                let size = Vector2::new(width * scale, height * scale);
                self.tree.set_size(id, size)?;
                if let Some(target) = self.registry.target_mut(window) {
                    target.resize(Vector2::new(width, height))?;
                }
                self.tree.emit(id, ControlEvent::WindowSizeChanged(size));
            }
            WindowEvent::Close => {
                info!("closing {:?}", window);
                let disposed = self.tree.dispose(id)?;
                self.focus.forget(&disposed);
                self.registry.destroy(window, &mut *self.platform);
            }
        }
        Ok(())
    }

    /// One-time setup of a root whose window has just been shown for the first time.
    fn realize(&mut self, id: ControlId, window: WindowId) -> Result<()> {
        let size = self.tree.get(id)?.size();
        self.registry
            .ensure_graphics(window, &mut *self.graphics, size)?;

        let scale = scale_factor(&*self.platform, window, self.config.reference_dpi);
        self.registry.set_dpi_scale(window, scale);
        apply_dpi_scaling(self.tree, id, scale)?;

        self.tree.get_mut(id)?.window = Some(window);
        self.tree.emit(id, ControlEvent::HandleCreated(window));

        self.tree.initialize(id, window)?;
        self.tree.get_mut(id)?.first_shown = false;

        if self.registry.active().is_none() {
            self.registry.set_active(window);
        }
        debug!("realized {:?} as {:?} at scale {}", id, window, scale);
        Ok(())
    }

    /// Maps a native point in a window to control coordinates.
    ///
    /// Returns `None` if the window has no root or has not been shown yet.
    pub fn to_local(&self, window: WindowId, x: f64, y: f64) -> Option<Point2<f64>> {
        let root = self.registry.root(window)?;
        let root_size = self.tree.get(root).ok()?.size();
        let target_size = self.registry.target_size(window)?;
        let scale = self.registry.dpi_scale(window);

        let ratio_x = if root_size.x > 0. { target_size.x / root_size.x } else { 1. };
        let ratio_y = if root_size.y > 0. { target_size.y / root_size.y } else { 1. };
        Some(Point2::new(x * ratio_x * scale, y * ratio_y * scale))
    }

    /// Visible descendants of a window's root that contain the point, topmost first.
    fn hits(&self, window: WindowId, point: Point2<f64>) -> Result<Vec<ControlId>> {
        let root = match self.registry.root(window) {
            Some(root) => root,
            None => return Ok(Vec::new()),
        };
        let mut hits = Vec::new();
        self.collect_hits(root, point, &mut hits)?;
        hits.reverse();
        // stable: among equal tab orders the later node stays first
        hits.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(hits.into_iter().map(|(_, id)| id).collect())
    }

    fn collect_hits(
        &self,
        id: ControlId,
        point: Point2<f64>,
        hits: &mut Vec<(i32, ControlId)>,
    ) -> Result<()> {
        for child in self.tree.children(id)? {
            let node = self.tree.get(*child)?;
            if !node.is_visible() {
                continue;
            }
            if node.bounds().contains(point) {
                hits.push((node.tab_order(), *child));
            }
            self.collect_hits(*child, point, hits)?;
        }
        Ok(())
    }

    /// True if the node is the topmost control of the window at the point, or nothing is there
    /// at all.
    pub fn is_top_selected(
        &self,
        id: ControlId,
        window: WindowId,
        point: Point2<f64>,
    ) -> Result<bool> {
        Ok(self.hits(window, point)?.first().map_or(true, |top| *top == id))
    }

    fn button_down(&mut self, id: ControlId, raw: &RawButton) -> Result<()> {
        let location = match self.to_local(raw.window, raw.x, raw.y) {
            Some(location) => location,
            None => return Ok(()),
        };
        let inside = self.tree.get(id)?.bounds().contains(location);
        if inside && self.is_top_selected(id, raw.window, location)? {
            let pointer = Pointer {
                location,
                window_location: Point2::new(raw.x, raw.y),
                button: Some(raw.button),
            };
            self.tree.deliver(id, ControlEvent::ButtonDown(pointer))?;
        }

        if let Ok(node) = self.tree.get_mut(id) {
            if node.scroll.is_active() {
                node.scroll.pointer_down(location);
            }
        }
        Ok(())
    }

    fn button_up(&mut self, id: ControlId, raw: &RawButton) -> Result<()> {
        let location = match self.to_local(raw.window, raw.x, raw.y) {
            Some(location) => location,
            None => return Ok(()),
        };
        let inside = self.tree.get(id)?.bounds().contains(location);
        let is_root = self.registry.is_root(id);
        let hits = self.hits(raw.window, location)?;

        if inside && hits.first().map_or(true, |top| *top == id) {
            let pointer = Pointer {
                location,
                window_location: Point2::new(raw.x, raw.y),
                button: Some(raw.button),
            };
            self.tree.deliver(id, ControlEvent::ButtonUp(pointer))?;
            if !is_root && self.tree.is_live(id) {
                self.focus.set(&*self.tree, id);
            }
        } else if !is_root && hits.is_empty() {
            // whichever control is hit claims focus itself, in one change
            self.focus.clear_if(&*self.tree, id);
        }

        if let Ok(node) = self.tree.get_mut(id) {
            node.scroll.pointer_up();
        }
        Ok(())
    }

    fn motion(&mut self, id: ControlId, raw: &RawMotion) -> Result<()> {
        let location = match self.to_local(raw.window, raw.x, raw.y) {
            Some(location) => location,
            None => return Ok(()),
        };
        let node = self.tree.get_mut(id)?;
        let inside = node.bounds().contains(location);
        let was_inside = node.has_entered;
        node.has_entered = inside;

        if inside {
            if !was_inside {
                self.tree.deliver(id, ControlEvent::Enter)?;
            }
            let pointer = Pointer {
                location,
                window_location: Point2::new(raw.x, raw.y),
                button: None,
            };
            self.tree.deliver(id, ControlEvent::Move(pointer))?;
        } else if was_inside {
            self.tree.deliver(id, ControlEvent::Leave)?;
        }

        let scrolled = match self.tree.get_mut(id) {
            Ok(node) if node.scroll.is_active() => node.scroll.pointer_moved(location),
            _ => None,
        };
        if let Some(value) = scrolled {
            self.tree.deliver(id, ControlEvent::ScrollChanged(value))?;
        }
        Ok(())
    }

    fn wheel(&mut self, id: ControlId, raw: &RawWheel) -> Result<()> {
        let location = match self.to_local(raw.window, raw.x, raw.y) {
            Some(location) => location,
            None => return Ok(()),
        };
        if !self.tree.get(id)?.bounds().contains(location) {
            return Ok(());
        }
        let scroll = Scroll {
            location,
            window_location: Point2::new(raw.x, raw.y),
            delta: raw.delta,
        };
        self.tree.deliver(id, ControlEvent::Wheel(scroll))?;

        let scrolled = match self.tree.get_mut(id) {
            Ok(node) if node.scroll.is_active() => node.scroll.wheel(raw.delta.y),
            _ => None,
        };
        if let Some(value) = scrolled {
            self.tree.deliver(id, ControlEvent::ScrollChanged(value))?;
        }
        Ok(())
    }

    fn key(&mut self, id: ControlId, raw: &RawKey, down: bool) -> Result<()> {
        if self.focus.active() != Some(id) {
            return Ok(());
        }
        let event = if down {
            ControlEvent::KeyDown((*raw).into())
        } else {
            ControlEvent::KeyUp((*raw).into())
        };
        self.tree.deliver(id, event)
    }
}
