//! The window registry: which root belongs to which platform window.

use crate::backend::{Graphics, Platform, RenderTarget, WindowId};
use crate::error::{Result, UiError};
use crate::tree::ControlId;
use cgmath::Vector2;
use log::{debug, info};
use std::collections::BTreeMap;

#[derive(Debug)]
struct WindowEntry {
    root: ControlId,
    target: Option<Box<dyn RenderTarget>>,
    dpi_scale: f64,
}

/// Maps platform windows to their root controls and render targets.
///
/// Iteration is in window id order, i.e. creation order.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    entries: BTreeMap<WindowId, WindowEntry>,
    active: Option<WindowId>,
}

impl WindowRegistry {
    pub fn new() -> WindowRegistry {
        WindowRegistry::default()
    }

    pub fn register(&mut self, window: WindowId, root: ControlId) {
        debug!("registered {:?} with root {:?}", window, root);
        self.entries.insert(
            window,
            WindowEntry {
                root,
                target: None,
                dpi_scale: 1.,
            },
        );
    }

    pub fn root(&self, window: WindowId) -> Option<ControlId> {
        self.entries.get(&window).map(|entry| entry.root)
    }

    /// Returns the window whose root is `id`.
    pub fn window_of(&self, id: ControlId) -> Option<WindowId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.root == id)
            .map(|(window, _)| *window)
    }

    pub fn is_root(&self, id: ControlId) -> bool {
        self.window_of(id).is_some()
    }

    pub fn windows(&self) -> Vec<WindowId> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Creates the window’s render target if it doesn’t have one yet.
    pub fn ensure_graphics(
        &mut self,
        window: WindowId,
        graphics: &mut dyn Graphics,
        size: Vector2<f64>,
    ) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&window)
            .ok_or(UiError::NoSuchWindow(window))?;
        if entry.target.is_none() {
            entry.target = Some(graphics.create_render_target(window, size)?);
            debug!("created render target for {:?}", window);
        }
        Ok(())
    }

    pub fn has_graphics(&self, window: WindowId) -> bool {
        self.entries
            .get(&window)
            .map_or(false, |entry| entry.target.is_some())
    }

    pub fn target_mut(&mut self, window: WindowId) -> Option<&mut (dyn RenderTarget + 'static)> {
        self.entries
            .get_mut(&window)
            .and_then(|entry| entry.target.as_deref_mut())
    }

    pub fn target_size(&self, window: WindowId) -> Option<Vector2<f64>> {
        self.entries
            .get(&window)
            .and_then(|entry| entry.target.as_ref())
            .map(|target| target.size())
    }

    pub fn dpi_scale(&self, window: WindowId) -> f64 {
        self.entries.get(&window).map_or(1., |entry| entry.dpi_scale)
    }

    pub fn set_dpi_scale(&mut self, window: WindowId, scale: f64) {
        if let Some(entry) = self.entries.get_mut(&window) {
            entry.dpi_scale = scale;
        }
    }

    /// The window that last gained focus.
    pub fn active(&self) -> Option<WindowId> {
        self.active
    }

    pub fn set_active(&mut self, window: WindowId) {
        if self.entries.contains_key(&window) {
            self.active = Some(window);
        }
    }

    /// Unregisters a window, releases its render target, and destroys the platform window.
    ///
    /// Returns the root that belonged to it.
    pub fn destroy(&mut self, window: WindowId, platform: &mut dyn Platform) -> Option<ControlId> {
        let entry = self.entries.remove(&window)?;
        drop(entry.target);
        platform.destroy_window(window);
        if self.active == Some(window) {
            self.active = None;
        }
        info!("destroyed {:?}", window);
        Some(entry.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessGraphics, HeadlessPlatform};

    #[test]
    fn register_and_destroy() {
        let mut platform = HeadlessPlatform::new();
        let mut graphics = HeadlessGraphics::new();
        let window = platform.create_window("test", 100, 100).unwrap();
        let root = ControlId::from_raw(0);

        let mut registry = WindowRegistry::new();
        registry.register(window, root);
        assert_eq!(registry.root(window), Some(root));
        assert!(registry.is_root(root));
        assert!(!registry.has_graphics(window));

        registry
            .ensure_graphics(window, &mut graphics, Vector2::new(100., 100.))
            .unwrap();
        registry
            .ensure_graphics(window, &mut graphics, Vector2::new(100., 100.))
            .unwrap();
        assert_eq!(graphics.journal().lock().render_targets, 1);

        registry.set_active(window);
        assert_eq!(registry.destroy(window, &mut platform), Some(root));
        assert_eq!(registry.active(), None);
        assert!(registry.is_empty());
        assert_eq!(platform.window_count(), 0);
        assert!(registry.destroy(window, &mut platform).is_none());
    }

    #[test]
    fn graphics_for_unknown_window_fails() {
        let mut graphics = HeadlessGraphics::new();
        let mut registry = WindowRegistry::new();
        let result = registry.ensure_graphics(WindowId(5), &mut graphics, Vector2::new(1., 1.));
        assert!(matches!(result, Err(UiError::NoSuchWindow(_))));
    }
}
