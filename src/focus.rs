//! The active control.

use crate::error::Result;
use crate::events::ControlEvent;
use crate::tree::{ControlId, ControlTree};
use log::trace;

/// Tracks the one control that receives keyboard input.
///
/// Every actual change fires exactly one `ActiveControlChanged`: on the control that became
/// active, or on the control that lost it when the active control is cleared.
#[derive(Debug, Default)]
pub struct FocusTracker {
    active: Option<ControlId>,
}

impl FocusTracker {
    pub fn new() -> FocusTracker {
        FocusTracker::default()
    }

    pub fn active(&self) -> Option<ControlId> {
        self.active
    }

    /// Makes a control active. Returns false (and notifies nobody) if it already was.
    pub fn set(&mut self, tree: &ControlTree, id: ControlId) -> bool {
        if self.active == Some(id) {
            return false;
        }
        trace!("active control {:?} -> {:?}", self.active, id);
        self.active = Some(id);
        tree.emit(id, ControlEvent::ActiveControlChanged { active: Some(id) });
        true
    }

    /// Clears the active control if `id` holds it.
    pub fn clear_if(&mut self, tree: &ControlTree, id: ControlId) -> bool {
        if self.active != Some(id) {
            return false;
        }
        trace!("active control {:?} cleared", id);
        self.active = None;
        tree.emit(id, ControlEvent::ActiveControlChanged { active: None });
        true
    }

    /// Drops the active reference without notification if it is one of `ids`.
    ///
    /// Used when controls are disposed; their handlers are already gone.
    pub fn forget(&mut self, ids: &[ControlId]) {
        if let Some(active) = self.active {
            if ids.contains(&active) {
                self.active = None;
            }
        }
    }

    /// Moves focus to the next (or previous) control in tab order under `root`.
    ///
    /// Candidates are visible, enabled descendants with a non-negative tab order, ordered by tab
    /// order and then by tree order. Wraps around at either end. Returns the new active control.
    pub fn cycle(
        &mut self,
        tree: &ControlTree,
        root: ControlId,
        backwards: bool,
    ) -> Result<Option<ControlId>> {
        let mut candidates = Vec::new();
        for id in tree.descendants(root)? {
            let node = tree.get(id)?;
            if node.is_visible() && node.is_enabled() && node.tab_order() >= 0 {
                candidates.push((node.tab_order(), id));
            }
        }
        // stable, so equal tab orders keep tree order
        candidates.sort_by_key(|(tab_order, _)| *tab_order);

        if candidates.is_empty() {
            return Ok(None);
        }
        let count = candidates.len();
        let current = self
            .active
            .and_then(|active| candidates.iter().position(|(_, id)| *id == active));
        let next = match (current, backwards) {
            (Some(pos), false) => (pos + 1) % count,
            (Some(pos), true) => (pos + count - 1) % count,
            (None, false) => 0,
            (None, true) => count - 1,
        };

        let next = candidates[next].1;
        self.set(tree, next);
        Ok(Some(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::events::EventKind;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn set_and_clear_notify_once_per_change() {
        let mut tree = ControlTree::new(&UiConfig::default());
        let a = tree.create();
        let notes = Arc::new(Mutex::new(Vec::new()));
        let n = Arc::clone(&notes);
        tree.on(a, EventKind::ActiveControlChanged, move |_, event| {
            n.lock().push(*event)
        })
        .unwrap();

        let mut focus = FocusTracker::new();
        assert!(focus.set(&tree, a));
        assert!(!focus.set(&tree, a));
        assert!(focus.clear_if(&tree, a));
        assert!(!focus.clear_if(&tree, a));

        assert_eq!(
            *notes.lock(),
            vec![
                ControlEvent::ActiveControlChanged { active: Some(a) },
                ControlEvent::ActiveControlChanged { active: None },
            ]
        );
    }

    #[test]
    fn cycle_follows_tab_order() {
        let mut tree = ControlTree::new(&UiConfig::default());
        let root = tree.create();
        let second = tree.create();
        let first = tree.create();
        let skipped = tree.create();
        let hidden = tree.create();
        for id in &[second, first, skipped, hidden] {
            tree.add_child(root, *id).unwrap();
        }
        tree.set_tab_order(second, 2).unwrap();
        tree.set_tab_order(first, 1).unwrap();
        tree.set_tab_order(hidden, 0).unwrap();
        tree.set_visible(hidden, false).unwrap();

        let mut focus = FocusTracker::new();
        assert_eq!(focus.cycle(&tree, root, false).unwrap(), Some(first));
        assert_eq!(focus.cycle(&tree, root, false).unwrap(), Some(second));
        assert_eq!(focus.cycle(&tree, root, false).unwrap(), Some(first));
        assert_eq!(focus.cycle(&tree, root, true).unwrap(), Some(second));
    }
}
