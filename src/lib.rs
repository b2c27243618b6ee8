//! A retained-mode control tree for editor-style applications.
//!
//! Controls live in a [`ControlTree`] arena. Each window has one root control; the [`Host`] owns
//! the tree, drains the platform’s native event queue, translates native events into
//! [`ControlEvent`]s for the controls they concern, and repaints every visible window once per
//! loop iteration.
//!
//! Platform window mechanics and drawing are external: implement [`Platform`] and [`Graphics`]
//! for a real backend, or use the [`headless`] ones.

pub mod backend;
pub mod behaviors;
pub mod color;
pub mod config;
pub mod control;
pub mod dock;
pub mod dpi;
pub mod error;
pub mod events;
pub mod focus;
pub mod headless;
mod host;
pub mod rect;
pub mod registry;
pub mod resources;
pub mod router;
pub mod scroll;
mod tree;

pub use backend::{Graphics, Platform, RenderTarget, WindowId};
pub use config::UiConfig;
pub use control::{ControlNode, Interactive, Paintable};
pub use error::{Result, UiError};
pub use events::{ControlEvent, EventKind, NativeEvent};
pub use host::Host;
pub use tree::{ControlId, ControlTree};
