//! Errors.

use crate::backend::WindowId;
use crate::tree::ControlId;
use thiserror::Error;

/// Errors raised by the control tree and the host.
#[derive(Debug, Error)]
pub enum UiError {
    /// The control was disposed and may no longer be used.
    #[error("control {0:?} has been disposed")]
    Disposed(ControlId),

    #[error("no such control: {0:?}")]
    NoSuchControl(ControlId),

    /// The control has no resources yet because its window hasn’t been shown.
    #[error("control {0:?} has not been initialized")]
    Uninitialized(ControlId),

    /// Attaching the child would make a control its own ancestor.
    #[error("adding {child:?} to {parent:?} would create a cycle")]
    Cycle { parent: ControlId, child: ControlId },

    #[error("no such window: {0:?}")]
    NoSuchWindow(WindowId),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Errors reported by a graphics backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// A brush, text format, or render target could not be created.
    #[error("failed to allocate {what}: {reason}")]
    Allocation { what: &'static str, reason: String },

    /// The device backing a render target went away.
    #[error("render target lost: {0}")]
    TargetLost(String),
}

/// Errors reported by a windowing platform.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("window creation failed: {0}")]
    WindowCreation(String),

    #[error("platform error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, UiError>;
