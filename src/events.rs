//! Events.
//!
//! Native events arrive from the platform in window coordinates; the router translates them into
//! [`ControlEvent`]s and publishes those into the per-control [`EventHandlers`] registry.

use crate::backend::WindowId;
use crate::tree::ControlId;
use cgmath::{Point2, Vector2};
use core::fmt;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Pointer buttons.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left = 1,
    Middle = 2,
    Right = 3,
    X1 = 4,
    X2 = 5,
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    /// Whether any shift key is pressed.
    pub shift: bool,

    /// Whether any control key is pressed.
    pub control: bool,

    /// Whether any alt key or option key is pressed.
    pub alt: bool,

    /// Whether any meta key or command key is pressed.
    pub meta: bool,
}

/// Window lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    Shown,
    FocusGained,
    Hidden,
    /// The window’s client area was resized (in platform units).
    Resized { width: f64, height: f64 },
    /// The user asked to close the window.
    Close,
}

/// A pointer button press or release as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawButton {
    pub window: WindowId,
    pub x: f64,
    pub y: f64,
    pub button: PointerButton,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMotion {
    pub window: WindowId,
    pub x: f64,
    pub y: f64,
}

/// A wheel event; `x` and `y` are the pointer position, `delta` the scroll amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawWheel {
    pub window: WindowId,
    pub x: f64,
    pub y: f64,
    pub delta: Vector2<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawKey {
    pub window: WindowId,
    /// Layout-independent key position.
    pub scancode: u32,
    /// Layout-dependent key symbol.
    pub keycode: i32,
    pub modifiers: KeyModifiers,
    pub repeat: bool,
}

/// An event from the native event queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeEvent {
    Window { window: WindowId, event: WindowEvent },
    ButtonDown(RawButton),
    ButtonUp(RawButton),
    Motion(RawMotion),
    Wheel(RawWheel),
    KeyDown(RawKey),
    KeyUp(RawKey),
    /// The application should shut down.
    Quit,
}

impl NativeEvent {
    /// The window this event belongs to, if any.
    pub fn window(&self) -> Option<WindowId> {
        match self {
            NativeEvent::Window { window, .. } => Some(*window),
            NativeEvent::ButtonDown(e) | NativeEvent::ButtonUp(e) => Some(e.window),
            NativeEvent::Motion(e) => Some(e.window),
            NativeEvent::Wheel(e) => Some(e.window),
            NativeEvent::KeyDown(e) | NativeEvent::KeyUp(e) => Some(e.window),
            NativeEvent::Quit => None,
        }
    }
}

/// A pointer event delivered to a control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Event location in the control coordinate system (scaled window pixels).
    pub location: Point2<f64>,

    /// Event location as reported by the platform.
    pub window_location: Point2<f64>,

    /// The button that changed; `None` for motion.
    pub button: Option<PointerButton>,
}

/// A scroll event delivered to a control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scroll {
    pub location: Point2<f64>,
    pub window_location: Point2<f64>,

    /// Scroll delta in wheel steps.
    pub delta: Vector2<f64>,
}

/// A key event delivered to the active control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub scancode: u32,
    pub keycode: i32,
    pub modifiers: KeyModifiers,
    pub repeat: bool,
}

impl From<RawKey> for Key {
    fn from(raw: RawKey) -> Self {
        Key {
            scancode: raw.scancode,
            keycode: raw.keycode,
            modifiers: raw.modifiers,
            repeat: raw.repeat,
        }
    }
}

/// Semantic events delivered to a control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    ButtonDown(Pointer),
    ButtonUp(Pointer),
    Move(Pointer),
    Enter,
    Leave,
    Wheel(Scroll),
    KeyDown(Key),
    KeyUp(Key),
    /// The process-wide active control changed; fired on the control that gained or lost it.
    ActiveControlChanged { active: Option<ControlId> },
    /// The control’s resources were created and propagated.
    Initialized,
    Shown,
    VisibleChanged(bool),
    /// A root was bound to its realized window.
    HandleCreated(WindowId),
    HandleDestroyed,
    WindowSizeChanged(Vector2<f64>),
    LocationChanged,
    SizeChanged,
    TextChanged,
    /// Fired every frame right before the control paints.
    Update,
    /// The attached scrollbar’s value changed.
    ScrollChanged(f64),
    Disposing,
}

/// List of event kinds.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    ButtonDown = 0,
    ButtonUp,
    Move,
    Enter,
    Leave,
    Wheel,
    KeyDown,
    KeyUp,
    ActiveControlChanged,
    Initialized,
    Shown,
    VisibleChanged,
    HandleCreated,
    HandleDestroyed,
    WindowSizeChanged,
    LocationChanged,
    SizeChanged,
    TextChanged,
    Update,
    ScrollChanged,
    Disposing,
}

impl EventKind {
    // smallest and largest values in Ord
    pub(crate) const MIN: Self = EventKind::ButtonDown;
    pub(crate) const MAX: Self = EventKind::Disposing;
}

impl ControlEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ControlEvent::ButtonDown(_) => EventKind::ButtonDown,
            ControlEvent::ButtonUp(_) => EventKind::ButtonUp,
            ControlEvent::Move(_) => EventKind::Move,
            ControlEvent::Enter => EventKind::Enter,
            ControlEvent::Leave => EventKind::Leave,
            ControlEvent::Wheel(_) => EventKind::Wheel,
            ControlEvent::KeyDown(_) => EventKind::KeyDown,
            ControlEvent::KeyUp(_) => EventKind::KeyUp,
            ControlEvent::ActiveControlChanged { .. } => EventKind::ActiveControlChanged,
            ControlEvent::Initialized => EventKind::Initialized,
            ControlEvent::Shown => EventKind::Shown,
            ControlEvent::VisibleChanged(_) => EventKind::VisibleChanged,
            ControlEvent::HandleCreated(_) => EventKind::HandleCreated,
            ControlEvent::HandleDestroyed => EventKind::HandleDestroyed,
            ControlEvent::WindowSizeChanged(_) => EventKind::WindowSizeChanged,
            ControlEvent::LocationChanged => EventKind::LocationChanged,
            ControlEvent::SizeChanged => EventKind::SizeChanged,
            ControlEvent::TextChanged => EventKind::TextChanged,
            ControlEvent::Update => EventKind::Update,
            ControlEvent::ScrollChanged(_) => EventKind::ScrollChanged,
            ControlEvent::Disposing => EventKind::Disposing,
        }
    }
}

/// A callback for control events.
pub struct EventHandler(Arc<Mutex<dyn FnMut(ControlId, &ControlEvent) + Send>>);

impl Clone for EventHandler {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl EventHandler {
    pub fn new<F: 'static + FnMut(ControlId, &ControlEvent) + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    fn call(&self, control: ControlId, event: &ControlEvent) {
        let mut handler = self.0.lock();
        (&mut *handler)(control, event);
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler")
    }
}

/// Refers to the handler list of one event kind on one control.
pub(crate) type HandlerId = (ControlId, EventKind);

/// Per-control, per-kind callback lists.
#[derive(Debug, Default)]
pub struct EventHandlers {
    map: BTreeMap<HandlerId, Vec<EventHandler>>,
}

impl EventHandlers {
    pub fn new() -> EventHandlers {
        EventHandlers {
            map: BTreeMap::new(),
        }
    }

    /// Appends a handler; handlers of one kind run in the order they were added.
    pub fn add_handler(&mut self, control: ControlId, kind: EventKind, handler: EventHandler) {
        self.map.entry((control, kind)).or_default().push(handler);
    }

    pub fn remove_handlers(&mut self, control: ControlId, kind: EventKind) {
        self.map.remove(&(control, kind));
    }

    /// Removes every handler of a control.
    pub(crate) fn remove_control(&mut self, control: ControlId) {
        let keys_to_remove: Vec<_> = self
            .map
            .range((control, EventKind::MIN)..=(control, EventKind::MAX))
            .map(|(k, _)| *k)
            .collect();
        for key in keys_to_remove {
            self.map.remove(&key);
        }
    }

    /// Calls every handler registered for this event on this control.
    pub fn emit(&self, control: ControlId, event: &ControlEvent) {
        if let Some(handlers) = self.map.get(&(control, event.kind())) {
            for handler in handlers {
                handler.call(control, event);
            }
        }
    }

    pub fn has_handlers(&self, control: ControlId, kind: EventKind) -> bool {
        self.map.get(&(control, kind)).map_or(false, |h| !h.is_empty())
    }
}

#[test]
fn test_handlers_by_kind() {
    let counter = Arc::new(Mutex::new(Vec::new()));
    let mut handlers = EventHandlers::new();
    let a = ControlId::from_raw(0);
    let b = ControlId::from_raw(1);

    let c = Arc::clone(&counter);
    handlers.add_handler(
        a,
        EventKind::Enter,
        EventHandler::new(move |id, event| c.lock().push((id, event.kind()))),
    );
    let c = Arc::clone(&counter);
    handlers.add_handler(
        a,
        EventKind::Leave,
        EventHandler::new(move |id, event| c.lock().push((id, event.kind()))),
    );

    handlers.emit(a, &ControlEvent::Enter);
    handlers.emit(b, &ControlEvent::Enter);
    handlers.emit(a, &ControlEvent::Shown);
    assert_eq!(*counter.lock(), vec![(a, EventKind::Enter)]);

    handlers.remove_control(a);
    handlers.emit(a, &ControlEvent::Leave);
    assert_eq!(counter.lock().len(), 1, "handlers are gone after removing the control");
    assert!(!handlers.has_handlers(a, EventKind::Enter));
}
