//! Reusable [`Interactive`] behaviors.

use crate::control::{EventCx, Interactive};
use crate::error::Result;
use crate::events::ControlEvent;
use cgmath::{Point2, Zero};

/// Lets the user drag a control, and everything on it, around its window.
///
/// A drag starts with a button press inside the control (unless the pointer is on its
/// scrollbar) and ends on button release or when the pointer leaves the control.
#[derive(Debug, Clone)]
pub struct Draggable {
    pub enabled: bool,
    dragging: bool,
    last: Point2<f64>,
}

impl Draggable {
    pub fn new() -> Draggable {
        Draggable {
            enabled: true,
            dragging: false,
            last: Point2::new(0., 0.),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

impl Default for Draggable {
    fn default() -> Self {
        Draggable::new()
    }
}

impl Interactive for Draggable {
    fn handle(&mut self, cx: &mut EventCx, event: &ControlEvent) -> Result<()> {
        match event {
            ControlEvent::ButtonDown(pointer) if self.enabled => {
                let node = cx.tree.get(cx.control)?;
                if node.scroll.is_active() && node.scroll.is_mouse_over() {
                    return Ok(());
                }
                if node.bounds().contains(pointer.location) {
                    self.dragging = true;
                    self.last = pointer.location;
                }
            }
            ControlEvent::Move(pointer) if self.enabled && self.dragging => {
                let offset = pointer.location - self.last;
                if !offset.is_zero() {
                    cx.tree.move_by(cx.control, offset)?;
                    self.last = pointer.location;
                }
            }
            ControlEvent::ButtonUp(_) | ControlEvent::Leave => self.dragging = false,
            _ => (),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NativeEvent, PointerButton, RawButton, RawMotion};
    use crate::headless::{HeadlessGraphics, HeadlessPlatform};
    use crate::host::Host;
    use cgmath::Vector2;

    #[test]
    fn dragging_moves_the_subtree() {
        let mut host = Host::new(HeadlessPlatform::new(), HeadlessGraphics::new());
        let root = host.create_window("drag", 800, 600).unwrap();
        let window = host.window_of(root).unwrap();
        host.poll().unwrap();

        let tree = host.tree_mut();
        let panel = tree.create_at(Point2::new(100., 100.), Vector2::new(200., 100.));
        let label = tree.create_at(Point2::new(110., 110.), Vector2::new(20., 20.));
        tree.add_child(root, panel).unwrap();
        tree.add_child(panel, label).unwrap();
        tree.set_behavior(panel, Box::new(Draggable::new())).unwrap();

        let press = |x, y| RawButton {
            window,
            x,
            y,
            button: PointerButton::Left,
        };
        let platform = host.platform_mut();
        platform.push(NativeEvent::ButtonDown(press(150., 150.)));
        platform.push(NativeEvent::Motion(RawMotion {
            window,
            x: 170.,
            y: 160.,
        }));
        platform.push(NativeEvent::ButtonUp(press(170., 160.)));
        platform.push(NativeEvent::Motion(RawMotion {
            window,
            x: 200.,
            y: 200.,
        }));
        host.poll().unwrap();

        assert_eq!(host.tree().get(panel).unwrap().location(), Point2::new(120., 110.));
        assert_eq!(host.tree().get(label).unwrap().location(), Point2::new(130., 120.));
    }

    #[test]
    fn disabled_or_released_drags_do_nothing() {
        let mut host = Host::new(HeadlessPlatform::new(), HeadlessGraphics::new());
        let root = host.create_window("drag", 800, 600).unwrap();
        let window = host.window_of(root).unwrap();
        host.poll().unwrap();

        let tree = host.tree_mut();
        let panel = tree.create_at(Point2::new(100., 100.), Vector2::new(200., 100.));
        tree.add_child(root, panel).unwrap();
        let mut draggable = Draggable::new();
        draggable.enabled = false;
        tree.set_behavior(panel, Box::new(draggable)).unwrap();

        host.platform_mut().push(NativeEvent::ButtonDown(RawButton {
            window,
            x: 150.,
            y: 150.,
            button: PointerButton::Left,
        }));
        host.platform_mut().push(NativeEvent::Motion(RawMotion {
            window,
            x: 180.,
            y: 180.,
        }));
        host.poll().unwrap();
        assert_eq!(host.tree().get(panel).unwrap().location(), Point2::new(100., 100.));
    }
}
