use crate::backend::{EventSender, Graphics, Platform, WindowId};
use crate::config::UiConfig;
use crate::error::{Result, UiError};
use crate::events::NativeEvent;
use crate::focus::FocusTracker;
use crate::registry::WindowRegistry;
use crate::router::EventRouter;
use crate::tree::{ControlId, ControlTree};
use cgmath::{Point2, Vector2};
use crossbeam::channel::{self, Receiver, TryRecvError};
use log::{debug, info, warn};

/// Connects control trees to a windowing platform and a graphics backend.
///
/// The host owns the tree, the window registry, and the active control. It runs the main loop:
/// drain the native event queue, translate every event, then repaint every visible window.
pub struct Host<P: Platform, G: Graphics> {
    tree: ControlTree,
    registry: WindowRegistry,
    focus: FocusTracker,
    platform: P,
    graphics: G,
    config: UiConfig,
    event_sender: EventSender,
    event_recv: Receiver<NativeEvent>,
    shut_down: bool,
}

impl<P: Platform, G: Graphics> Host<P, G> {
    /// Creates a new Host with the default configuration.
    pub fn new(platform: P, graphics: G) -> Host<P, G> {
        Host::with_config(platform, graphics, UiConfig::default())
    }

    pub fn with_config(mut platform: P, graphics: G, config: UiConfig) -> Host<P, G> {
        let (event_sender, event_recv) = channel::unbounded();
        platform.attach(event_sender.clone());

        Host {
            tree: ControlTree::new(&config),
            registry: WindowRegistry::new(),
            focus: FocusTracker::new(),
            platform,
            graphics,
            config,
            event_sender,
            event_recv,
            shut_down: false,
        }
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ControlTree {
        &mut self.tree
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn focus(&self) -> &FocusTracker {
        &self.focus
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn graphics(&self) -> &G {
        &self.graphics
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Returns a sender that feeds the native event queue, e.g. for synthesized events.
    pub fn event_sender(&self) -> EventSender {
        self.event_sender.clone()
    }

    /// Creates a platform window and its root control.
    ///
    /// The root is not bound to the window until the platform reports it as shown.
    pub fn create_window(&mut self, title: &str, width: u32, height: u32) -> Result<ControlId> {
        let window = self.platform.create_window(title, width, height)?;
        let root = self.tree.create_at(
            Point2::new(0., 0.),
            Vector2::new(f64::from(width), f64::from(height)),
        );
        self.tree.set_text(root, title)?;
        self.tree.set_name(root, title)?;
        self.registry.register(window, root);
        info!("created {:?} ({}x{}) with root {:?}", window, width, height, root);
        Ok(root)
    }

    /// Returns the window a root is registered with.
    pub fn window_of(&self, root: ControlId) -> Option<WindowId> {
        self.registry.window_of(root)
    }

    /// Sets a control’s text; the text of a root is also its window title.
    pub fn set_text(&mut self, id: ControlId, text: &str) -> Result<()> {
        self.tree.set_text(id, text)?;
        if let Some(window) = self.registry.window_of(id) {
            self.platform.set_window_title(window, text);
        }
        Ok(())
    }

    /// Raises a window and makes it the active window.
    pub fn activate_window(&mut self, window: WindowId) -> Result<()> {
        if self.registry.root(window).is_none() {
            return Err(UiError::NoSuchWindow(window));
        }
        self.platform.show_window(window);
        self.registry.set_active(window);
        Ok(())
    }

    /// The control that receives keyboard input.
    pub fn active_control(&self) -> Option<ControlId> {
        self.focus.active()
    }

    /// Moves the active control to the next control in tab order in a window.
    pub fn focus_next(&mut self, window: WindowId, backwards: bool) -> Result<Option<ControlId>> {
        let root = self
            .registry
            .root(window)
            .ok_or(UiError::NoSuchWindow(window))?;
        self.focus.cycle(&self.tree, root, backwards)
    }

    fn router(&mut self) -> EventRouter<'_> {
        EventRouter {
            tree: &mut self.tree,
            registry: &mut self.registry,
            focus: &mut self.focus,
            platform: &mut self.platform,
            graphics: &mut self.graphics,
            config: &self.config,
        }
    }

    /// Translates a native event on a control and its subtree.
    pub fn translate(&mut self, id: ControlId, event: &NativeEvent) -> Result<()> {
        self.router().translate(id, event)
    }

    /// Sends an event to the roots it concerns: pointer and window events go to the root of their
    /// window, key events to every root.
    fn dispatch(&mut self, event: &NativeEvent) -> Result<()> {
        let roots: Vec<ControlId> = match event {
            NativeEvent::KeyDown(_) | NativeEvent::KeyUp(_) => self
                .registry
                .windows()
                .into_iter()
                .filter_map(|window| self.registry.root(window))
                .collect(),
            _ => match event.window().and_then(|window| self.registry.root(window)) {
                Some(root) => vec![root],
                None => {
                    debug!("dropping event for unknown window: {:?}", event);
                    Vec::new()
                }
            },
        };

        for root in roots {
            if self.tree.is_live(root) {
                self.translate(root, event)?;
            }
        }
        Ok(())
    }

    /// Receives all events from the event queue and updates the trees accordingly.
    ///
    /// Returns false once the host has shut down.
    pub fn poll(&mut self) -> Result<bool> {
        if self.shut_down {
            return Ok(false);
        }
        self.platform.pump_events();
        loop {
            match self.event_recv.try_recv() {
                Ok(NativeEvent::Quit) => {
                    info!("quit requested");
                    self.shutdown();
                    return Ok(false);
                }
                Ok(event) => self.dispatch(&event)?,
                Err(TryRecvError::Empty) => break,
                // the host holds a sender itself
                Err(TryRecvError::Disconnected) => break,
            }
        }
        Ok(true)
    }

    /// Paints every visible window that has a render target.
    pub fn paint(&mut self) -> Result<()> {
        for window in self.registry.windows() {
            let root = match self.registry.root(window) {
                Some(root) => root,
                None => continue,
            };
            if !self.tree.get(root)?.is_visible() {
                continue;
            }
            let target = match self.registry.target_mut(window) {
                Some(target) => target,
                None => continue,
            };
            target.begin_draw();
            self.tree.paint(root, target, &mut self.graphics)?;
            target.end_draw()?;
        }
        Ok(())
    }

    /// Runs the main loop until every window is closed or the platform asks to quit.
    pub fn run(&mut self) -> Result<()> {
        info!("running with {} window(s)", self.registry.len());
        while !self.registry.is_empty() {
            if !self.poll()? {
                break;
            }
            self.paint()?;
        }
        self.shutdown();
        Ok(())
    }

    /// Disposes a window’s controls and destroys the window.
    pub fn destroy_window(&mut self, window: WindowId) -> Result<()> {
        let root = self
            .registry
            .root(window)
            .ok_or(UiError::NoSuchWindow(window))?;
        let disposed = self.tree.dispose(root)?;
        self.focus.forget(&disposed);
        self.registry.destroy(window, &mut self.platform);
        Ok(())
    }

    /// Disposes every root, destroys every window, and releases the graphics factory.
    ///
    /// Happens once; later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        for window in self.registry.windows() {
            if let Err(err) = self.destroy_window(window) {
                warn!("failed to destroy {:?}: {}", window, err);
            }
        }
        self.graphics.release();
        self.platform.quit();
        info!("host shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl<P: Platform, G: Graphics> Drop for Host<P, G> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{
        ControlEvent, EventKind, PointerButton, RawButton, RawKey, RawMotion, RawWheel,
        WindowEvent,
    };
    use crate::headless::{HeadlessGraphics, HeadlessPlatform};
    use parking_lot::Mutex;
    use std::sync::Arc;

    type TestHost = Host<HeadlessPlatform, HeadlessGraphics>;
    type Log = Arc<Mutex<Vec<(ControlId, ControlEvent)>>>;

    fn shown_host(platform: HeadlessPlatform) -> (TestHost, ControlId, WindowId) {
        let mut host = Host::new(platform, HeadlessGraphics::new());
        let root = host.create_window("test", 800, 600).unwrap();
        let window = host.window_of(root).unwrap();
        assert!(host.poll().unwrap());
        (host, root, window)
    }

    fn button(host: &mut TestHost, parent: ControlId, tab_order: i32) -> ControlId {
        let tree = host.tree_mut();
        let id = tree.create_at(Point2::new(10., 10.), Vector2::new(100., 30.));
        tree.set_tab_order(id, tab_order).unwrap();
        tree.add_child(parent, id).unwrap();
        id
    }

    fn record(host: &mut TestHost, id: ControlId, kinds: &[EventKind]) -> Log {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        for kind in kinds {
            let log = Arc::clone(&log);
            host.tree_mut()
                .on(id, *kind, move |id, event| log.lock().push((id, *event)))
                .unwrap();
        }
        log
    }

    fn kinds(log: &Log) -> Vec<(ControlId, EventKind)> {
        log.lock().iter().map(|(id, e)| (*id, e.kind())).collect()
    }

    fn click(host: &mut TestHost, window: WindowId, x: f64, y: f64) {
        let raw = RawButton {
            window,
            x,
            y,
            button: PointerButton::Left,
        };
        host.platform_mut().push(NativeEvent::ButtonDown(raw));
        host.platform_mut().push(NativeEvent::ButtonUp(raw));
        host.poll().unwrap();
    }

    fn motion(host: &mut TestHost, window: WindowId, x: f64, y: f64) {
        host.platform_mut()
            .push(NativeEvent::Motion(RawMotion { window, x, y }));
    }

    #[test]
    fn first_show_binds_and_initializes() {
        let mut host = Host::new(HeadlessPlatform::new(), HeadlessGraphics::new());
        let root = host.create_window("main", 800, 600).unwrap();
        let child = host
            .tree_mut()
            .create_at(Point2::new(0., 0.), Vector2::new(10., 10.));
        host.tree_mut().add_child(root, child).unwrap();
        let log = record(
            &mut host,
            root,
            &[EventKind::HandleCreated, EventKind::Initialized, EventKind::Shown],
        );
        assert!(host.tree().get(root).unwrap().window().is_none(), "binding is deferred");
        assert!(!host.tree().get(child).unwrap().is_initialized());

        host.poll().unwrap();
        let window = host.window_of(root).unwrap();
        assert_eq!(host.tree().get(root).unwrap().window(), Some(window));
        assert!(host.tree().get(child).unwrap().is_initialized());
        assert_eq!(host.registry().active(), Some(window));
        assert_eq!(
            kinds(&log),
            vec![
                (root, EventKind::HandleCreated),
                (root, EventKind::Initialized),
                (root, EventKind::Shown)
            ]
        );

        host.set_text(root, "renamed").unwrap();
        assert_eq!(host.platform().window(window).unwrap().title, "renamed");
    }

    #[test]
    fn click_reaches_only_the_top_control() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        let a = button(&mut host, root, 1);
        let b = button(&mut host, root, 2);
        let kinds_of_interest = [EventKind::ButtonDown, EventKind::ButtonUp];
        let log_a = record(&mut host, a, &kinds_of_interest);
        let log_b = record(&mut host, b, &kinds_of_interest);
        let log_root = record(&mut host, root, &kinds_of_interest);

        click(&mut host, window, 50., 20.);

        assert!(log_a.lock().is_empty());
        assert!(log_root.lock().is_empty(), "the root is covered");
        assert_eq!(
            kinds(&log_b),
            vec![(b, EventKind::ButtonDown), (b, EventKind::ButtonUp)]
        );
        match log_b.lock()[0].1 {
            ControlEvent::ButtonDown(pointer) => {
                assert_eq!(pointer.location, Point2::new(50., 20.));
                assert_eq!(pointer.button, Some(PointerButton::Left));
            }
            ref other => panic!("unexpected {:?}", other),
        }
        assert_eq!(host.active_control(), Some(b));
    }

    #[test]
    fn equal_tab_order_favors_the_later_sibling() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        let a = button(&mut host, root, 1);
        let b = button(&mut host, root, 1);
        click(&mut host, window, 50., 20.);
        assert_eq!(host.active_control(), Some(b));

        host.tree_mut().bring_to_front(a).unwrap();
        click(&mut host, window, 50., 20.);
        assert_eq!(host.active_control(), Some(a));
    }

    #[test]
    fn active_control_changes_notify_once() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        let a = button(&mut host, root, 1);
        let log = record(&mut host, a, &[EventKind::ActiveControlChanged]);

        click(&mut host, window, 50., 20.);
        assert_eq!(host.active_control(), Some(a));
        click(&mut host, window, 50., 20.);
        click(&mut host, window, 500., 500.);
        assert_eq!(host.active_control(), None);
        click(&mut host, window, 500., 500.);

        assert_eq!(
            log.lock().iter().map(|(_, e)| *e).collect::<Vec<_>>(),
            vec![
                ControlEvent::ActiveControlChanged { active: Some(a) },
                ControlEvent::ActiveControlChanged { active: None },
            ]
        );
    }

    #[test]
    fn switching_controls_is_one_change() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        let a = button(&mut host, root, 1);
        let far = host
            .tree_mut()
            .create_at(Point2::new(300., 300.), Vector2::new(50., 50.));
        host.tree_mut().set_tab_order(far, 2).unwrap();
        host.tree_mut().add_child(root, far).unwrap();
        let log_a = record(&mut host, a, &[EventKind::ActiveControlChanged]);

        click(&mut host, window, 50., 20.);
        click(&mut host, window, 320., 320.);
        assert_eq!(host.active_control(), Some(far));
        assert_eq!(log_a.lock().len(), 1, "a only heard that it became active");
    }

    #[test]
    fn enter_and_leave_fire_once_per_crossing() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        let a = button(&mut host, root, 1);
        let log = record(
            &mut host,
            a,
            &[EventKind::Enter, EventKind::Move, EventKind::Leave],
        );

        motion(&mut host, window, 500., 500.);
        motion(&mut host, window, 50., 20.);
        motion(&mut host, window, 60., 25.);
        motion(&mut host, window, 500., 500.);
        motion(&mut host, window, 600., 500.);
        motion(&mut host, window, 40., 15.);
        motion(&mut host, window, 700., 20.);
        motion(&mut host, window, 45., 30.);
        host.poll().unwrap();

        assert_eq!(
            kinds(&log),
            vec![
                (a, EventKind::Enter),
                (a, EventKind::Move),
                (a, EventKind::Move),
                (a, EventKind::Leave),
                (a, EventKind::Enter),
                (a, EventKind::Move),
                (a, EventKind::Leave),
                (a, EventKind::Enter),
                (a, EventKind::Move)
            ]
        );
    }

    #[test]
    fn clicks_in_an_inactive_window_hit_test_that_window() {
        let (mut host, root, first) = shown_host(HeadlessPlatform::new());
        let a = button(&mut host, root, 1);
        let b = button(&mut host, root, 2);
        let second_root = host.create_window("second", 400, 300).unwrap();
        let second = host.window_of(second_root).unwrap();
        host.poll().unwrap();
        assert_eq!(host.registry().active(), Some(second));

        let down = [EventKind::ButtonDown];
        let log_a = record(&mut host, a, &down);
        let log_b = record(&mut host, b, &down);

        click(&mut host, first, 50., 20.);

        assert!(log_a.lock().is_empty(), "the covered control stays quiet");
        assert_eq!(kinds(&log_b), vec![(b, EventKind::ButtonDown)]);
        match log_b.lock()[0].1 {
            ControlEvent::ButtonDown(pointer) => {
                assert_eq!(pointer.location, Point2::new(50., 20.))
            }
            ref other => panic!("unexpected {:?}", other),
        };
    }

    #[test]
    fn keys_go_to_the_active_control() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        let a = button(&mut host, root, 1);
        let far = host
            .tree_mut()
            .create_at(Point2::new(300., 300.), Vector2::new(50., 50.));
        host.tree_mut().add_child(root, far).unwrap();
        let log = record(&mut host, a, &[EventKind::KeyDown]);
        let log_far = record(&mut host, far, &[EventKind::KeyDown]);

        let key = NativeEvent::KeyDown(RawKey {
            window,
            scancode: 30,
            keycode: 'a' as i32,
            modifiers: Default::default(),
            repeat: false,
        });
        host.platform_mut().push(key);
        host.poll().unwrap();
        assert!(log.lock().is_empty(), "nothing is active yet");

        click(&mut host, window, 50., 20.);
        host.platform_mut().push(key);
        host.poll().unwrap();
        assert_eq!(kinds(&log), vec![(a, EventKind::KeyDown)]);
        assert!(log_far.lock().is_empty());
    }

    #[test]
    fn translating_on_a_disposed_control_fails() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        let a = button(&mut host, root, 1);
        host.tree_mut().dispose(a).unwrap();

        let event = NativeEvent::Motion(RawMotion {
            window,
            x: 1.,
            y: 1.,
        });
        assert!(matches!(
            host.translate(a, &event),
            Err(UiError::Disposed(id)) if id == a
        ));
        assert!(host.translate(root, &event).is_ok());
    }

    #[test]
    fn dpi_scaling_and_resize() {
        let mut host = Host::new(HeadlessPlatform::with_dpi(192.), HeadlessGraphics::new());
        let root = host.create_window("hidpi", 400, 300).unwrap();
        let child = host
            .tree_mut()
            .create_at(Point2::new(10., 10.), Vector2::new(100., 30.));
        host.tree_mut().add_child(root, child).unwrap();
        host.poll().unwrap();
        let window = host.window_of(root).unwrap();

        assert_eq!(host.tree().get(root).unwrap().size(), Vector2::new(800., 600.));
        assert_eq!(host.tree().get(child).unwrap().bounds().left(), 20.);

        // native (50, 30) lands on the scaled child
        click(&mut host, window, 50., 30.);
        assert_eq!(host.active_control(), Some(child));

        host.platform_mut().push(NativeEvent::Window {
            window,
            event: WindowEvent::Resized {
                width: 500.,
                height: 400.,
            },
        });
        host.poll().unwrap();
        assert_eq!(host.tree().get(root).unwrap().size(), Vector2::new(1000., 800.));
        assert_eq!(
            host.tree().get(child).unwrap().size(),
            Vector2::new(200., 60.),
            "no compounding"
        );
    }

    #[test]
    fn wheel_scrolls_a_visible_scrollbar() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        host.tree_mut().get_mut(root).unwrap().scroll.visible = true;
        let log = record(&mut host, root, &[EventKind::ScrollChanged]);
        host.paint().unwrap();

        host.platform_mut().push(NativeEvent::Wheel(RawWheel {
            window,
            x: 400.,
            y: 300.,
            delta: Vector2::new(0., -5.),
        }));
        host.poll().unwrap();
        assert_eq!(
            log.lock().iter().map(|(_, e)| *e).collect::<Vec<_>>(),
            vec![ControlEvent::ScrollChanged(5.)]
        );
    }

    #[test]
    fn paint_skips_hidden_windows() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        let journal = host.graphics().journal();
        host.paint().unwrap();
        assert_eq!(journal.lock().frames, 1);

        host.platform_mut().push(NativeEvent::Window {
            window,
            event: WindowEvent::Hidden,
        });
        host.poll().unwrap();
        assert!(!host.tree().get(root).unwrap().is_visible());
        host.paint().unwrap();
        assert_eq!(journal.lock().frames, 1);

        host.platform_mut().push(NativeEvent::Window {
            window,
            event: WindowEvent::Shown,
        });
        host.poll().unwrap();
        host.paint().unwrap();
        assert_eq!(journal.lock().frames, 2);
    }

    #[test]
    fn closing_the_last_window_ends_the_loop() {
        let (mut host, root, window) = shown_host(HeadlessPlatform::new());
        let log = record(&mut host, root, &[EventKind::HandleDestroyed]);
        host.platform_mut().push(NativeEvent::Window {
            window,
            event: WindowEvent::Close,
        });

        host.run().unwrap();
        assert_eq!(kinds(&log), vec![(root, EventKind::HandleDestroyed)]);
        assert!(host.registry().is_empty());
        assert_eq!(host.platform().window_count(), 0);
        assert!(host.tree().is_empty());
        assert!(host.is_shut_down());
    }

    #[test]
    fn quit_disposes_everything() {
        let (mut host, root, _) = shown_host(HeadlessPlatform::new());
        let second = host.create_window("second", 200, 200).unwrap();
        let a = button(&mut host, root, 1);
        let journal = host.graphics().journal();
        host.poll().unwrap();
        host.paint().unwrap();
        assert!(journal.lock().allocations > 0);

        host.event_sender().send(NativeEvent::Quit).unwrap();
        host.run().unwrap();

        assert!(host.tree().get(a).unwrap_err().to_string().contains("disposed"));
        assert!(host.tree().get(second).is_err());
        assert!(host.registry().is_empty());
        assert!(host.platform().has_quit());
        assert!(host.graphics().is_released());
        let journal = journal.lock();
        assert_eq!(journal.releases, journal.allocations);
        assert!(!host.poll().unwrap());
    }
}
