//! Docking feedback: where a dragged panel would land, and whether the pointer has rested on a
//! region long enough to show it.

use crate::backend::RenderTarget;
use crate::color::Color;
use crate::config::UiConfig;
use crate::error::BackendError;
use crate::rect::Rect;
use crate::resources::BrushCache;
use cgmath::{Point2, Vector2};
use crossbeam::channel::{self, Sender, TryRecvError};
use log::{trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A placement zone of a dock panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockRegion {
    Fill,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl DockRegion {
    pub const ALL: [DockRegion; 9] = [
        DockRegion::Fill,
        DockRegion::Left,
        DockRegion::Right,
        DockRegion::Top,
        DockRegion::Bottom,
        DockRegion::TopLeft,
        DockRegion::TopRight,
        DockRegion::BottomLeft,
        DockRegion::BottomRight,
    ];

    /// The preview rectangle of this region on a panel.
    ///
    /// Edges are quarter-size bands; corners are quarter-size boxes.
    pub fn rect(self, panel: Rect) -> Rect {
        let quarter = Vector2::new(panel.width() / 4., panel.height() / 4.);
        let left = panel.left();
        let top = panel.top();
        let right = panel.right() - quarter.x;
        let bottom = panel.bottom() - quarter.y;

        match self {
            DockRegion::Fill => panel,
            DockRegion::Left => Rect::new(panel.origin, Vector2::new(quarter.x, panel.height())),
            DockRegion::Right => Rect::new(
                Point2::new(right, top),
                Vector2::new(quarter.x, panel.height()),
            ),
            DockRegion::Top => Rect::new(panel.origin, Vector2::new(panel.width(), quarter.y)),
            DockRegion::Bottom => Rect::new(
                Point2::new(left, bottom),
                Vector2::new(panel.width(), quarter.y),
            ),
            DockRegion::TopLeft => Rect::new(panel.origin, quarter),
            DockRegion::TopRight => Rect::new(Point2::new(right, top), quarter),
            DockRegion::BottomLeft => Rect::new(Point2::new(left, bottom), quarter),
            DockRegion::BottomRight => Rect::new(Point2::new(right, bottom), quarter),
        }
    }

    /// Finds the region under a point: corners win over edges, edges over the center.
    pub fn at(panel: Rect, point: Point2<f64>) -> Option<DockRegion> {
        if !panel.contains(point) {
            return None;
        }
        const BY_PRIORITY: [DockRegion; 8] = [
            DockRegion::TopLeft,
            DockRegion::TopRight,
            DockRegion::BottomLeft,
            DockRegion::BottomRight,
            DockRegion::Left,
            DockRegion::Right,
            DockRegion::Top,
            DockRegion::Bottom,
        ];
        Some(
            BY_PRIORITY
                .iter()
                .cloned()
                .find(|region| region.rect(panel).contains(point))
                .unwrap_or(DockRegion::Fill),
        )
    }
}

/// The hover stopwatch of one dock region.
///
/// `start` and `stop` only record a request; the stopwatch follows it on the next `tick`. A stop
/// is remembered even when a start follows before that tick, so the next session counts from 0.
#[derive(Debug, Clone)]
pub struct HoverTimer {
    requested: bool,
    restart: bool,
    started: Option<Instant>,
    elapsed: Duration,
    threshold: Duration,
}

impl HoverTimer {
    pub fn new(threshold: Duration) -> HoverTimer {
        HoverTimer {
            requested: false,
            restart: false,
            started: None,
            elapsed: Duration::from_secs(0),
            threshold,
        }
    }

    pub fn start(&mut self) {
        self.requested = true;
    }

    pub fn stop(&mut self) {
        self.requested = false;
        self.restart = true;
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Starts or resets the stopwatch as requested, then samples it.
    pub fn tick(&mut self, now: Instant) -> Duration {
        if self.restart || !self.requested {
            self.started = None;
            self.restart = false;
        }
        if self.requested && self.started.is_none() {
            self.started = Some(now);
        }
        self.elapsed = self
            .started
            .map_or(Duration::from_secs(0), |started| {
                now.saturating_duration_since(started)
            });
        self.elapsed
    }

    /// Elapsed time at the last tick.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_hovering(&self) -> bool {
        self.elapsed >= self.threshold
    }
}

/// A hover request sent to a region's ticker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoverCommand {
    Start,
    Stop,
}

/// A dock region with its background hover ticker.
///
/// The ticker thread owns the stopwatch. Hover requests reach it over a channel and it
/// publishes whether the threshold has been reached; it exits once the info is dropped.
#[derive(Debug)]
pub struct DockRegionInfo {
    region: DockRegion,
    commands: Option<Sender<HoverCommand>>,
    hovering: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
}

impl DockRegionInfo {
    pub fn new(region: DockRegion, config: &UiConfig) -> DockRegionInfo {
        let (commands, command_recv) = channel::unbounded::<HoverCommand>();
        let hovering = Arc::new(AtomicBool::new(false));
        let mut timer = HoverTimer::new(config.hover_threshold);
        let interval = config.hover_tick;

        let published = Arc::clone(&hovering);
        let ticker = thread::Builder::new()
            .name(format!("dock hover {:?}", region))
            .spawn(move || {
                let ticks = channel::tick(interval);
                'ticker: loop {
                    loop {
                        match command_recv.try_recv() {
                            Ok(HoverCommand::Start) => timer.start(),
                            Ok(HoverCommand::Stop) => timer.stop(),
                            Err(TryRecvError::Empty) => break,
                            Err(TryRecvError::Disconnected) => break 'ticker,
                        }
                    }
                    let now = match ticks.recv() {
                        Ok(now) => now,
                        Err(_) => break,
                    };
                    timer.tick(now);
                    published.store(timer.is_hovering(), Ordering::Release);
                }
                trace!("dock hover ticker for {:?} stopped", region);
            });

        let ticker = match ticker {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("could not start dock hover ticker: {}", err);
                None
            }
        };

        DockRegionInfo {
            region,
            commands: Some(commands),
            hovering,
            ticker,
        }
    }

    pub fn region(&self) -> DockRegion {
        self.region
    }

    fn send(&self, command: HoverCommand) {
        if let Some(commands) = &self.commands {
            if commands.send(command).is_err() {
                warn!("dock hover ticker for {:?} is gone", self.region);
            }
        }
    }

    pub fn start_hover(&self) {
        self.send(HoverCommand::Start);
    }

    pub fn stop_hover(&self) {
        self.send(HoverCommand::Stop);
    }

    /// True once the pointer has rested on the region for the hover threshold.
    pub fn is_hovering(&self) -> bool {
        self.hovering.load(Ordering::Acquire)
    }

    pub fn region_rect(&self, panel: Rect) -> Rect {
        self.region.rect(panel)
    }

    /// Shows the preview overlay over this region of a panel.
    pub fn show_dock_preview(&self, panel: Rect, preview: &mut DockPreview) {
        preview.show(self.region_rect(panel));
    }
}

impl Drop for DockRegionInfo {
    fn drop(&mut self) {
        drop(self.commands.take());
        if let Some(ticker) = self.ticker.take() {
            if ticker.join().is_err() {
                warn!("dock hover ticker for {:?} panicked", self.region);
            }
        }
    }
}

/// A translucent overlay marking where a panel would dock.
#[derive(Debug, Clone)]
pub struct DockPreview {
    color: Color,
    visible: bool,
    area: Rect,
}

impl DockPreview {
    pub fn new(color: Color) -> DockPreview {
        DockPreview {
            color,
            visible: false,
            area: Rect::zero(),
        }
    }

    pub fn show(&mut self, area: Rect) {
        self.area = area;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn draw(
        &self,
        target: &mut dyn RenderTarget,
        brushes: &mut BrushCache,
    ) -> Result<(), BackendError> {
        if !self.visible {
            return Ok(());
        }
        let brush = brushes.solid(target, self.color)?;
        target.fill_rect(self.area, &brush);
        Ok(())
    }
}

impl Default for DockPreview {
    fn default() -> Self {
        DockPreview::new(UiConfig::default().dock_preview_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Graphics, WindowId};
    use crate::headless::{DrawCommand, HeadlessGraphics};

    fn panel() -> Rect {
        Rect::from_edges(100., 100., 500., 300.)
    }

    #[test]
    fn region_rects() {
        let panel = panel();
        assert_eq!(DockRegion::Fill.rect(panel), panel);
        assert_eq!(
            DockRegion::Left.rect(panel),
            Rect::from_edges(100., 100., 200., 300.)
        );
        assert_eq!(
            DockRegion::Right.rect(panel),
            Rect::from_edges(400., 100., 500., 300.)
        );
        assert_eq!(
            DockRegion::Top.rect(panel),
            Rect::from_edges(100., 100., 500., 150.)
        );
        assert_eq!(
            DockRegion::Bottom.rect(panel),
            Rect::from_edges(100., 250., 500., 300.)
        );
        assert_eq!(
            DockRegion::BottomLeft.rect(panel),
            Rect::from_edges(100., 250., 200., 300.)
        );
        assert_eq!(
            DockRegion::BottomRight.rect(panel),
            Rect::from_edges(400., 250., 500., 300.)
        );
        for region in &DockRegion::ALL {
            let rect = region.rect(panel);
            assert!(rect.left() >= panel.left() && rect.right() <= panel.right());
            assert!(rect.top() >= panel.top() && rect.bottom() <= panel.bottom());
        }
    }

    #[test]
    fn region_lookup() {
        let panel = panel();
        assert_eq!(DockRegion::at(panel, Point2::new(110., 110.)), Some(DockRegion::TopLeft));
        assert_eq!(DockRegion::at(panel, Point2::new(110., 200.)), Some(DockRegion::Left));
        assert_eq!(DockRegion::at(panel, Point2::new(300., 290.)), Some(DockRegion::Bottom));
        assert_eq!(DockRegion::at(panel, Point2::new(300., 200.)), Some(DockRegion::Fill));
        assert_eq!(DockRegion::at(panel, Point2::new(0., 0.)), None);
    }

    #[test]
    fn hover_timer_follows_requests_on_tick() {
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut timer = HoverTimer::new(ms(150));

        timer.tick(t0);
        assert!(!timer.is_hovering());

        timer.start();
        assert_eq!(timer.tick(t0), ms(0));
        assert_eq!(timer.tick(t0 + ms(100)), ms(100));
        assert!(!timer.is_hovering());
        timer.tick(t0 + ms(200));
        assert!(timer.is_hovering());

        timer.stop();
        assert!(timer.is_hovering(), "stopping takes effect on the next tick");
        assert_eq!(timer.tick(t0 + ms(300)), ms(0));
        assert!(!timer.is_hovering());

        timer.start();
        assert_eq!(timer.tick(t0 + ms(400)), ms(0), "a new session starts from zero");
        assert_eq!(timer.tick(t0 + ms(450)), ms(50));
    }

    #[test]
    fn stop_then_start_between_ticks_restarts_the_session() {
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut timer = HoverTimer::new(ms(150));

        timer.start();
        timer.tick(t0);
        timer.tick(t0 + ms(100));
        timer.tick(t0 + ms(300));
        assert!(timer.is_hovering());

        timer.stop();
        timer.start();
        assert_eq!(timer.tick(t0 + ms(400)), ms(0));
        assert!(!timer.is_hovering());
        assert_eq!(timer.tick(t0 + ms(500)), ms(100));
        assert!(!timer.is_hovering());
    }

    #[test]
    fn stopping_before_the_threshold_never_hovers() {
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut timer = HoverTimer::new(ms(150));

        timer.start();
        timer.tick(t0);
        assert_eq!(timer.tick(t0 + ms(100)), ms(100));
        timer.stop();
        timer.tick(t0 + ms(200));
        assert!(!timer.is_hovering());
        assert_eq!(timer.tick(t0 + ms(1000)), ms(0));
        assert!(!timer.is_hovering());
    }

    #[test]
    fn ticker_thread_drives_hovering() {
        let config = UiConfig {
            hover_threshold: Duration::from_millis(30),
            hover_tick: Duration::from_millis(5),
            ..UiConfig::default()
        };
        let info = DockRegionInfo::new(DockRegion::Left, &config);
        assert!(!info.is_hovering());

        info.start_hover();
        thread::sleep(Duration::from_millis(300));
        assert!(info.is_hovering());

        info.stop_hover();
        thread::sleep(Duration::from_millis(100));
        assert!(!info.is_hovering());
    }

    #[test]
    fn preview_draws_with_a_cached_brush() {
        let mut graphics = HeadlessGraphics::new();
        let journal = graphics.journal();
        let mut target = graphics
            .create_render_target(WindowId(1), Vector2::new(800., 600.))
            .unwrap();
        let mut brushes = BrushCache::new();
        let info = DockRegionInfo::new(DockRegion::Right, &UiConfig::default());

        let mut preview = DockPreview::default();
        preview.draw(&mut *target, &mut brushes).unwrap();
        assert!(journal.lock().commands.is_empty(), "hidden previews draw nothing");

        info.show_dock_preview(panel(), &mut preview);
        assert_eq!(preview.area(), Rect::from_edges(400., 100., 500., 300.));
        preview.draw(&mut *target, &mut brushes).unwrap();
        preview.draw(&mut *target, &mut brushes).unwrap();

        let journal = journal.lock();
        assert_eq!(journal.allocations, 1);
        assert_eq!(
            journal.commands[0],
            DrawCommand::FillRect {
                rect: preview.area(),
                color: Some(Color::rgba(0., 1., 0., 0.5)),
            }
        );

        drop(journal);
        preview.hide();
        assert!(!preview.is_visible());
    }
}
