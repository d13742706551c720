//! Panel wiring: controller, banner, detect sequence, and the timers that
//! drive them.
//!
//! Everything runs on one thread. The embedder forwards user changes and
//! device events into the panel and advances its clock; the panel owns the
//! banner tick, the input poll loop, and the one-shot that ends a detect
//! sequence. The poll loop only runs while the panel is selected; the banner
//! keeps animating regardless.

use crate::banner::{BannerAnimator, SlotPainter};
use crate::channel::{Attribute, AttributeChannel};
use crate::config::Settings;
use crate::controller::GvoController;
use crate::detect::{DetectSequence, DetectState};
use crate::errors::GvoResult;
use crate::models::ScreenGeometry;
use crate::scheduler::{Scheduler, TimerFate, TimerId};
use crate::surface::{ControlSurface, StatusSink};

/// The pieces timer callbacks operate on. Kept apart from the scheduler so a
/// callback can borrow all of them mutably.
pub struct PanelCore<C: AttributeChannel> {
    controller: GvoController<C>,
    banner: BannerAnimator,
    detect: DetectSequence,
}

impl<C: AttributeChannel> PanelCore<C> {
    fn poll(&mut self) {
        self.controller.probe(&mut self.banner);
    }

    fn finish_detect(&mut self) {
        self.detect.finish(&mut self.controller, &mut self.banner);
    }
}

/// One graphics-to-video output panel.
pub struct GvoPanel<C: AttributeChannel + 'static> {
    core: PanelCore<C>,
    scheduler: Scheduler<PanelCore<C>>,
    poll_timer: TimerId,
    detect_duration_ms: u64,
    selected: bool,
}

impl<C: AttributeChannel + 'static> GvoPanel<C> {
    /// Build the panel: probe the device, seed the banner, and register the
    /// banner and poll timers. The poll timer starts disabled; selecting the
    /// panel enables it.
    pub fn new(
        channel: C,
        surface: Box<dyn ControlSurface>,
        status: Box<dyn StatusSink>,
        painter: Box<dyn SlotPainter>,
        screen: ScreenGeometry,
        settings: &Settings,
    ) -> GvoResult<Self> {
        let controller = GvoController::new(channel, surface, status, screen)?;
        let mut banner = BannerAnimator::new(painter);
        controller.refresh_banner(&mut banner);

        let core = PanelCore {
            controller,
            banner,
            detect: DetectSequence::new(),
        };

        let mut scheduler = Scheduler::new();
        scheduler.schedule(settings.timers.banner_tick_ms, |core: &mut PanelCore<C>| {
            core.banner.tick();
            TimerFate::Continue
        });
        let poll_timer = scheduler.schedule(
            settings.timers.poll_interval_ms,
            |core: &mut PanelCore<C>| {
                core.poll();
                TimerFate::Continue
            },
        );
        scheduler.set_enabled(poll_timer, false);

        Ok(Self {
            core,
            scheduler,
            poll_timer,
            detect_duration_ms: settings.timers.detect_duration_ms,
            selected: false,
        })
    }

    /// The panel becomes visible: probe once immediately and start polling.
    pub fn select(&mut self) {
        if self.selected {
            return;
        }
        self.selected = true;
        self.core.poll();
        self.scheduler.set_enabled(self.poll_timer, true);
    }

    /// The panel is hidden: stop polling. The banner keeps ticking.
    pub fn deselect(&mut self) {
        self.selected = false;
        self.scheduler.set_enabled(self.poll_timer, false);
    }

    /// Forward an externally originated attribute change from the device.
    pub fn handle_event(&mut self, attribute: Attribute, value: i64) {
        self.core
            .controller
            .reconcile_external_event(&mut self.core.banner, attribute, value);
    }

    /// Forward a user change on a single-attribute control.
    pub fn apply_user_change(&mut self, attribute: Attribute, value: i64) {
        self.core
            .controller
            .apply_user_change(&mut self.core.banner, attribute, value);
    }

    /// Forward a user change on the combined sync-format control.
    pub fn apply_sync_format(&mut self, value: i64) {
        self.core.controller.apply_sync_format(value);
    }

    /// The detect toggle changed. Releases are programmatic (the controller
    /// clears the toggle silently when the sequence ends) and ignored;
    /// pressing it starts a sequence and arms the one-shot that finishes it.
    pub fn set_detect(&mut self, active: bool) {
        if !active {
            return;
        }
        if !self.core.detect.start(&mut self.core.controller) {
            return;
        }
        self.scheduler
            .schedule(self.detect_duration_ms, |core: &mut PanelCore<C>| {
                core.finish_detect();
                TimerFate::Stop
            });
    }

    /// Advance the panel clock, firing due timers.
    pub fn advance(&mut self, elapsed_ms: u64) {
        self.scheduler.advance(&mut self.core, elapsed_ms);
    }

    pub fn controller(&self) -> &GvoController<C> {
        &self.core.controller
    }

    pub fn banner(&self) -> &BannerAnimator {
        &self.core.banner
    }

    pub fn detect_state(&self) -> DetectState {
        self.core.detect.state()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}
