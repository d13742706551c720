//! One-shot input-signal detection sequence.
//!
//! Detection is a two-state machine: starting it puts the device into
//! reacquisition mode and freezes the controls, and a single deferred finish
//! releases the device, probes the fresh signal, and thaws everything. The
//! embedder arms the finish timer; a second start while one is in flight is
//! refused.

use crate::banner::BannerAnimator;
use crate::channel::AttributeChannel;
use crate::controller::GvoController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectState {
    #[default]
    Idle,
    Detecting,
}

/// Tracks whether a detection is in flight and drives the controller's
/// begin/end transitions.
#[derive(Debug, Default)]
pub struct DetectSequence {
    state: DetectState,
}

impl DetectSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DetectState {
        self.state
    }

    /// Begin detecting. Returns false (and does nothing) when a sequence is
    /// already in flight; the caller only arms the finish timer on true.
    pub fn start<C: AttributeChannel>(&mut self, controller: &mut GvoController<C>) -> bool {
        if self.state == DetectState::Detecting {
            tracing::debug!("detect requested while already detecting, ignoring");
            return false;
        }
        self.state = DetectState::Detecting;
        controller.begin_detect();
        true
    }

    /// Finish the in-flight detection. Returns false when none is in flight.
    pub fn finish<C: AttributeChannel>(
        &mut self,
        controller: &mut GvoController<C>,
        banner: &mut BannerAnimator,
    ) -> bool {
        if self.state != DetectState::Detecting {
            return false;
        }
        self.state = DetectState::Idle;
        controller.end_detect(banner);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Attribute;
    use crate::models::ScreenGeometry;
    use crate::testing::{RecordingPainter, RecordingStatus, RecordingSurface, ScriptedChannel};

    fn fixture() -> (
        DetectSequence,
        GvoController<ScriptedChannel>,
        BannerAnimator,
        ScriptedChannel,
    ) {
        let channel = ScriptedChannel::supported();
        let controller = GvoController::new(
            channel.clone(),
            Box::new(RecordingSurface::new()),
            Box::new(RecordingStatus::new()),
            ScreenGeometry {
                width: 1920,
                height: 1200,
            },
        )
        .unwrap();
        let banner = BannerAnimator::new(Box::new(RecordingPainter::new()));
        (DetectSequence::new(), controller, banner, channel)
    }

    #[test]
    fn start_finish_cycle() {
        let (mut detect, mut controller, mut banner, channel) = fixture();
        assert_eq!(detect.state(), DetectState::Idle);

        assert!(detect.start(&mut controller));
        assert_eq!(detect.state(), DetectState::Detecting);
        assert_eq!(channel.value(Attribute::Reacquire), Some(1));

        assert!(detect.finish(&mut controller, &mut banner));
        assert_eq!(detect.state(), DetectState::Idle);
        assert_eq!(channel.value(Attribute::Reacquire), Some(0));
    }

    #[test]
    fn second_start_is_refused_while_detecting() {
        let (mut detect, mut controller, _banner, channel) = fixture();
        assert!(detect.start(&mut controller));
        channel.clear_writes();

        assert!(!detect.start(&mut controller));
        assert!(channel.writes().is_empty());
    }

    #[test]
    fn finish_without_start_is_a_no_op() {
        let (mut detect, mut controller, mut banner, channel) = fixture();
        channel.clear_writes();
        assert!(!detect.finish(&mut controller, &mut banner));
        assert!(channel.writes().is_empty());
    }
}
