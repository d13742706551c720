//! Four-slot status banner animation.
//!
//! The banner shows one LED-style indicator per slot: the two video outputs,
//! the SDI-sync input, and the composite-sync input. Flashing indicators all
//! share a single flash phase so they blink in lockstep, and a slot is only
//! repainted when its glyph actually changes. The animator owns the logical
//! slot state and never reads raw device attributes; the controller feeds it
//! derived flags.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::catalog::VideoFormat;
use crate::models::{DataFormat, SdiSyncDetect};

/// Banner slots, in their fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    VideoOut1,
    VideoOut2,
    SdiSync,
    CompSync,
}

impl Slot {
    /// Display order; the flash phase is derived from the first flashing
    /// slot encountered in this order.
    pub const ALL: [Slot; 4] = [Slot::VideoOut1, Slot::VideoOut2, Slot::SdiSync, Slot::CompSync];

    fn index(self) -> usize {
        match self {
            Slot::VideoOut1 => 0,
            Slot::VideoOut2 => 1,
            Slot::SdiSync => 2,
            Slot::CompSync => 3,
        }
    }
}

/// Color variant of a slot glyph. Grey is the "off" variant every flashing
/// class alternates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphColor {
    Grey,
    Green,
    Yellow,
    Red,
}

/// One renderable glyph: a slot's artwork in one color variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub slot: Slot,
    pub color: GlyphColor,
    /// Asset name the embedder resolves to actual artwork.
    pub asset: &'static str,
}

/// Process-wide registry of banner glyphs, loaded once and shared by every
/// banner instance. Animators hold a reference, never ownership.
#[derive(Debug)]
pub struct GlyphRegistry {
    glyphs: Vec<Glyph>,
}

static SHARED_REGISTRY: Lazy<Arc<GlyphRegistry>> = Lazy::new(|| Arc::new(GlyphRegistry::build()));

impl GlyphRegistry {
    /// The shared registry, initialized on first use.
    pub fn shared() -> Arc<GlyphRegistry> {
        Arc::clone(&SHARED_REGISTRY)
    }

    fn build() -> Self {
        const ASSETS: [(Slot, GlyphColor, &str); 16] = [
            (Slot::VideoOut1, GlyphColor::Grey, "gvo_banner_vid1_grey"),
            (Slot::VideoOut1, GlyphColor::Green, "gvo_banner_vid1_green"),
            (Slot::VideoOut1, GlyphColor::Yellow, "gvo_banner_vid1_yellow"),
            (Slot::VideoOut1, GlyphColor::Red, "gvo_banner_vid1_red"),
            (Slot::VideoOut2, GlyphColor::Grey, "gvo_banner_vid2_grey"),
            (Slot::VideoOut2, GlyphColor::Green, "gvo_banner_vid2_green"),
            (Slot::VideoOut2, GlyphColor::Yellow, "gvo_banner_vid2_yellow"),
            (Slot::VideoOut2, GlyphColor::Red, "gvo_banner_vid2_red"),
            (Slot::SdiSync, GlyphColor::Grey, "gvo_banner_sdi_sync_grey"),
            (Slot::SdiSync, GlyphColor::Green, "gvo_banner_sdi_sync_green"),
            (Slot::SdiSync, GlyphColor::Yellow, "gvo_banner_sdi_sync_yellow"),
            (Slot::SdiSync, GlyphColor::Red, "gvo_banner_sdi_sync_red"),
            (Slot::CompSync, GlyphColor::Grey, "gvo_banner_comp_sync_grey"),
            (Slot::CompSync, GlyphColor::Green, "gvo_banner_comp_sync_green"),
            (Slot::CompSync, GlyphColor::Yellow, "gvo_banner_comp_sync_yellow"),
            (Slot::CompSync, GlyphColor::Red, "gvo_banner_comp_sync_red"),
        ];
        let glyphs = ASSETS
            .iter()
            .map(|&(slot, color, asset)| Glyph { slot, color, asset })
            .collect();
        Self { glyphs }
    }

    /// Glyph for a slot/color pair. Every pair in the table exists.
    pub fn get(&self, slot: Slot, color: GlyphColor) -> &Glyph {
        self.glyphs
            .iter()
            .find(|g| g.slot == slot && g.color == color)
            .expect("glyph registry covers all slot/color pairs")
    }
}

/// Logical class of a video-out slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoOutLed {
    /// Output not in use; static grey.
    #[default]
    NotInUse,
    /// High-definition output; flashes green.
    Hd,
    /// Standard-definition output; flashes yellow.
    Sd,
}

/// Logical class of the SDI-sync slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SdiSyncLed {
    /// No sync input; static grey.
    #[default]
    None,
    /// HD sync input; flashes green.
    Hd,
    /// SD sync input; flashes yellow.
    Sd,
    /// Sync error; static yellow.
    Error,
}

/// Logical class of the composite-sync slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompSyncLed {
    /// No sync input; static grey.
    #[default]
    None,
    /// Synced; flashes green.
    Synced,
}

/// Logical state of the four slots plus the currently displayed glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BannerState {
    pub vid1: VideoOutLed,
    pub vid2: VideoOutLed,
    pub sdi: SdiSyncLed,
    pub comp: CompSyncLed,
}

/// Repaint hook: called only when a slot's glyph actually changes.
pub trait SlotPainter {
    fn paint(&mut self, slot: Slot, glyph: &Glyph);
}

/// Animates the banner on a fixed tick.
pub struct BannerAnimator {
    registry: Arc<GlyphRegistry>,
    painter: Box<dyn SlotPainter>,
    state: BannerState,
    displayed: [GlyphColor; 4],
}

impl BannerAnimator {
    /// Create an animator with every slot in its inactive class, painted
    /// grey.
    pub fn new(painter: Box<dyn SlotPainter>) -> Self {
        let mut animator = Self {
            registry: GlyphRegistry::shared(),
            painter,
            state: BannerState::default(),
            displayed: [GlyphColor::Grey; 4],
        };
        for slot in Slot::ALL {
            let glyph = *animator.registry.get(slot, GlyphColor::Grey);
            animator.painter.paint(slot, &glyph);
        }
        animator
    }

    /// Current logical state.
    pub fn state(&self) -> BannerState {
        self.state
    }

    /// Glyph color currently displayed in a slot.
    pub fn displayed(&self, slot: Slot) -> GlyphColor {
        self.displayed[slot.index()]
    }

    /// Derive the video-out slot classes from the active output formats.
    /// `format` is `None` while output is disabled.
    pub fn set_video_output(&mut self, format: Option<&VideoFormat>, data_format: DataFormat) {
        let led = match format {
            None => VideoOutLed::NotInUse,
            Some(f) if f.is_sd() => VideoOutLed::Sd,
            Some(_) => VideoOutLed::Hd,
        };
        self.state.vid1 = led;
        // 4:2:2 output is single-link; the second channel stays dark.
        self.state.vid2 = if data_format == DataFormat::YCrCb422 {
            VideoOutLed::NotInUse
        } else {
            led
        };
    }

    /// Derive the sync slot classes from the detected inputs.
    pub fn set_sync_input(&mut self, sdi: SdiSyncDetect, composite: bool) {
        self.state.sdi = match sdi {
            SdiSyncDetect::Hd => SdiSyncLed::Hd,
            SdiSyncDetect::Sd => SdiSyncLed::Sd,
            SdiSyncDetect::None => SdiSyncLed::None,
        };
        self.state.comp = if composite {
            CompSyncLed::Synced
        } else {
            CompSyncLed::None
        };
    }

    /// Flag a sync error on the SDI slot (static yellow).
    pub fn set_sdi_sync_error(&mut self) {
        self.state.sdi = SdiSyncLed::Error;
    }

    /// One animation tick.
    ///
    /// A single flash phase is derived from the first slot encountered in a
    /// flashing class: the phase is "lit" exactly when that slot's displayed
    /// glyph was the grey variant. Every other flashing slot uses the same
    /// phase this tick, so all flashing indicators change in lockstep.
    /// Static-class slots are set directly. A slot is repainted only when
    /// its computed glyph differs from the displayed one.
    pub fn tick(&mut self) {
        let mut phase: Option<bool> = None;

        for slot in Slot::ALL {
            let displayed = self.displayed[slot.index()];
            let target = match slot {
                Slot::VideoOut1 | Slot::VideoOut2 => {
                    let led = if slot == Slot::VideoOut1 {
                        self.state.vid1
                    } else {
                        self.state.vid2
                    };
                    match led {
                        VideoOutLed::NotInUse => GlyphColor::Grey,
                        VideoOutLed::Hd => flash(&mut phase, displayed, GlyphColor::Green),
                        VideoOutLed::Sd => flash(&mut phase, displayed, GlyphColor::Yellow),
                    }
                }
                Slot::SdiSync => match self.state.sdi {
                    SdiSyncLed::None => GlyphColor::Grey,
                    SdiSyncLed::Hd => flash(&mut phase, displayed, GlyphColor::Green),
                    SdiSyncLed::Sd => flash(&mut phase, displayed, GlyphColor::Yellow),
                    SdiSyncLed::Error => GlyphColor::Yellow,
                },
                Slot::CompSync => match self.state.comp {
                    CompSyncLed::None => GlyphColor::Grey,
                    CompSyncLed::Synced => flash(&mut phase, displayed, GlyphColor::Green),
                },
            };

            if target != displayed {
                let glyph = *self.registry.get(slot, target);
                self.painter.paint(slot, &glyph);
                self.displayed[slot.index()] = target;
            }
        }
    }
}

/// Resolve one flashing slot against the shared phase, establishing the
/// phase from this slot's displayed glyph if no earlier slot has.
fn flash(phase: &mut Option<bool>, displayed: GlyphColor, on: GlyphColor) -> GlyphColor {
    let lit = *phase.get_or_insert(displayed == GlyphColor::Grey);
    if lit {
        on
    } else {
        GlyphColor::Grey
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPainter;

    fn animator() -> (BannerAnimator, RecordingPainter) {
        let painter = RecordingPainter::new();
        let animator = BannerAnimator::new(Box::new(painter.clone()));
        (animator, painter)
    }

    #[test]
    fn starts_all_grey() {
        let (animator, painter) = animator();
        for slot in Slot::ALL {
            assert_eq!(animator.displayed(slot), GlyphColor::Grey);
        }
        assert_eq!(painter.paint_count(), 4);
    }

    #[test]
    fn static_slots_do_not_repaint() {
        let (mut animator, painter) = animator();
        let initial = painter.paint_count();
        animator.tick();
        animator.tick();
        assert_eq!(painter.paint_count(), initial);
    }

    #[test]
    fn hd_slot_alternates_grey_green_each_tick() {
        let (mut animator, _painter) = animator();
        animator.set_sync_input(SdiSyncDetect::Hd, false);

        animator.tick();
        assert_eq!(animator.displayed(Slot::SdiSync), GlyphColor::Green);
        animator.tick();
        assert_eq!(animator.displayed(Slot::SdiSync), GlyphColor::Grey);
        animator.tick();
        assert_eq!(animator.displayed(Slot::SdiSync), GlyphColor::Green);
    }

    #[test]
    fn all_flashing_slots_share_one_phase() {
        let (mut animator, _painter) = animator();
        animator.set_sync_input(SdiSyncDetect::Hd, true);
        animator.set_video_output(
            Some(crate::catalog::lookup(crate::catalog::FormatId(1)).unwrap()),
            DataFormat::YCrCb444,
        );

        for _ in 0..4 {
            animator.tick();
            let vid1_lit = animator.displayed(Slot::VideoOut1) != GlyphColor::Grey;
            let vid2_lit = animator.displayed(Slot::VideoOut2) != GlyphColor::Grey;
            let sdi_lit = animator.displayed(Slot::SdiSync) != GlyphColor::Grey;
            let comp_lit = animator.displayed(Slot::CompSync) != GlyphColor::Grey;
            assert_eq!(vid1_lit, vid2_lit);
            assert_eq!(vid1_lit, sdi_lit);
            assert_eq!(vid1_lit, comp_lit);
        }
    }

    #[test]
    fn sd_output_flashes_yellow() {
        let (mut animator, _painter) = animator();
        animator.set_video_output(
            Some(crate::catalog::lookup(crate::catalog::FormatId(2)).unwrap()),
            DataFormat::YCrCb444,
        );
        animator.tick();
        assert_eq!(animator.displayed(Slot::VideoOut1), GlyphColor::Yellow);
        assert_eq!(animator.displayed(Slot::VideoOut2), GlyphColor::Yellow);
    }

    #[test]
    fn ycrcb422_keeps_second_output_dark() {
        let (mut animator, _painter) = animator();
        animator.set_video_output(
            Some(crate::catalog::lookup(crate::catalog::FormatId(15)).unwrap()),
            DataFormat::YCrCb422,
        );
        animator.tick();
        assert_eq!(animator.displayed(Slot::VideoOut1), GlyphColor::Green);
        assert_eq!(animator.displayed(Slot::VideoOut2), GlyphColor::Grey);
        animator.tick();
        assert_eq!(animator.displayed(Slot::VideoOut2), GlyphColor::Grey);
    }

    #[test]
    fn sync_error_is_static_yellow() {
        let (mut animator, _painter) = animator();
        animator.set_sdi_sync_error();
        animator.tick();
        assert_eq!(animator.displayed(Slot::SdiSync), GlyphColor::Yellow);
        animator.tick();
        assert_eq!(animator.displayed(Slot::SdiSync), GlyphColor::Yellow);
    }

    #[test]
    fn registry_is_shared() {
        let a = GlyphRegistry::shared();
        let b = GlyphRegistry::shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(
            a.get(Slot::VideoOut1, GlyphColor::Green).asset,
            "gvo_banner_vid1_green"
        );
    }
}
