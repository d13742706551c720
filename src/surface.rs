//! Control surface abstraction.
//!
//! The controller drives displayed values, sensitivity, and ranges through
//! these traits; the embedding UI implements them. Every setter is a *silent*
//! update: it changes what is displayed without ever invoking the control's
//! user-change handler. User changes enter the engine only through
//! [`GvoController::apply_user_change`](crate::controller::GvoController::apply_user_change),
//! so programmatic updates cannot re-enter it.

use crate::models::OutputState;

/// The controls this subsystem owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    SyncMode,
    SyncFormat,
    OutputVideoFormat,
    OutputDataFormat,
    HsyncDelay,
    VsyncDelay,
    XOffset,
    YOffset,
    OutputEnable,
    DetectInput,
}

/// Controls excluded from a bulk sensitivity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Exclude {
    pub enable_control: bool,
    pub detect_control: bool,
    pub offset_controls: bool,
}

impl Exclude {
    /// No exclusions.
    pub const NONE: Exclude = Exclude {
        enable_control: false,
        detect_control: false,
        offset_controls: false,
    };
}

/// Silent update operations on the displayed controls.
pub trait ControlSurface {
    /// Update a control's displayed value without invoking its user-change
    /// handler.
    fn set_value_silent(&mut self, control: Control, value: i64);

    /// Enable or disable a whole control.
    fn set_sensitive(&mut self, control: Control, sensitive: bool);

    /// Enable or disable a single choice of an enumerated control.
    fn set_choice_sensitive(&mut self, control: Control, value: i64, sensitive: bool);

    /// Update the legal range of a numeric control.
    fn set_range(&mut self, control: Control, min: i64, max: i64);

    /// Update the read-only incoming-signal display.
    fn set_input_format_text(&mut self, text: &str);

    /// Update the "current resolution / state" info line.
    fn set_current_info(&mut self, resolution: Option<(u32, u32)>, state: OutputState);

    /// Show or hide the busy indicator (used while detecting).
    fn set_busy(&mut self, busy: bool);
}

/// Fire-and-forget status line. A new message replaces any prior one.
pub trait StatusSink {
    fn post_status(&mut self, text: &str);
}
