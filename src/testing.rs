//! Shared test fakes: a scripted attribute channel and recording surfaces.
//!
//! Each fake is a cheap clonable handle around shared interior state, so a
//! test can keep a handle while the controller owns the other.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::banner::{Glyph, GlyphColor, Slot, SlotPainter};
use crate::channel::{Attribute, AttributeChannel, ChannelError, ChannelResult, ValidValues};
use crate::models::OutputState;
use crate::surface::{Control, ControlSurface, StatusSink};

#[derive(Default)]
struct ChannelState {
    values: HashMap<Attribute, i64>,
    unavailable: HashSet<Attribute>,
    /// Writes to these attributes are acknowledged but have no effect.
    sticky: HashSet<Attribute>,
    valid_values: HashMap<Attribute, ValidValues>,
    writes: Vec<(Attribute, i64)>,
    subscriptions: Vec<Attribute>,
}

/// Scripted in-memory device.
#[derive(Clone, Default)]
pub struct ScriptedChannel {
    state: Rc<RefCell<ChannelState>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device that supports the capability, reports every tracked
    /// attribute as zero, and accepts all output formats.
    pub fn supported() -> Self {
        let channel = Self::new();
        channel.put(Attribute::Supported, 1);
        channel.put(Attribute::FirmwareVersion, 3);
        for attribute in [
            Attribute::SyncMode,
            Attribute::SyncSource,
            Attribute::CompositeDetectMode,
            Attribute::OutputDataFormat,
            Attribute::InputVideoFormat,
            Attribute::SyncDelayPixels,
            Attribute::SyncDelayLines,
            Attribute::PanX,
            Attribute::PanY,
            Attribute::OutputEnabled,
            Attribute::ExternalLocked,
            Attribute::CompositeSyncDetected,
            Attribute::SdiSyncDetected,
        ] {
            channel.put(attribute, 0);
        }
        channel.put(Attribute::OutputVideoFormat, 1);
        channel.set_valid_mask(Attribute::OutputVideoFormat, u32::MAX & !1);
        channel
    }

    pub fn put(&self, attribute: Attribute, value: i64) {
        self.state.borrow_mut().values.insert(attribute, value);
    }

    pub fn mark_unavailable(&self, attribute: Attribute) {
        self.state.borrow_mut().unavailable.insert(attribute);
    }

    /// Make writes to an attribute stick-proof: acknowledged, no effect.
    pub fn mark_sticky(&self, attribute: Attribute) {
        self.state.borrow_mut().sticky.insert(attribute);
    }

    pub fn set_valid_mask(&self, attribute: Attribute, bits: u32) {
        self.state
            .borrow_mut()
            .valid_values
            .insert(attribute, ValidValues::Bitmask(bits));
    }

    pub fn value(&self, attribute: Attribute) -> Option<i64> {
        self.state.borrow().values.get(&attribute).copied()
    }

    pub fn writes(&self) -> Vec<(Attribute, i64)> {
        self.state.borrow().writes.clone()
    }

    pub fn writes_to(&self, attribute: Attribute) -> Vec<i64> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|(a, _)| *a == attribute)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    pub fn subscriptions(&self) -> Vec<Attribute> {
        self.state.borrow().subscriptions.clone()
    }
}

impl AttributeChannel for ScriptedChannel {
    fn get_integer(&self, attribute: Attribute) -> ChannelResult<i64> {
        let state = self.state.borrow();
        if state.unavailable.contains(&attribute) {
            return Err(ChannelError::Unavailable(attribute));
        }
        state
            .values
            .get(&attribute)
            .copied()
            .ok_or(ChannelError::Unavailable(attribute))
    }

    fn set_integer(&mut self, attribute: Attribute, value: i64) {
        let mut state = self.state.borrow_mut();
        state.writes.push((attribute, value));
        if !state.sticky.contains(&attribute) {
            state.values.insert(attribute, value);
        }
    }

    fn get_valid_values(&self, attribute: Attribute) -> ChannelResult<ValidValues> {
        let state = self.state.borrow();
        state
            .valid_values
            .get(&attribute)
            .copied()
            .ok_or(ChannelError::Unavailable(attribute))
    }

    fn subscribe(&mut self, attribute: Attribute) {
        self.state.borrow_mut().subscriptions.push(attribute);
    }
}

#[derive(Default)]
struct SurfaceState {
    values: HashMap<Control, i64>,
    sensitivity: HashMap<Control, bool>,
    choice_sensitivity: HashMap<(Control, i64), bool>,
    ranges: HashMap<Control, (i64, i64)>,
    input_text: String,
    current_info: (Option<(u32, u32)>, OutputState),
    busy: bool,
}

/// Records everything the controller pushes at the UI.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, control: Control) -> Option<i64> {
        self.state.borrow().values.get(&control).copied()
    }

    pub fn sensitive(&self, control: Control) -> Option<bool> {
        self.state.borrow().sensitivity.get(&control).copied()
    }

    pub fn choice_sensitive(&self, control: Control, value: i64) -> Option<bool> {
        self.state
            .borrow()
            .choice_sensitivity
            .get(&(control, value))
            .copied()
    }

    pub fn range(&self, control: Control) -> Option<(i64, i64)> {
        self.state.borrow().ranges.get(&control).copied()
    }

    pub fn input_text(&self) -> String {
        self.state.borrow().input_text.clone()
    }

    pub fn current_info(&self) -> (Option<(u32, u32)>, OutputState) {
        self.state.borrow().current_info
    }

    pub fn busy(&self) -> bool {
        self.state.borrow().busy
    }
}

impl ControlSurface for RecordingSurface {
    fn set_value_silent(&mut self, control: Control, value: i64) {
        self.state.borrow_mut().values.insert(control, value);
    }

    fn set_sensitive(&mut self, control: Control, sensitive: bool) {
        self.state.borrow_mut().sensitivity.insert(control, sensitive);
    }

    fn set_choice_sensitive(&mut self, control: Control, value: i64, sensitive: bool) {
        self.state
            .borrow_mut()
            .choice_sensitivity
            .insert((control, value), sensitive);
    }

    fn set_range(&mut self, control: Control, min: i64, max: i64) {
        self.state.borrow_mut().ranges.insert(control, (min, max));
    }

    fn set_input_format_text(&mut self, text: &str) {
        self.state.borrow_mut().input_text = text.to_string();
    }

    fn set_current_info(&mut self, resolution: Option<(u32, u32)>, state: OutputState) {
        self.state.borrow_mut().current_info = (resolution, state);
    }

    fn set_busy(&mut self, busy: bool) {
        self.state.borrow_mut().busy = busy;
    }
}

/// Records posted status messages.
#[derive(Clone, Default)]
pub struct RecordingStatus {
    messages: Rc<RefCell<Vec<String>>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.borrow().last().cloned()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl StatusSink for RecordingStatus {
    fn post_status(&mut self, text: &str) {
        self.messages.borrow_mut().push(text.to_string());
    }
}

/// Records banner repaints.
#[derive(Clone, Default)]
pub struct RecordingPainter {
    paints: Rc<RefCell<Vec<(Slot, GlyphColor, &'static str)>>>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paint_count(&self) -> usize {
        self.paints.borrow().len()
    }
}

impl SlotPainter for RecordingPainter {
    fn paint(&mut self, slot: Slot, glyph: &Glyph) {
        self.paints.borrow_mut().push((slot, glyph.color, glyph.asset));
    }
}
