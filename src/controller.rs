//! Attribute cache and write-then-verify controller.
//!
//! The controller owns the cached [`DeviceAttributeState`] and is the only
//! code that mutates it. Every user change follows the same discipline: write
//! the attribute, read it back, and either commit the cache or silently
//! revert the control and report the rejection. External events take the
//! other path, [`GvoController::reconcile_external_event`], which updates the
//! cache and the displayed controls without echoing a write back at the
//! device. The one exception either path allows is a *corrective* write to a
//! different attribute when an invariant would otherwise break (the active
//! output format falling out of the valid set, or a locked sync mode losing
//! its reference signal).

use crate::banner::BannerAnimator;
use crate::catalog::{self, FormatCatalog, FormatId};
use crate::channel::{Attribute, AttributeChannel, ValidValues};
use crate::errors::{GvoError, GvoResult};
use crate::models::{
    CompositeDetectMode, DataFormat, DeviceAttributeState, OutputState, ScreenGeometry,
    SdiSyncDetect, SyncFormat, SyncMode, SyncSource,
};
use crate::surface::{Control, ControlSurface, Exclude, StatusSink};
use crate::validity::{
    self, compute_output_format_mask, compute_sync_mode_sensitivity, ValidityMask,
};

/// Attributes whose external changes the controller wants delivered to
/// [`GvoController::reconcile_external_event`].
const EVENT_ATTRIBUTES: [Attribute; 11] = [
    Attribute::SyncMode,
    Attribute::SyncSource,
    Attribute::CompositeDetectMode,
    Attribute::OutputVideoFormat,
    Attribute::OutputDataFormat,
    Attribute::SyncDelayPixels,
    Attribute::SyncDelayLines,
    Attribute::PanX,
    Attribute::PanY,
    Attribute::ExternalLocked,
    Attribute::OutputEnabled,
];

/// Controller for one graphics-to-video output device.
pub struct GvoController<C: AttributeChannel> {
    channel: C,
    surface: Box<dyn ControlSurface>,
    status: Box<dyn StatusSink>,
    catalog: FormatCatalog,
    state: DeviceAttributeState,
    /// Whether the sync-format control is currently allowed to be sensitive
    /// (it never is while free running, whatever the bulk sensitivity says).
    sync_format_sensitive: bool,
    firmware: String,
}

impl<C: AttributeChannel> std::fmt::Debug for GvoController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GvoController")
            .field("state", &self.state)
            .field("sync_format_sensitive", &self.sync_format_sensitive)
            .field("firmware", &self.firmware)
            .finish_non_exhaustive()
    }
}

impl<C: AttributeChannel> GvoController<C> {
    /// Probe the device, seed the attribute cache, and push the initial
    /// control values.
    ///
    /// Fails with [`GvoError::Unsupported`] when the device does not report
    /// the capability, and with a catalog error when the static format table
    /// is unusable. Any other attribute that cannot be read falls back to a
    /// benign default (free running, SDI source, format id 1, zero delays
    /// and offsets, output disabled).
    pub fn new(
        mut channel: C,
        surface: Box<dyn ControlSurface>,
        status: Box<dyn StatusSink>,
        screen: ScreenGeometry,
    ) -> GvoResult<Self> {
        let catalog = FormatCatalog::for_screen(screen)?;

        match channel.get_integer(Attribute::Supported) {
            Ok(v) if v != 0 => {}
            _ => return Err(GvoError::Unsupported),
        }

        let firmware = match channel.get_integer(Attribute::FirmwareVersion) {
            Ok(v) => format!("1.{:02}", v),
            Err(_) => "???".to_string(),
        };

        for attribute in EVENT_ATTRIBUTES {
            channel.subscribe(attribute);
        }

        let read_or = |channel: &C, attribute: Attribute, default: i64| -> i64 {
            match channel.get_integer(attribute) {
                Ok(v) => v,
                Err(_) => {
                    tracing::debug!("attribute {attribute:?} unavailable, assuming {default}");
                    default
                }
            }
        };

        let mut state = DeviceAttributeState {
            sync_mode: SyncMode::from_raw(read_or(&channel, Attribute::SyncMode, 0))
                .unwrap_or_default(),
            sync_source: SyncSource::from_raw(read_or(&channel, Attribute::SyncSource, 0))
                .unwrap_or_default(),
            composite_detect_mode: CompositeDetectMode::from_raw(read_or(
                &channel,
                Attribute::CompositeDetectMode,
                0,
            ))
            .unwrap_or_default(),
            output_video_format: decode_format_id(read_or(
                &channel,
                Attribute::OutputVideoFormat,
                1,
            ))
            .unwrap_or_default(),
            output_data_format: DataFormat::default(),
            input_video_format: decode_format_id(read_or(
                &channel,
                Attribute::InputVideoFormat,
                0,
            )),
            hsync_delay: read_or(&channel, Attribute::SyncDelayPixels, 0),
            vsync_delay: read_or(&channel, Attribute::SyncDelayLines, 0),
            x_offset: read_or(&channel, Attribute::PanX, 0),
            y_offset: read_or(&channel, Attribute::PanY, 0),
            output_enabled: read_or(&channel, Attribute::OutputEnabled, 0) != 0,
            external_lock: read_or(&channel, Attribute::ExternalLocked, 0) != 0,
            composite_sync_detected: read_or(&channel, Attribute::CompositeSyncDetected, 0) != 0,
            sdi_sync_detected: SdiSyncDetect::from_raw(read_or(
                &channel,
                Attribute::SdiSyncDetected,
                0,
            ))
            .unwrap_or_default(),
            valid_output_mask: ValidityMask::EMPTY,
        };

        // A data format outside the known set is corrected on the device,
        // not carried around as an unknown.
        match DataFormat::from_raw(read_or(&channel, Attribute::OutputDataFormat, 0)) {
            Some(df) => state.output_data_format = df,
            None => {
                let fallback = DataFormat::default();
                tracing::info!("unrecognized output data format, correcting to '{fallback}'");
                channel.set_integer(Attribute::OutputDataFormat, fallback.raw());
                state.output_data_format = fallback;
            }
        }

        let mut controller = Self {
            channel,
            surface,
            status,
            catalog,
            state,
            sync_format_sensitive: false,
            firmware,
        };
        controller.sync_surface_initial();
        Ok(controller)
    }

    /// Last confirmed device state.
    pub fn state(&self) -> &DeviceAttributeState {
        &self.state
    }

    /// Firmware version string, `"???"` when the device would not say.
    pub fn firmware_version(&self) -> &str {
        &self.firmware
    }

    pub fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    /// Push every displayed value, sensitivity, and range once at startup.
    fn sync_surface_initial(&mut self) {
        self.surface
            .set_value_silent(Control::SyncMode, self.state.sync_mode.raw());
        self.surface.set_value_silent(
            Control::SyncFormat,
            SyncFormat::from_parts(self.state.sync_source, self.state.composite_detect_mode)
                .raw(),
        );
        self.surface.set_value_silent(
            Control::OutputVideoFormat,
            self.state.output_video_format.0 as i64,
        );
        self.surface.set_value_silent(
            Control::OutputDataFormat,
            self.state.output_data_format.raw(),
        );
        self.surface
            .set_value_silent(Control::HsyncDelay, self.state.hsync_delay);
        self.surface
            .set_value_silent(Control::VsyncDelay, self.state.vsync_delay);
        self.surface
            .set_value_silent(Control::XOffset, self.state.x_offset);
        self.surface
            .set_value_silent(Control::YOffset, self.state.y_offset);
        self.surface
            .set_value_silent(Control::OutputEnable, self.state.output_enabled as i64);

        self.update_sync_mode_choices();
        self.refresh_output_format_mask();
        self.update_sync_format_sensitivity();
        self.update_input_format_text();
        self.update_delay_ranges();
        self.update_offset_ranges();

        if self.state.external_lock {
            self.update_current_info(OutputState::InUseByRender);
            self.set_all_sensitive(false, Exclude::NONE);
        } else if self.state.output_enabled {
            self.update_current_info(OutputState::InUseByDisplay);
            self.set_all_sensitive(
                false,
                Exclude {
                    enable_control: true,
                    offset_controls: true,
                    detect_control: false,
                },
            );
        } else {
            self.update_current_info(OutputState::Inactive);
        }
    }

    /// Seed the banner from the cached state. Called once after construction
    /// and after every probe.
    pub fn refresh_banner(&self, banner: &mut BannerAnimator) {
        banner.set_sync_input(
            self.state.sdi_sync_detected,
            self.state.composite_sync_detected,
        );
        let format = if self.state.output_enabled {
            catalog::lookup(self.state.output_video_format)
        } else {
            None
        };
        banner.set_video_output(format, self.state.output_data_format);
    }

    // ----- user changes ---------------------------------------------------

    /// Handle a user change on one of the single-attribute controls.
    ///
    /// The value is written, read back, and committed only when the device
    /// confirms it; otherwise the control silently snaps back to the cached
    /// value and the rejection is reported on the status line.
    pub fn apply_user_change(
        &mut self,
        banner: &mut BannerAnimator,
        attribute: Attribute,
        value: i64,
    ) {
        match attribute {
            Attribute::SyncMode => self.user_sync_mode(value),
            Attribute::OutputVideoFormat => self.user_output_video_format(value),
            Attribute::OutputDataFormat => self.user_output_data_format(value),
            Attribute::SyncDelayPixels
            | Attribute::SyncDelayLines
            | Attribute::PanX
            | Attribute::PanY => self.user_numeric(attribute, value),
            Attribute::OutputEnabled => self.user_output_enable(banner, value != 0),
            other => {
                tracing::warn!("ignoring user change for untracked attribute {other:?}");
            }
        }
    }

    /// Handle a user change on the combined sync-format control, which maps
    /// onto two device attributes.
    pub fn apply_sync_format(&mut self, value: i64) {
        let Some(format) = SyncFormat::from_raw(value) else {
            tracing::warn!("ignoring unknown sync format selection {value}");
            return;
        };
        let (source, mode) = format.parts();
        self.channel.set_integer(Attribute::SyncSource, source.raw());
        self.channel
            .set_integer(Attribute::CompositeDetectMode, mode.raw());

        let confirmed = self.read_back(Attribute::SyncSource) == Some(source.raw())
            && self.read_back(Attribute::CompositeDetectMode) == Some(mode.raw());
        if confirmed {
            self.state.sync_source = source;
            self.state.composite_detect_mode = mode;
            self.post_status(&format!("Sync Format set to \"{format}\"."));
        } else {
            let cached =
                SyncFormat::from_parts(self.state.sync_source, self.state.composite_detect_mode);
            self.surface
                .set_value_silent(Control::SyncFormat, cached.raw());
            self.post_status("Sync Format change rejected by device.");
        }
    }

    fn user_sync_mode(&mut self, value: i64) {
        let Some(mode) = SyncMode::from_raw(value) else {
            tracing::warn!("ignoring unknown sync mode selection {value}");
            return;
        };
        self.channel.set_integer(Attribute::SyncMode, mode.raw());
        if mode != SyncMode::FreeRunning {
            // Re-assert the sync source so the device locks to the source
            // the user last chose, not whatever it defaulted to.
            self.channel
                .set_integer(Attribute::SyncSource, self.state.sync_source.raw());
        }

        if self.read_back(Attribute::SyncMode) == Some(mode.raw()) {
            self.state.sync_mode = mode;
            self.refresh_output_format_mask();
            self.update_sync_format_sensitivity();
            self.update_input_format_text();
            self.post_status(&format!("Sync Mode set to {mode}."));
        } else {
            self.surface
                .set_value_silent(Control::SyncMode, self.state.sync_mode.raw());
            self.post_status("Sync Mode change rejected by device.");
        }
    }

    fn user_output_video_format(&mut self, value: i64) {
        let Some(id) = decode_format_id(value) else {
            tracing::warn!("ignoring unknown output video format selection {value}");
            self.revert_output_video_format();
            return;
        };

        // Illegal picks are refused up front, before touching the device.
        if !self.state.valid_output_mask.contains(id) {
            self.post_status(&format!(
                "Invalid Output Video Format: {}; ignoring.",
                catalog::name_of(id)
            ));
            self.revert_output_video_format();
            return;
        }

        if self.write_verified(Attribute::OutputVideoFormat, id.0 as i64) {
            self.state.output_video_format = id;
            self.update_offset_ranges();
            self.post_status(&format!(
                "Output Video Format set to: {}.",
                catalog::name_of(id)
            ));
        } else {
            self.revert_output_video_format();
            self.post_status("Output Video Format change rejected by device.");
        }
    }

    fn revert_output_video_format(&mut self) {
        self.surface.set_value_silent(
            Control::OutputVideoFormat,
            self.state.output_video_format.0 as i64,
        );
    }

    fn user_output_data_format(&mut self, value: i64) {
        let Some(format) = DataFormat::from_raw(value) else {
            tracing::warn!("ignoring unknown output data format selection {value}");
            return;
        };
        if self.write_verified(Attribute::OutputDataFormat, format.raw()) {
            self.state.output_data_format = format;
            self.post_status(&format!("Output Data Format set to: {format}."));
        } else {
            self.surface.set_value_silent(
                Control::OutputDataFormat,
                self.state.output_data_format.raw(),
            );
            self.post_status("Output Data Format change rejected by device.");
        }
    }

    fn user_numeric(&mut self, attribute: Attribute, value: i64) {
        let (control, label) = match attribute {
            Attribute::SyncDelayPixels => (Control::HsyncDelay, "HSync Delay"),
            Attribute::SyncDelayLines => (Control::VsyncDelay, "VSync Delay"),
            Attribute::PanX => (Control::XOffset, "X Offset"),
            Attribute::PanY => (Control::YOffset, "Y Offset"),
            _ => return,
        };

        if self.write_verified(attribute, value) {
            match attribute {
                Attribute::SyncDelayPixels => self.state.hsync_delay = value,
                Attribute::SyncDelayLines => self.state.vsync_delay = value,
                Attribute::PanX => self.state.x_offset = value,
                Attribute::PanY => self.state.y_offset = value,
                _ => {}
            }
            self.post_status(&format!("{label} set to {value}."));
        } else {
            let cached = match attribute {
                Attribute::SyncDelayPixels => self.state.hsync_delay,
                Attribute::SyncDelayLines => self.state.vsync_delay,
                Attribute::PanX => self.state.x_offset,
                Attribute::PanY => self.state.y_offset,
                _ => 0,
            };
            self.surface.set_value_silent(control, cached);
            self.post_status(&format!("{label} change rejected by device."));
        }
    }

    fn user_output_enable(&mut self, banner: &mut BannerAnimator, enabled: bool) {
        self.channel
            .set_integer(Attribute::OutputEnabled, enabled as i64);
        let confirmed = self
            .read_back(Attribute::OutputEnabled)
            .is_some_and(|v| (v != 0) == enabled);

        if !confirmed {
            // Another client holds the output; the toggle snaps back without
            // the enabled state ever being entered locally.
            self.surface
                .set_value_silent(Control::OutputEnable, self.state.output_enabled as i64);
            self.post_status("SDI output change rejected; output is held by another client.");
            return;
        }

        self.enter_output_enabled(banner, enabled);
        self.post_status(if enabled {
            "SDI Output enabled."
        } else {
            "SDI Output disabled."
        });
    }

    /// Shared tail of the enable/disable transition: cache, banner, info
    /// line, and bulk sensitivity. Silent; both the verified user path and
    /// the external-event path end here.
    fn enter_output_enabled(&mut self, banner: &mut BannerAnimator, enabled: bool) {
        self.state.output_enabled = enabled;
        if enabled {
            banner.set_video_output(
                catalog::lookup(self.state.output_video_format),
                self.state.output_data_format,
            );
            self.update_current_info(OutputState::InUseByDisplay);
        } else {
            banner.set_video_output(None, self.state.output_data_format);
            self.update_current_info(OutputState::Inactive);
        }
        // While enabled, everything except the enable toggle and the pan
        // offsets is frozen.
        self.set_all_sensitive(
            !enabled,
            Exclude {
                enable_control: true,
                offset_controls: true,
                detect_control: false,
            },
        );
    }

    // ----- external events ------------------------------------------------

    /// Fold an externally originated attribute change into the cache and the
    /// displayed controls.
    ///
    /// Never echoes the changed value back at the device, so event storms
    /// cannot loop; replaying the same event is a no-op. Corrective writes
    /// to *other* attributes still happen when the change breaks an
    /// invariant.
    pub fn reconcile_external_event(
        &mut self,
        banner: &mut BannerAnimator,
        attribute: Attribute,
        value: i64,
    ) {
        match attribute {
            Attribute::SyncMode => {
                let Some(mode) = SyncMode::from_raw(value) else {
                    return;
                };
                self.state.sync_mode = mode;
                self.surface
                    .set_value_silent(Control::SyncMode, mode.raw());
                self.refresh_output_format_mask();
                self.update_sync_format_sensitivity();
                self.update_input_format_text();
            }
            Attribute::SyncSource => {
                let Some(source) = SyncSource::from_raw(value) else {
                    return;
                };
                self.state.sync_source = source;
                self.sync_format_control_from_cache();
            }
            Attribute::CompositeDetectMode => {
                let Some(mode) = CompositeDetectMode::from_raw(value) else {
                    return;
                };
                self.state.composite_detect_mode = mode;
                self.sync_format_control_from_cache();
            }
            Attribute::OutputVideoFormat => {
                let Some(id) = decode_format_id(value) else {
                    return;
                };
                self.state.output_video_format = id;
                self.surface
                    .set_value_silent(Control::OutputVideoFormat, id.0 as i64);
                self.update_offset_ranges();
                self.post_status(&format!(
                    "Output Video Format set to: {}.",
                    catalog::name_of(id)
                ));
            }
            Attribute::OutputDataFormat => {
                let Some(format) = DataFormat::from_raw(value) else {
                    return;
                };
                self.state.output_data_format = format;
                self.surface
                    .set_value_silent(Control::OutputDataFormat, format.raw());
                self.post_status(&format!("Output Data Format set to: {format}."));
            }
            Attribute::SyncDelayPixels => {
                self.state.hsync_delay = value;
                self.surface.set_value_silent(Control::HsyncDelay, value);
            }
            Attribute::SyncDelayLines => {
                self.state.vsync_delay = value;
                self.surface.set_value_silent(Control::VsyncDelay, value);
            }
            Attribute::PanX => {
                self.state.x_offset = value;
                self.surface.set_value_silent(Control::XOffset, value);
            }
            Attribute::PanY => {
                self.state.y_offset = value;
                self.surface.set_value_silent(Control::YOffset, value);
            }
            Attribute::ExternalLocked => {
                let locked = value != 0;
                self.state.external_lock = locked;
                if locked {
                    self.update_current_info(OutputState::InUseByRender);
                    self.set_all_sensitive(false, Exclude::NONE);
                } else {
                    self.update_current_info(OutputState::Inactive);
                    self.set_all_sensitive(true, Exclude::NONE);
                }
            }
            Attribute::OutputEnabled => {
                // The event payload can lag a rapid toggle; the device is
                // re-read and the fresh value wins.
                let Ok(raw) = self.channel.get_integer(Attribute::OutputEnabled) else {
                    return;
                };
                let enabled = raw != 0;
                self.surface
                    .set_value_silent(Control::OutputEnable, enabled as i64);
                self.enter_output_enabled(banner, enabled);
                self.post_status(if enabled {
                    "SDI Output enabled."
                } else {
                    "SDI Output disabled."
                });
            }
            other => {
                tracing::debug!("ignoring external event for attribute {other:?}");
            }
        }
    }

    fn sync_format_control_from_cache(&mut self) {
        let format =
            SyncFormat::from_parts(self.state.sync_source, self.state.composite_detect_mode);
        self.surface
            .set_value_silent(Control::SyncFormat, format.raw());
    }

    // ----- polling --------------------------------------------------------

    /// Re-read the input-signal attributes and fold the result into the
    /// cache, the input display, the banner, and the control ranges.
    ///
    /// While output is enabled the sync-mode and format-menu state is left
    /// alone; the frozen controls are refreshed on the disable transition.
    pub fn probe(&mut self, banner: &mut BannerAnimator) {
        self.state.input_video_format = self
            .channel
            .get_integer(Attribute::InputVideoFormat)
            .ok()
            .and_then(decode_format_id);
        self.state.composite_sync_detected = self
            .channel
            .get_integer(Attribute::CompositeSyncDetected)
            .unwrap_or(0)
            != 0;
        self.state.sdi_sync_detected = self
            .channel
            .get_integer(Attribute::SdiSyncDetected)
            .ok()
            .and_then(SdiSyncDetect::from_raw)
            .unwrap_or_default();

        self.update_input_format_text();
        if !self.state.output_enabled {
            self.update_sync_mode_choices();
            self.refresh_output_format_mask();
        }
        banner.set_sync_input(
            self.state.sdi_sync_detected,
            self.state.composite_sync_detected,
        );
        self.update_delay_ranges();
        self.update_offset_ranges();
    }

    // ----- detect sequence ------------------------------------------------

    /// Put the device into signal-reacquisition mode and freeze every
    /// control except the detect toggle itself.
    pub(crate) fn begin_detect(&mut self) {
        self.surface.set_busy(true);
        self.set_all_sensitive(
            false,
            Exclude {
                enable_control: false,
                offset_controls: false,
                detect_control: true,
            },
        );
        self.channel.set_integer(Attribute::Reacquire, 1);
        self.post_status("Detecting incoming signal...");
    }

    /// Leave reacquisition mode, probe once, and thaw the controls. The
    /// detect toggle is released silently so its handler does not re-fire.
    pub(crate) fn end_detect(&mut self, banner: &mut BannerAnimator) {
        self.channel.set_integer(Attribute::Reacquire, 0);
        self.probe(banner);
        self.surface.set_value_silent(Control::DetectInput, 0);
        self.post_status("Done detecting incoming signal.");
        self.set_all_sensitive(
            true,
            Exclude {
                enable_control: false,
                offset_controls: false,
                detect_control: true,
            },
        );
        self.surface.set_busy(false);
    }

    // ----- invariants and derived control state ---------------------------

    /// Recompute GenLock/FrameLock availability from the detected sync
    /// inputs; when neither input is present and a locked mode is active,
    /// force the mode back to free running with a corrective write.
    fn update_sync_mode_choices(&mut self) {
        let adjust = compute_sync_mode_sensitivity(
            self.state.composite_sync_detected,
            self.state.sdi_sync_detected,
            self.state.sync_mode,
        );
        self.surface.set_choice_sensitive(
            Control::SyncMode,
            SyncMode::GenLock.raw(),
            adjust.lock_modes_sensitive,
        );
        self.surface.set_choice_sensitive(
            Control::SyncMode,
            SyncMode::FrameLock.raw(),
            adjust.lock_modes_sensitive,
        );

        if adjust.force_free_running {
            tracing::info!("no external sync detected; forcing sync mode to free running");
            self.channel
                .set_integer(Attribute::SyncMode, SyncMode::FreeRunning.raw());
            self.surface
                .set_value_silent(Control::SyncMode, SyncMode::FreeRunning.raw());
            self.state.sync_mode = SyncMode::FreeRunning;
            self.update_sync_format_sensitivity();
            self.update_input_format_text();
        }
    }

    /// Recompute the output-format validity mask, trim the menu, and issue
    /// one corrective write when the active format fell out of the set.
    fn refresh_output_format_mask(&mut self) {
        let device_mask = match self.channel.get_valid_values(Attribute::OutputVideoFormat) {
            Ok(ValidValues::Bitmask(bits)) => ValidityMask::from_bits(bits),
            Ok(other) => {
                tracing::warn!("output format valid values are not a bitmask: {other:?}");
                ValidityMask::EMPTY
            }
            Err(_) => ValidityMask::EMPTY,
        };

        let mask = compute_output_format_mask(
            self.state.sync_mode,
            self.state.input_video_format,
            device_mask,
        );

        for format in self.catalog.exposed() {
            self.surface.set_choice_sensitive(
                Control::OutputVideoFormat,
                format.id.0 as i64,
                mask.contains(format.id),
            );
        }

        if let Some(corrected) = validity::enforce(mask, self.state.output_video_format) {
            tracing::info!(
                "active output format no longer valid; correcting to '{}'",
                catalog::name_of(corrected)
            );
            self.channel
                .set_integer(Attribute::OutputVideoFormat, corrected.0 as i64);
            self.surface
                .set_value_silent(Control::OutputVideoFormat, corrected.0 as i64);
            self.state.output_video_format = corrected;
            self.update_offset_ranges();
        }

        self.state.valid_output_mask = mask;
    }

    fn update_sync_format_sensitivity(&mut self) {
        self.sync_format_sensitive = self.state.sync_mode != SyncMode::FreeRunning;
        self.surface
            .set_sensitive(Control::SyncFormat, self.sync_format_sensitive);
    }

    fn update_input_format_text(&mut self) {
        if self.state.sync_mode == SyncMode::FreeRunning {
            self.surface.set_input_format_text("Free Running");
            return;
        }
        let text = match self.state.input_video_format {
            Some(id) => catalog::name_of(id),
            None => "No incoming signal detected",
        };
        self.surface.set_input_format_text(text);
    }

    /// Sync delays are bounded by the incoming format's dimensions.
    fn update_delay_ranges(&mut self) {
        let (width, height) = catalog::resolution_of(self.state.input_video_format);
        self.surface
            .set_range(Control::HsyncDelay, 0, width as i64);
        self.surface
            .set_range(Control::VsyncDelay, 0, height as i64);
    }

    /// Pan offsets are bounded by how far the output raster can slide
    /// inside the screen.
    fn update_offset_ranges(&mut self) {
        let (width, height) = catalog::resolution_of(Some(self.state.output_video_format));
        let screen = self.catalog.screen();
        let max_x = screen.width.saturating_sub(width) as i64;
        let max_y = screen.height.saturating_sub(height) as i64;
        self.surface.set_range(Control::XOffset, 0, max_x);
        self.surface.set_range(Control::YOffset, 0, max_y);
    }

    fn set_all_sensitive(&mut self, sensitive: bool, exclude: Exclude) {
        for control in [
            Control::SyncMode,
            Control::OutputVideoFormat,
            Control::OutputDataFormat,
            Control::HsyncDelay,
            Control::VsyncDelay,
        ] {
            self.surface.set_sensitive(control, sensitive);
        }
        if !exclude.offset_controls {
            self.surface.set_sensitive(Control::XOffset, sensitive);
            self.surface.set_sensitive(Control::YOffset, sensitive);
        }
        if !exclude.enable_control {
            self.surface.set_sensitive(Control::OutputEnable, sensitive);
        }
        if !exclude.detect_control {
            self.surface.set_sensitive(Control::DetectInput, sensitive);
        }
        // The sync-format control only ever thaws while a locked mode is
        // active.
        self.surface.set_sensitive(
            Control::SyncFormat,
            sensitive && self.sync_format_sensitive,
        );
    }

    fn update_current_info(&mut self, output_state: OutputState) {
        let resolution = match output_state {
            OutputState::Inactive => None,
            _ => Some(catalog::resolution_of(Some(self.state.output_video_format))),
        };
        self.surface.set_current_info(resolution, output_state);
    }

    // ----- plumbing ---------------------------------------------------------

    /// Write, then read back: true when the device confirms the value.
    fn write_verified(&mut self, attribute: Attribute, value: i64) -> bool {
        self.channel.set_integer(attribute, value);
        self.read_back(attribute) == Some(value)
    }

    fn read_back(&mut self, attribute: Attribute) -> Option<i64> {
        match self.channel.get_integer(attribute) {
            Ok(v) => Some(v),
            Err(err) => {
                tracing::warn!("read-back of {attribute:?} failed: {err}");
                None
            }
        }
    }

    fn post_status(&mut self, text: &str) {
        tracing::info!("{text}");
        self.status.post_status(text);
    }
}

/// Decode a raw attribute value as a format id. Zero and out-of-range values
/// mean "no format".
fn decode_format_id(raw: i64) -> Option<FormatId> {
    if (1..32).contains(&raw) {
        Some(FormatId(raw as u8))
    } else {
        None
    }
}
