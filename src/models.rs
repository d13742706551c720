//! Core enums and the cached device attribute state.

use crate::catalog::FormatId;
use crate::validity::ValidityMask;

/// Output timing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Output timing is generated internally.
    #[default]
    FreeRunning,
    /// Output timing locks to the external reference signal.
    GenLock,
    /// Output timing locks to the external reference's frame rate only.
    FrameLock,
}

impl SyncMode {
    /// Decode from the device's integer encoding.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(SyncMode::FreeRunning),
            1 => Some(SyncMode::GenLock),
            2 => Some(SyncMode::FrameLock),
            _ => None,
        }
    }

    /// The device's integer encoding of this mode.
    pub fn raw(self) -> i64 {
        match self {
            SyncMode::FreeRunning => 0,
            SyncMode::GenLock => 1,
            SyncMode::FrameLock => 2,
        }
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::FreeRunning => write!(f, "Free Running"),
            SyncMode::GenLock => write!(f, "GenLock"),
            SyncMode::FrameLock => write!(f, "FrameLock"),
        }
    }
}

/// Which external reference supplies timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncSource {
    /// SDI-derived reference.
    #[default]
    Sdi,
    /// Composite-derived reference.
    Composite,
}

impl SyncSource {
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(SyncSource::Sdi),
            1 => Some(SyncSource::Composite),
            _ => None,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            SyncSource::Sdi => 0,
            SyncSource::Composite => 1,
        }
    }
}

/// Composite-sync input detection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeDetectMode {
    #[default]
    Auto,
    BiLevel,
    TriLevel,
}

impl CompositeDetectMode {
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(CompositeDetectMode::Auto),
            1 => Some(CompositeDetectMode::BiLevel),
            2 => Some(CompositeDetectMode::TriLevel),
            _ => None,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            CompositeDetectMode::Auto => 0,
            CompositeDetectMode::BiLevel => 1,
            CompositeDetectMode::TriLevel => 2,
        }
    }
}

/// The combined sync-format selection exposed as a single control.
///
/// One selection maps onto two device attributes: the sync source and the
/// composite-sync detect mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncFormat {
    #[default]
    Sdi,
    CompositeAuto,
    CompositeBiLevel,
    CompositeTriLevel,
}

impl SyncFormat {
    /// Decode from the control's value encoding.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(SyncFormat::Sdi),
            1 => Some(SyncFormat::CompositeAuto),
            2 => Some(SyncFormat::CompositeBiLevel),
            3 => Some(SyncFormat::CompositeTriLevel),
            _ => None,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            SyncFormat::Sdi => 0,
            SyncFormat::CompositeAuto => 1,
            SyncFormat::CompositeBiLevel => 2,
            SyncFormat::CompositeTriLevel => 3,
        }
    }

    /// The pair of device attribute values this selection stands for.
    pub fn parts(self) -> (SyncSource, CompositeDetectMode) {
        match self {
            SyncFormat::Sdi => (SyncSource::Sdi, CompositeDetectMode::Auto),
            SyncFormat::CompositeAuto => (SyncSource::Composite, CompositeDetectMode::Auto),
            SyncFormat::CompositeBiLevel => (SyncSource::Composite, CompositeDetectMode::BiLevel),
            SyncFormat::CompositeTriLevel => (SyncSource::Composite, CompositeDetectMode::TriLevel),
        }
    }

    /// The selection that corresponds to a (source, detect mode) pair.
    pub fn from_parts(source: SyncSource, mode: CompositeDetectMode) -> Self {
        match (source, mode) {
            (SyncSource::Sdi, _) => SyncFormat::Sdi,
            (SyncSource::Composite, CompositeDetectMode::Auto) => SyncFormat::CompositeAuto,
            (SyncSource::Composite, CompositeDetectMode::BiLevel) => SyncFormat::CompositeBiLevel,
            (SyncSource::Composite, CompositeDetectMode::TriLevel) => SyncFormat::CompositeTriLevel,
        }
    }
}

impl std::fmt::Display for SyncFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncFormat::Sdi => write!(f, "SDI Sync"),
            SyncFormat::CompositeAuto => write!(f, "COMP Sync"),
            SyncFormat::CompositeBiLevel => write!(f, "COMP Sync (Bi-level)"),
            SyncFormat::CompositeTriLevel => write!(f, "COMP Sync (Tri-level)"),
        }
    }
}

/// Output data (pixel) format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    #[default]
    YCrCb444,
    YCrCb422,
    Rgb444,
}

impl DataFormat {
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(DataFormat::YCrCb444),
            1 => Some(DataFormat::YCrCb422),
            2 => Some(DataFormat::Rgb444),
            _ => None,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            DataFormat::YCrCb444 => 0,
            DataFormat::YCrCb422 => 1,
            DataFormat::Rgb444 => 2,
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::YCrCb444 => write!(f, "RGB -> YCrCb (4:4:4)"),
            DataFormat::YCrCb422 => write!(f, "RGB -> YCrCb (4:2:2)"),
            DataFormat::Rgb444 => write!(f, "RGB (4:4:4)"),
        }
    }
}

/// Class of detected SDI-sync input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SdiSyncDetect {
    /// No SDI sync input detected.
    #[default]
    None,
    /// High-definition sync input detected.
    Hd,
    /// Standard-definition sync input detected.
    Sd,
}

impl SdiSyncDetect {
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(SdiSyncDetect::None),
            1 => Some(SdiSyncDetect::Hd),
            2 => Some(SdiSyncDetect::Sd),
            _ => None,
        }
    }

    /// Whether any SDI sync input is present.
    pub fn detected(self) -> bool {
        self != SdiSyncDetect::None
    }
}

/// Who, if anyone, is currently driving the video output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputState {
    /// Output is not in use.
    #[default]
    Inactive,
    /// The display server scans out to the output.
    InUseByDisplay,
    /// An external render client holds the output lock.
    InUseByRender,
}

impl std::fmt::Display for OutputState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputState::Inactive => write!(f, "Inactive"),
            OutputState::InUseByDisplay => write!(f, "In Use by Display"),
            OutputState::InUseByRender => write!(f, "In Use by Render Client"),
        }
    }
}

/// Active screen resolution, used to filter the format catalog and to bound
/// the pan offset controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
}

/// Cached device attribute state.
///
/// Reflects the last confirmed device value for every tracked attribute. A
/// write is considered pending until a read-back confirms it; only
/// [`GvoController`](crate::controller::GvoController) mutates this.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceAttributeState {
    pub sync_mode: SyncMode,
    pub sync_source: SyncSource,
    pub composite_detect_mode: CompositeDetectMode,
    /// Active output format. Always a member of `valid_output_mask` when the
    /// mask is non-empty.
    pub output_video_format: FormatId,
    pub output_data_format: DataFormat,
    /// Detected incoming format; `None` when no signal is present.
    pub input_video_format: Option<FormatId>,
    pub hsync_delay: i64,
    pub vsync_delay: i64,
    pub x_offset: i64,
    pub y_offset: i64,
    pub output_enabled: bool,
    pub external_lock: bool,
    pub composite_sync_detected: bool,
    pub sdi_sync_detected: SdiSyncDetect,
    /// Most recently computed validity mask for the output format.
    pub valid_output_mask: ValidityMask,
}
