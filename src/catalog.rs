//! Static video/data format catalog.
//!
//! The video format table is declared once, in ascending id order, and
//! filtered at construction to the formats that fit the active screen. The
//! correction rule in [`crate::validity`] relies on the ascending ordering,
//! so it is checked at startup; a violation aborts construction of the whole
//! subsystem.

use thiserror::Error;

use crate::models::ScreenGeometry;

/// Identifier of a video format, as enumerated by the device.
///
/// Bit `i` of a validity bitmask corresponds to format id `i`. Id 0 is
/// reserved for "no format" and never appears in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatId(pub u8);

impl FormatId {
    /// The bitmask bit for this format.
    pub fn bit(self) -> u32 {
        1u32 << self.0
    }
}

impl Default for FormatId {
    fn default() -> Self {
        // First catalog entry; the documented fallback output format.
        FormatId(1)
    }
}

impl std::fmt::Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One video format descriptor. Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoFormat {
    pub id: FormatId,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    /// Refresh rate in millihertz (59.94 Hz == 59940).
    pub rate_millihz: u32,
}

impl VideoFormat {
    /// Standard-definition formats flash the yellow banner variant.
    pub fn is_sd(&self) -> bool {
        self.height < 720
    }
}

const fn vf(id: u8, name: &'static str, width: u32, height: u32, rate_millihz: u32) -> VideoFormat {
    VideoFormat {
        id: FormatId(id),
        name,
        width,
        height,
        rate_millihz,
    }
}

/// All video formats the device can enumerate, ascending by id.
pub static VIDEO_FORMATS: [VideoFormat; 28] = [
    vf(1, "480i 59.94 Hz (SMPTE259) NTSC", 720, 487, 59940),
    vf(2, "576i 50.00 Hz (SMPTE259) PAL", 720, 576, 50000),
    vf(3, "720p 23.98 Hz (SMPTE296)", 1280, 720, 23976),
    vf(4, "720p 24.00 Hz (SMPTE296)", 1280, 720, 24000),
    vf(5, "720p 25.00 Hz (SMPTE296)", 1280, 720, 25000),
    vf(6, "720p 29.97 Hz (SMPTE296)", 1280, 720, 29970),
    vf(7, "720p 30.00 Hz (SMPTE296)", 1280, 720, 30000),
    vf(8, "720p 50.00 Hz (SMPTE296)", 1280, 720, 50000),
    vf(9, "720p 59.94 Hz (SMPTE296)", 1280, 720, 59940),
    vf(10, "720p 60.00 Hz (SMPTE296)", 1280, 720, 60000),
    vf(11, "1035i 59.94 Hz (SMPTE260)", 1920, 1035, 59940),
    vf(12, "1035i 60.00 Hz (SMPTE260)", 1920, 1035, 60000),
    vf(13, "1080i 50.00 Hz (SMPTE295)", 1920, 1080, 50000),
    vf(14, "1080i 50.00 Hz (SMPTE274)", 1920, 1080, 50000),
    vf(15, "1080i 59.94 Hz (SMPTE274)", 1920, 1080, 59940),
    vf(16, "1080i 60.00 Hz (SMPTE274)", 1920, 1080, 60000),
    vf(17, "1080p 23.976 Hz (SMPTE274)", 1920, 1080, 23976),
    vf(18, "1080p 24.00 Hz (SMPTE274)", 1920, 1080, 24000),
    vf(19, "1080p 25.00 Hz (SMPTE274)", 1920, 1080, 25000),
    vf(20, "1080p 29.97 Hz (SMPTE274)", 1920, 1080, 29970),
    vf(21, "1080p 30.00 Hz (SMPTE274)", 1920, 1080, 30000),
    vf(22, "1080i 47.96 Hz (SMPTE274)", 1920, 1080, 47960),
    vf(23, "1080i 48.00 Hz (SMPTE274)", 1920, 1080, 48000),
    vf(24, "1080PsF 25.00 Hz (SMPTE274)", 1920, 1080, 25000),
    vf(25, "1080PsF 29.97 Hz (SMPTE274)", 1920, 1080, 29970),
    vf(26, "1080PsF 30.00 Hz (SMPTE274)", 1920, 1080, 30000),
    vf(27, "1080PsF 24.00 Hz (SMPTE274)", 1920, 1080, 24000),
    vf(28, "1080PsF 23.98 Hz (SMPTE274)", 1920, 1080, 23976),
];

/// Look up a format descriptor in the full (unfiltered) table.
pub fn lookup(id: FormatId) -> Option<&'static VideoFormat> {
    VIDEO_FORMATS.iter().find(|f| f.id == id)
}

/// Display name of a format, `"Unknown"` if the id is not enumerated.
pub fn name_of(id: FormatId) -> &'static str {
    lookup(id).map_or("Unknown", |f| f.name)
}

/// (width, height) of a format; (0, 0) for no signal or an unknown id.
pub fn resolution_of(id: Option<FormatId>) -> (u32, u32) {
    match id.and_then(lookup) {
        Some(f) => (f.width, f.height),
        None => (0, 0),
    }
}

/// Refresh rate in millihertz, if the id is enumerated.
pub fn rate_of(id: FormatId) -> Option<u32> {
    lookup(id).map(|f| f.rate_millihz)
}

/// Errors detected while building the catalog. Fatal to this subsystem only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The static table is not strictly ascending by id, or an id does not
    /// fit the 32-bit validity bitmask.
    #[error("video format table out of order at id {0}")]
    MisorderedTable(FormatId),

    /// A table entry has a zero dimension or refresh rate.
    #[error("video format {0} has incomplete details")]
    IncompleteEntry(FormatId),

    /// No enumerated format fits the active screen.
    #[error("no video format fits the {width} x {height} screen")]
    NoUsableFormat { width: u32, height: u32 },
}

/// The format catalog exposed to the controls: the static table filtered to
/// formats that fit the active screen.
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    exposed: Vec<&'static VideoFormat>,
    screen: ScreenGeometry,
}

impl FormatCatalog {
    /// Validate the static table and filter it to the given screen.
    pub fn for_screen(screen: ScreenGeometry) -> Result<Self, CatalogError> {
        let mut previous: Option<FormatId> = None;
        for format in &VIDEO_FORMATS {
            if format.id.0 >= 32 || previous.is_some_and(|p| p >= format.id) {
                return Err(CatalogError::MisorderedTable(format.id));
            }
            if format.width == 0 || format.height == 0 || format.rate_millihz == 0 {
                return Err(CatalogError::IncompleteEntry(format.id));
            }
            previous = Some(format.id);
        }

        let mut exposed = Vec::new();
        for format in &VIDEO_FORMATS {
            if format.width > screen.width || format.height > screen.height {
                tracing::warn!(
                    "Not exposing video format '{}' (requires at least {} x {}, \
                     screen is {} x {})",
                    format.name,
                    format.width,
                    format.height,
                    screen.width,
                    screen.height
                );
                continue;
            }
            exposed.push(format);
        }

        if exposed.is_empty() {
            return Err(CatalogError::NoUsableFormat {
                width: screen.width,
                height: screen.height,
            });
        }

        Ok(Self { exposed, screen })
    }

    /// Formats that fit the active screen, ascending by id.
    pub fn exposed(&self) -> &[&'static VideoFormat] {
        &self.exposed
    }

    /// Whether a format fits the active screen.
    pub fn is_exposed(&self, id: FormatId) -> bool {
        self.exposed.iter().any(|f| f.id == id)
    }

    /// The screen the catalog was filtered against.
    pub fn screen(&self) -> ScreenGeometry {
        self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_screen_exposes_everything() {
        let catalog = FormatCatalog::for_screen(ScreenGeometry {
            width: 1920,
            height: 1080,
        })
        .unwrap();
        assert_eq!(catalog.exposed().len(), VIDEO_FORMATS.len());
    }

    #[test]
    fn small_screen_filters_large_formats() {
        let catalog = FormatCatalog::for_screen(ScreenGeometry {
            width: 1280,
            height: 720,
        })
        .unwrap();
        assert!(catalog.is_exposed(FormatId(9))); // 720p 59.94
        assert!(!catalog.is_exposed(FormatId(15))); // 1080i 59.94
        assert!(catalog.exposed().iter().all(|f| f.height <= 720));
    }

    #[test]
    fn tiny_screen_is_unusable() {
        let err = FormatCatalog::for_screen(ScreenGeometry {
            width: 640,
            height: 480,
        })
        .unwrap_err();
        assert!(matches!(err, CatalogError::NoUsableFormat { .. }));
    }

    #[test]
    fn table_is_strictly_ascending() {
        for pair in VIDEO_FORMATS.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[test]
    fn sd_classification() {
        assert!(lookup(FormatId(1)).unwrap().is_sd()); // 480i
        assert!(lookup(FormatId(2)).unwrap().is_sd()); // 576i
        assert!(!lookup(FormatId(9)).unwrap().is_sd()); // 720p
    }

    #[test]
    fn lookup_unknown_id() {
        assert_eq!(lookup(FormatId(29)), None);
        assert_eq!(name_of(FormatId(29)), "Unknown");
        assert_eq!(resolution_of(None), (0, 0));
    }
}
