//! Pure validity negotiation for the output format and sync mode.
//!
//! Everything here is a pure function over the cached attribute state; the
//! controller decides when to recompute and what writes to issue.

use crate::catalog::{self, FormatId, VIDEO_FORMATS};
use crate::models::{SdiSyncDetect, SyncMode};

/// Bitmask over format ids: bit `i` set means format id `i` is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidityMask(u32);

impl ValidityMask {
    /// The empty mask: no format is legal.
    pub const EMPTY: ValidityMask = ValidityMask(0);

    /// Build from the device's raw bitmask encoding.
    pub fn from_bits(bits: u32) -> Self {
        ValidityMask(bits)
    }

    /// The raw bitmask.
    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, id: FormatId) -> bool {
        self.0 & id.bit() != 0
    }

    /// Mask containing exactly one format.
    pub fn single(id: FormatId) -> Self {
        ValidityMask(id.bit())
    }

    pub fn intersect(self, other: ValidityMask) -> ValidityMask {
        ValidityMask(self.0 & other.0)
    }

    pub fn remove(self, id: FormatId) -> ValidityMask {
        ValidityMask(self.0 & !id.bit())
    }

    /// The lowest-numbered format id in the mask, if any.
    pub fn lowest(self) -> Option<FormatId> {
        if self.is_empty() {
            None
        } else {
            Some(FormatId(self.0.trailing_zeros() as u8))
        }
    }
}

/// Compute the set of output formats currently legal, given the sync mode,
/// the detected input format, and the device-reported valid set.
///
/// Free running passes the device mask through. GenLock restricts it to the
/// exact detected input format, FrameLock to formats sharing the input's
/// refresh rate; in either locked mode an absent input signal leaves nothing
/// legal.
pub fn compute_output_format_mask(
    sync_mode: SyncMode,
    input_format: Option<FormatId>,
    device_mask: ValidityMask,
) -> ValidityMask {
    match sync_mode {
        SyncMode::FreeRunning => device_mask,
        SyncMode::GenLock => match input_format {
            Some(input) => device_mask.intersect(ValidityMask::single(input)),
            None => ValidityMask::EMPTY,
        },
        SyncMode::FrameLock => match input_format.and_then(catalog::rate_of) {
            Some(rate) => {
                let mut mask = device_mask;
                for format in &VIDEO_FORMATS {
                    if format.rate_millihz != rate {
                        mask = mask.remove(format.id);
                    }
                }
                mask
            }
            None => ValidityMask::EMPTY,
        },
    }
}

/// Check the active output format against the mask.
///
/// Returns the corrected format id when the active format is no longer legal
/// and a legal alternative exists; the caller must issue one corrective
/// write. The lowest-numbered legal id is chosen (the catalog's declaration
/// order, preserved as the documented tie-break). An empty mask leaves the
/// active format unchanged.
pub fn enforce(mask: ValidityMask, current: FormatId) -> Option<FormatId> {
    if mask.is_empty() || mask.contains(current) {
        None
    } else {
        mask.lowest()
    }
}

/// Outcome of the sync-mode sensitivity rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncModeAdjust {
    /// Whether GenLock and FrameLock may be offered at all.
    pub lock_modes_sensitive: bool,
    /// Whether the active mode must be forced back to free running.
    pub force_free_running: bool,
}

/// GenLock and FrameLock are only usable while some external sync input is
/// detected. If none is and the active mode is a locked one, the mode has to
/// fall back to free running.
pub fn compute_sync_mode_sensitivity(
    composite_detected: bool,
    sdi_detected: SdiSyncDetect,
    current: SyncMode,
) -> SyncModeAdjust {
    let lock_modes_sensitive = composite_detected || sdi_detected.detected();
    SyncModeAdjust {
        lock_modes_sensitive,
        force_free_running: !lock_modes_sensitive && current != SyncMode::FreeRunning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_of(ids: &[u8]) -> ValidityMask {
        let mut bits = 0u32;
        for id in ids {
            bits |= FormatId(*id).bit();
        }
        ValidityMask::from_bits(bits)
    }

    #[test]
    fn free_running_passes_device_mask_through() {
        let device = mask_of(&[1, 9, 15]);
        let mask = compute_output_format_mask(SyncMode::FreeRunning, Some(FormatId(9)), device);
        assert_eq!(mask, device);
    }

    #[test]
    fn genlock_restricts_to_exact_input() {
        let device = mask_of(&[1, 9, 15]);
        let mask = compute_output_format_mask(SyncMode::GenLock, Some(FormatId(9)), device);
        assert_eq!(mask, mask_of(&[9]));
        assert_eq!(mask, device.intersect(ValidityMask::single(FormatId(9))));
    }

    #[test]
    fn genlock_without_input_is_empty() {
        let device = mask_of(&[1, 9, 15]);
        let mask = compute_output_format_mask(SyncMode::GenLock, None, device);
        assert!(mask.is_empty());
    }

    #[test]
    fn framelock_keeps_matching_refresh_rates_only() {
        // 59.94 Hz family: 480i (1), 720p 59.94 (9), 1035i 59.94 (11),
        // 1080i 59.94 (15).
        let device = mask_of(&[1, 9, 10, 15, 16]);
        let mask = compute_output_format_mask(SyncMode::FrameLock, Some(FormatId(9)), device);
        assert_eq!(mask, mask_of(&[1, 9, 15]));
        for format in &VIDEO_FORMATS {
            if mask.contains(format.id) {
                assert_eq!(format.rate_millihz, 59940);
            }
        }
    }

    #[test]
    fn framelock_recomputes_when_input_rate_changes() {
        let device = mask_of(&[9, 10, 15, 16]);
        let at_5994 = compute_output_format_mask(SyncMode::FrameLock, Some(FormatId(9)), device);
        assert_eq!(at_5994, mask_of(&[9, 15]));
        // Input moves from a 59.94 Hz format to a 60.00 Hz format.
        let at_6000 = compute_output_format_mask(SyncMode::FrameLock, Some(FormatId(10)), device);
        assert_eq!(at_6000, mask_of(&[10, 16]));
    }

    #[test]
    fn enforce_corrects_to_lowest_legal_id() {
        let mask = mask_of(&[9, 15]);
        assert_eq!(enforce(mask, FormatId(1)), Some(FormatId(9)));
        assert_eq!(enforce(mask, FormatId(9)), None);
    }

    #[test]
    fn enforce_leaves_current_when_mask_is_empty() {
        assert_eq!(enforce(ValidityMask::EMPTY, FormatId(9)), None);
    }

    #[test]
    fn lock_modes_follow_detected_inputs() {
        let adjust =
            compute_sync_mode_sensitivity(false, SdiSyncDetect::None, SyncMode::GenLock);
        assert!(!adjust.lock_modes_sensitive);
        assert!(adjust.force_free_running);

        let adjust =
            compute_sync_mode_sensitivity(true, SdiSyncDetect::None, SyncMode::GenLock);
        assert!(adjust.lock_modes_sensitive);
        assert!(!adjust.force_free_running);

        let adjust =
            compute_sync_mode_sensitivity(false, SdiSyncDetect::Hd, SyncMode::FreeRunning);
        assert!(adjust.lock_modes_sensitive);
        assert!(!adjust.force_free_running);

        let adjust =
            compute_sync_mode_sensitivity(false, SdiSyncDetect::None, SyncMode::FreeRunning);
        assert!(!adjust.lock_modes_sensitive);
        assert!(!adjust.force_free_running);
    }
}
