//! Device attribute channel contract.
//!
//! The channel is the external collaborator that talks to the actual device.
//! Reads and writes are synchronous and may block briefly; a write is only an
//! acknowledgement that the request was sent, never a confirmation of effect.
//! Callers that care whether a write stuck must read the attribute back
//! (another client may hold a lock and silently override the value).

use thiserror::Error;

/// Device attributes tracked by this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Whether the device exposes the GVO capability at all.
    Supported,
    /// Firmware revision, reported as an integer minor version.
    FirmwareVersion,
    /// Output timing mode (free running / GenLock / FrameLock).
    SyncMode,
    /// Which external reference supplies timing (SDI or composite).
    SyncSource,
    /// Composite-sync input detection mode (auto / bi-level / tri-level).
    CompositeDetectMode,
    /// Active output video format.
    OutputVideoFormat,
    /// Active output data (pixel) format.
    OutputDataFormat,
    /// Detected incoming video format (read-only).
    InputVideoFormat,
    /// Horizontal sync delay in pixels.
    SyncDelayPixels,
    /// Vertical sync delay in lines.
    SyncDelayLines,
    /// Horizontal pan offset of the scanned-out region.
    PanX,
    /// Vertical pan offset of the scanned-out region.
    PanY,
    /// Whether the screen is currently scanned out to the video output.
    OutputEnabled,
    /// Whether an external render client holds the output lock (read-only).
    ExternalLocked,
    /// One-shot input signal reacquisition (write 1 to start, 0 to stop).
    Reacquire,
    /// Whether a composite-sync input signal is detected (read-only).
    CompositeSyncDetected,
    /// Whether an SDI-sync input signal is detected, and its class (read-only).
    SdiSyncDetected,
}

/// The set of values currently legal for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidValues {
    /// A contiguous integer range, inclusive.
    Range { min: i64, max: i64 },
    /// Bit `i` set means enumerated value `i` is currently legal.
    Bitmask(u32),
}

/// Errors reported by the attribute channel.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The attribute is not supported by this device. Callers substitute a
    /// documented default instead of failing.
    #[error("attribute {0:?} is unavailable on this device")]
    Unavailable(Attribute),
}

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Synchronous get/set access to integer device attributes, plus valid-set
/// queries and change-notification subscription.
///
/// Notifications for subscribed attributes are delivered by the embedder to
/// [`GvoPanel::handle_event`](crate::panel::GvoPanel::handle_event) one at a
/// time, in device emission order; there is no batching guarantee.
pub trait AttributeChannel {
    /// Read the current value of an attribute.
    fn get_integer(&self, attribute: Attribute) -> ChannelResult<i64>;

    /// Request a new value for an attribute.
    ///
    /// This is fire-and-forget: acceptance of the request does not mean the
    /// value took effect. Re-read to verify.
    fn set_integer(&mut self, attribute: Attribute, value: i64);

    /// Query the set of values currently legal for an attribute.
    fn get_valid_values(&self, attribute: Attribute) -> ChannelResult<ValidValues>;

    /// Register interest in device-originated changes of an attribute.
    fn subscribe(&mut self, attribute: Attribute);
}
