//! Subsystem-level errors.
//!
//! Nothing here propagates beyond the GVO subsystem: a construction error
//! means the embedder hides the panel, and the rest of the application
//! carries on.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can abort construction of the GVO subsystem.
#[derive(Error, Debug)]
pub enum GvoError {
    /// The device does not expose the graphics-to-video-out capability.
    /// The panel should not be shown at all.
    #[error("device does not support graphics-to-video output")]
    Unsupported,

    /// The static format catalog failed its startup checks.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result type for GVO subsystem construction.
pub type GvoResult<T> = Result<T, GvoError>;
