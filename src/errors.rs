//! Error Types
//!
//! The main error type [`WeldError`] covers the failure modes of the crate:
//! per-device shader module creation and versioned serialization.
//!
//! Include resolution never reports through this type; a missing fragment
//! degrades to a marker comment in the flattened source (see
//! [`crate::include`]), which is deliberately not an error.

use thiserror::Error;

/// The main error type for shaderweld.
#[derive(Error, Debug)]
pub enum WeldError {
    // ========================================================================
    // Compiled Artifact Errors
    // ========================================================================
    /// The external device capability rejected the byte-code payload.
    ///
    /// Fatal to the build step that triggered it; the slot for this device
    /// stays empty, so a later `ensure_compiled` call will attempt creation
    /// again from scratch.
    #[error("failed to create shader artifact on device {device_id}: {message} (status {status})")]
    ArtifactCreation {
        /// Device the creation was attempted on.
        device_id: u32,
        /// Underlying status code reported by the device capability.
        status: i32,
        /// Human-readable description from the device capability.
        message: String,
    },

    /// A device identifier outside `[0, MAX_DEVICE_SLOTS)` was used.
    #[error("device id {device_id} exceeds the supported slot count ({max})")]
    DeviceSlotOutOfRange {
        /// The rejected identifier.
        device_id: u32,
        /// The compile-time slot bound.
        max: u32,
    },

    /// `ensure_compiled` was called on a module with no byte code.
    #[error("shader module has no byte code to compile")]
    MissingByteCode,

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// A structured read/write stream reported a failure
    /// (missing field, type mismatch, premature end of stream).
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WeldError>;
