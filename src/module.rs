//! Shader Module
//!
//! [`ShaderModule`] is the unit of compilation: a flattened textual source,
//! optional pre-compiled byte code, optional shared compile hints, and a
//! lazily filled table of per-device compiled artifacts.
//!
//! # Per-device artifact cache
//!
//! Each execution target ("device") gets at most one compiled artifact per
//! module, created on the first [`ShaderModule::ensure_compiled`] call for
//! its identifier and reused afterwards. The check-then-create sequence
//! runs under the module's lock, so concurrent callers racing on the same
//! identifier still produce exactly one artifact. A failed creation leaves
//! the slot empty and surfaces as [`WeldError::ArtifactCreation`]; a later
//! call retries from scratch.
//!
//! Dropping the module releases every present artifact through the device
//! that created it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_128;

use crate::errors::{Result, WeldError};
use crate::settings::ShaderCompileSettings;

/// Identifier of one concurrently usable execution target.
pub type DeviceId = u32;

/// Upper bound on valid device identifiers per process.
pub const MAX_DEVICE_SLOTS: u32 = 8;

// ─── ExecutionDevice ─────────────────────────────────────────────────────────

/// Opaque handle to a compiled artifact, owned by the slot that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(pub u64);

/// Failure reported by an [`ExecutionDevice`] when byte code is rejected.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct DeviceError {
    /// Backend status code (e.g. a `VkResult` value).
    pub status: i32,
    /// Backend description of the failure.
    pub message: String,
}

/// External capability that turns byte code into a device-resident
/// compiled artifact and releases it again.
///
/// Implementations wrap a concrete GPU API device; the crate itself never
/// talks to one.
pub trait ExecutionDevice: Send + Sync {
    /// Create a compiled artifact from `code` under this device's
    /// allocation policy.
    fn create_artifact(&self, code: &[u32]) -> std::result::Result<ArtifactHandle, DeviceError>;

    /// Release an artifact previously returned by
    /// [`ExecutionDevice::create_artifact`].
    fn destroy_artifact(&self, handle: ArtifactHandle);
}

/// A compiled artifact together with the device that owns its teardown.
struct CompiledShader {
    device: Arc<dyn ExecutionDevice>,
    handle: ArtifactHandle,
}

impl Drop for CompiledShader {
    fn drop(&mut self) {
        self.device.destroy_artifact(self.handle);
    }
}

// ─── ShaderModule ────────────────────────────────────────────────────────────

/// A shader in compilable form.
///
/// At least one of `source` / `code` must be populated for the module to be
/// compilable; `hints` only applies when compiling from `source`.
pub struct ShaderModule {
    /// Flattened textual source (already include-resolved).
    pub source: Option<String>,
    /// Compiled byte code as 32-bit words.
    pub code: Option<Vec<u32>>,
    /// Compile hints, shared between modules.
    pub hints: Option<Arc<ShaderCompileSettings>>,
    artifacts: Mutex<FxHashMap<DeviceId, CompiledShader>>,
}

impl Default for ShaderModule {
    fn default() -> Self {
        Self {
            source: None,
            code: None,
            hints: None,
            artifacts: Mutex::new(FxHashMap::default()),
        }
    }
}

impl ShaderModule {
    /// Empty module; populate `source` or `code` before compiling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Module compiled later from textual source, with optional hints.
    #[must_use]
    pub fn from_source(
        source: impl Into<String>,
        hints: Option<Arc<ShaderCompileSettings>>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            hints,
            ..Self::default()
        }
    }

    /// Module around pre-compiled byte code.
    #[must_use]
    pub fn from_code(code: Vec<u32>) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    /// Module carrying both the textual source and its byte code.
    #[must_use]
    pub fn from_source_and_code(source: impl Into<String>, code: Vec<u32>) -> Self {
        Self {
            source: Some(source.into()),
            code: Some(code),
            ..Self::default()
        }
    }

    /// Attach shared compile hints.
    #[must_use]
    pub fn with_hints(mut self, hints: Arc<ShaderCompileSettings>) -> Self {
        self.hints = Some(hints);
        self
    }

    /// Whether the module carries anything a compiler could consume.
    #[must_use]
    pub fn is_compilable(&self) -> bool {
        self.source.is_some() || self.code.is_some()
    }

    /// xxh3-128 of the textual source, usable as a module cache key.
    #[must_use]
    pub fn source_hash(&self) -> Option<u128> {
        self.source.as_deref().map(|s| xxh3_128(s.as_bytes()))
    }

    /// Ensure a compiled artifact exists for `device_id`, creating it from
    /// the module's byte code on first use. Idempotent: a present slot makes
    /// this a no-op.
    ///
    /// # Errors
    ///
    /// [`WeldError::DeviceSlotOutOfRange`] for identifiers at or above
    /// [`MAX_DEVICE_SLOTS`], [`WeldError::MissingByteCode`] when the module
    /// has no `code`, and [`WeldError::ArtifactCreation`] when the device
    /// rejects the payload. Creation failure leaves the slot empty; it is
    /// never retried internally.
    pub fn ensure_compiled(
        &self,
        device_id: DeviceId,
        device: &Arc<dyn ExecutionDevice>,
    ) -> Result<()> {
        if device_id >= MAX_DEVICE_SLOTS {
            return Err(WeldError::DeviceSlotOutOfRange {
                device_id,
                max: MAX_DEVICE_SLOTS,
            });
        }

        let mut slots = self.artifacts.lock();
        if slots.contains_key(&device_id) {
            return Ok(());
        }

        let code = self.code.as_deref().ok_or(WeldError::MissingByteCode)?;
        let handle = device
            .create_artifact(code)
            .map_err(|e| WeldError::ArtifactCreation {
                device_id,
                status: e.status,
                message: e.message,
            })?;

        log::debug!(
            "created shader artifact {handle:?} for device {device_id} ({} words)",
            code.len()
        );
        slots.insert(
            device_id,
            CompiledShader {
                device: Arc::clone(device),
                handle,
            },
        );
        Ok(())
    }

    /// Whether an artifact is present for `device_id`.
    #[must_use]
    pub fn is_compiled(&self, device_id: DeviceId) -> bool {
        self.artifacts.lock().contains_key(&device_id)
    }

    /// Number of device slots holding a compiled artifact.
    #[must_use]
    pub fn compiled_count(&self) -> usize {
        self.artifacts.lock().len()
    }
}

impl fmt::Debug for ShaderModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderModule")
            .field("source", &self.source.as_deref().map(str::len))
            .field("code", &self.code.as_deref().map(<[u32]>::len))
            .field("hints", &self.hints)
            .field("compiled_slots", &self.compiled_count())
            .finish()
    }
}

/// Value-object equality over `source`, `code` and `hints`; the per-device
/// artifact table is a cache and does not participate.
impl PartialEq for ShaderModule {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.code == other.code && self.hints == other.hints
    }
}
