//! shaderweld
//!
//! Two loosely coupled pieces for shader tooling:
//!
//! - an **include resolver** that flattens `#include "name"` /
//!   `#pragma include name` directives into a single annotated source
//!   string, tolerating missing fragments ([`include`], [`loader`]);
//! - a **shader module** value carrying flattened source, byte code and
//!   shared compile hints, with a lazy at-most-once-per-device compiled
//!   artifact cache ([`module`], [`settings`]).
//!
//! Versioned field-by-field serialization for both value types lives in
//! [`io`]; concrete streams and GPU devices are external collaborators
//! behind traits.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod errors;
pub mod include;
pub mod io;
pub mod loader;
pub mod module;
pub mod settings;

pub use errors::{Result, WeldError};
pub use include::{IncludeResolver, LineEnding, flatten_source};
pub use loader::{FileFragmentLoader, FragmentLoader, ResolvingLoader};
pub use module::{
    ArtifactHandle, DeviceError, DeviceId, ExecutionDevice, MAX_DEVICE_SLOTS, ShaderModule,
};
pub use settings::{ShaderCompileSettings, SourceLanguage};
