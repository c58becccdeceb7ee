//! Versioned Structured Serialization
//!
//! [`ShaderCompileSettings`] and [`ShaderModule`] read and write themselves
//! field by field against abstract [`InputStream`] / [`OutputStream`]
//! collaborators. The concrete encoding (text, binary, archive entries) is
//! the stream's business; this module fixes only the field names, the field
//! order, and the schema-version gates:
//!
//! - `hints` (optional nested settings object) participates at schema
//!   version ≥ 0.1.3,
//! - `defines` (ordered string sequence) at schema version ≥ 0.1.4.
//!
//! Read and write are symmetric: for any stream version, the fields written
//! are exactly the fields read back. Breaking that symmetry breaks every
//! archive written under the older gate.

use std::sync::Arc;

use crate::errors::{Result, WeldError};
use crate::module::ShaderModule;
use crate::settings::{ShaderCompileSettings, SourceLanguage};

// ─── Stream traits ───────────────────────────────────────────────────────────

/// Structured field reader with schema-version queries.
///
/// Nested optional objects follow a begin/end protocol:
/// [`InputStream::begin_object`] reports whether the object is present, and
/// [`InputStream::end_object`] is called only after reading a present
/// object's fields.
pub trait InputStream {
    /// Read a named `u32` scalar.
    fn read_u32(&mut self, name: &str) -> Result<u32>;
    /// Read a named `i32` scalar (enum tags travel as `i32`).
    fn read_i32(&mut self, name: &str) -> Result<i32>;
    /// Read a named `bool` scalar.
    fn read_bool(&mut self, name: &str) -> Result<bool>;
    /// Read a named string.
    fn read_string(&mut self, name: &str) -> Result<String>;
    /// Read a named ordered string sequence.
    fn read_string_seq(&mut self, name: &str) -> Result<Vec<String>>;
    /// Read a named raw array of exactly `len` 32-bit words.
    fn read_words(&mut self, name: &str, len: usize) -> Result<Vec<u32>>;
    /// Enter a named optional nested object; `false` means absent.
    fn begin_object(&mut self, name: &str) -> Result<bool>;
    /// Leave the nested object entered by the matching `begin_object`.
    fn end_object(&mut self) -> Result<()>;
    /// Whether the stream's schema version is at least `major.minor.patch`.
    fn version_greater_equal(&self, major: u32, minor: u32, patch: u32) -> bool;
}

/// Structured field writer, mirror of [`InputStream`].
pub trait OutputStream {
    /// Write a named `u32` scalar.
    fn write_u32(&mut self, name: &str, value: u32) -> Result<()>;
    /// Write a named `i32` scalar.
    fn write_i32(&mut self, name: &str, value: i32) -> Result<()>;
    /// Write a named `bool` scalar.
    fn write_bool(&mut self, name: &str, value: bool) -> Result<()>;
    /// Write a named string.
    fn write_string(&mut self, name: &str, value: &str) -> Result<()>;
    /// Write a named ordered string sequence.
    fn write_string_seq(&mut self, name: &str, values: &[String]) -> Result<()>;
    /// Write a named raw array of 32-bit words.
    fn write_words(&mut self, name: &str, words: &[u32]) -> Result<()>;
    /// Open a named optional nested object, recording its presence.
    fn begin_object(&mut self, name: &str, present: bool) -> Result<()>;
    /// Close a present nested object.
    fn end_object(&mut self) -> Result<()>;
    /// Whether the stream's schema version is at least `major.minor.patch`.
    fn version_greater_equal(&self, major: u32, minor: u32, patch: u32) -> bool;
}

/// Types that deserialize from an [`InputStream`].
pub trait ReadShader: Sized {
    /// Read `Self` field by field.
    fn read(input: &mut dyn InputStream) -> Result<Self>;
}

/// Types that serialize to an [`OutputStream`].
pub trait WriteShader {
    /// Write `self` field by field.
    fn write(&self, output: &mut dyn OutputStream) -> Result<()>;
}

// ─── ShaderCompileSettings ───────────────────────────────────────────────────

impl ReadShader for ShaderCompileSettings {
    fn read(input: &mut dyn InputStream) -> Result<Self> {
        let vulkan_version = input.read_u32("vulkan_version")?;
        let client_input_version = input.read_u32("client_input_version")?;
        let language_tag = input.read_i32("language")?;
        let language = SourceLanguage::from_i32(language_tag).ok_or_else(|| {
            WeldError::Serialization(format!("unknown source language tag {language_tag}"))
        })?;
        let default_version = input.read_u32("default_version")?;
        let target = input.read_u32("target")?;
        let forward_compatible = input.read_bool("forward_compatible")?;

        let defines = if input.version_greater_equal(0, 1, 4) {
            input.read_string_seq("defines")?
        } else {
            Vec::new()
        };

        Ok(Self {
            vulkan_version,
            client_input_version,
            language,
            default_version,
            target,
            forward_compatible,
            defines,
        })
    }
}

impl WriteShader for ShaderCompileSettings {
    fn write(&self, output: &mut dyn OutputStream) -> Result<()> {
        output.write_u32("vulkan_version", self.vulkan_version)?;
        output.write_u32("client_input_version", self.client_input_version)?;
        output.write_i32("language", self.language.to_i32())?;
        output.write_u32("default_version", self.default_version)?;
        output.write_u32("target", self.target)?;
        output.write_bool("forward_compatible", self.forward_compatible)?;

        if output.version_greater_equal(0, 1, 4) {
            output.write_string_seq("defines", &self.defines)?;
        }
        Ok(())
    }
}

// ─── ShaderModule ────────────────────────────────────────────────────────────

impl ReadShader for ShaderModule {
    fn read(input: &mut dyn InputStream) -> Result<Self> {
        let source = input.read_string("source")?;

        let hints = if input.version_greater_equal(0, 1, 3) && input.begin_object("hints")? {
            let settings = ShaderCompileSettings::read(input)?;
            input.end_object()?;
            Some(Arc::new(settings))
        } else {
            None
        };

        let code_len = input.read_u32("code_size")? as usize;
        let code = input.read_words("code", code_len)?;

        let mut module = ShaderModule::new();
        // Empty source / code travel as absent.
        module.source = (!source.is_empty()).then_some(source);
        module.code = (!code.is_empty()).then_some(code);
        module.hints = hints;
        Ok(module)
    }
}

impl WriteShader for ShaderModule {
    fn write(&self, output: &mut dyn OutputStream) -> Result<()> {
        output.write_string("source", self.source.as_deref().unwrap_or(""))?;

        if output.version_greater_equal(0, 1, 3) {
            output.begin_object("hints", self.hints.is_some())?;
            if let Some(hints) = &self.hints {
                hints.write(output)?;
                output.end_object()?;
            }
        }

        let code = self.code.as_deref().unwrap_or(&[]);
        output.write_u32("code_size", code.len() as u32)?;
        output.write_words("code", code)?;
        Ok(())
    }
}
