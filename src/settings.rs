//! Shader Compile Settings
//!
//! Hints handed to an external textual shader compiler: API versions,
//! source language, language version, SPIR-V target and preprocessor
//! defines. A settings value is immutable once attached to a
//! [`crate::ShaderModule`] and may be shared between modules through an
//! `Arc`. Equality is field-wise.

/// Source language of a textual shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum SourceLanguage {
    /// OpenGL Shading Language.
    #[default]
    Glsl = 0,
    /// High Level Shading Language.
    Hlsl = 1,
}

impl SourceLanguage {
    /// Integer tag used by the versioned serialization streams.
    #[must_use]
    pub fn to_i32(self) -> i32 {
        self as i32
    }

    /// Inverse of [`SourceLanguage::to_i32`]; unknown tags map to `None`.
    #[must_use]
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(SourceLanguage::Glsl),
            1 => Some(SourceLanguage::Hlsl),
            _ => None,
        }
    }
}

/// Packed Vulkan 1.0 API version (`VK_API_VERSION_1_0`).
pub const VULKAN_1_0: u32 = 1 << 22;

/// SPIR-V 1.0 target word.
pub const SPIRV_1_0: u32 = 0x0001_0000;

/// Compilation hints for producing byte code from textual shader source.
///
/// Meaningful only when a module is compiled from its `source`; modules
/// constructed directly from byte code ignore these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderCompileSettings {
    /// Packed Vulkan API version the byte code targets.
    pub vulkan_version: u32,
    /// Client input semantics version (GLSL Vulkan dialect = 100).
    pub client_input_version: u32,
    /// Source language of the textual shader.
    pub language: SourceLanguage,
    /// Language version assumed when the source declares none
    /// (GLSL `#version`).
    pub default_version: u32,
    /// SPIR-V target word, e.g. [`SPIRV_1_0`].
    pub target: u32,
    /// Request forward-compatible compilation.
    pub forward_compatible: bool,
    /// Ordered preprocessor define strings, passed through verbatim.
    pub defines: Vec<String>,
}

impl Default for ShaderCompileSettings {
    fn default() -> Self {
        Self {
            vulkan_version: VULKAN_1_0,
            client_input_version: 100,
            language: SourceLanguage::Glsl,
            default_version: 450,
            target: SPIRV_1_0,
            forward_compatible: false,
            defines: Vec::new(),
        }
    }
}

impl ShaderCompileSettings {
    /// Settings with the default GLSL-for-Vulkan profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a preprocessor define (order is preserved).
    #[must_use]
    pub fn with_define(mut self, define: impl Into<String>) -> Self {
        self.defines.push(define.into());
        self
    }
}
