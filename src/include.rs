//! Include Resolution
//!
//! Flattens a shader source that references external fragments through
//! `#include "name"` or `#pragma include name` directives into a single
//! linear source string.
//!
//! # Behavior
//!
//! Every resolved directive line is removed and replaced, in place, by a
//! start-marker comment, the fragment's raw text, and an end-marker comment
//! so the provenance of each region stays visible in the flattened output.
//! A fragment the loader cannot supply degrades to a single
//! "failed to load" marker comment; resolution is best-effort per
//! occurrence and never fails as a whole.
//!
//! Spliced fragment text is **not** rescanned: the cursor advances past it,
//! so a nested directive inside a fragment survives verbatim unless the
//! loader flattens the fragment first. [`crate::loader::ResolvingLoader`]
//! exists for exactly that.
//!
//! ```
//! use shaderweld::{IncludeResolver, LineEnding};
//!
//! let loader = |name: &str| {
//!     (name == "common.glsl").then(|| "float pi = 3.14159;".to_string())
//! };
//! let resolver = IncludeResolver::new().with_line_ending(LineEnding::Lf);
//! let flat = resolver.resolve("#include \"common.glsl\"\nvoid main() {}\n", &loader);
//! assert!(flat.contains("float pi"));
//! ```

use crate::loader::FragmentLoader;

/// Default marker prefix inserted before a spliced fragment.
pub const START_MARKER: &str = "// Start of include code : ";
/// Default marker prefix inserted after a spliced fragment.
pub const END_MARKER: &str = "// End of include code : ";
/// Default marker prefix left behind when a fragment cannot be loaded.
pub const FAILED_MARKER: &str = "// Failed to load include code : ";

/// Line terminator used for inserted marker lines.
///
/// Chosen once per resolver; the source text itself is left with whatever
/// terminators it already uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    /// The literal terminator string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    /// Convention of the build target: `\r\n` on Windows, `\r` on macOS,
    /// `\n` elsewhere.
    #[must_use]
    pub fn host() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else if cfg!(target_os = "macos") {
            LineEnding::Cr
        } else {
            LineEnding::Lf
        }
    }
}

// ─── IncludeResolver ─────────────────────────────────────────────────────────

/// Configurable include/pragma directive resolver.
///
/// Holds the marker strings and the line-ending convention for inserted
/// marker lines. Setting a marker to the empty string suppresses that
/// marker entirely (the directive line is still consumed).
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    line_ending: LineEnding,
    start_marker: String,
    end_marker: String,
    failed_marker: String,
}

impl Default for IncludeResolver {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::host(),
            start_marker: START_MARKER.to_string(),
            end_marker: END_MARKER.to_string(),
            failed_marker: FAILED_MARKER.to_string(),
        }
    }
}

impl IncludeResolver {
    /// Resolver with default markers and the host line-ending convention.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the terminator used for inserted marker lines.
    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Override the start-of-include marker prefix. Empty disables it.
    #[must_use]
    pub fn with_start_marker(mut self, marker: impl Into<String>) -> Self {
        self.start_marker = marker.into();
        self
    }

    /// Override the end-of-include marker prefix. Empty disables it.
    #[must_use]
    pub fn with_end_marker(mut self, marker: impl Into<String>) -> Self {
        self.end_marker = marker.into();
        self
    }

    /// Override the failed-load marker prefix. Empty disables it.
    #[must_use]
    pub fn with_failed_marker(mut self, marker: impl Into<String>) -> Self {
        self.failed_marker = marker.into();
        self
    }

    /// The configured marker line terminator.
    #[must_use]
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Resolve every `#include` / `#pragma include` directive in `source`,
    /// splicing fragment text supplied by `loader`.
    ///
    /// Missing fragments degrade to a failure marker; malformed `#pragma`
    /// lines and directives with an empty filename span are left untouched.
    #[must_use]
    pub fn resolve(&self, source: &str, loader: &impl FragmentLoader) -> String {
        let mut code = source.to_string();
        let mut pos = 0usize;

        while let Some(directive_start) = next_directive(&code, pos) {
            let start_of_line = directive_start;
            let end_of_line = code[directive_start..]
                .find(['\n', '\r'])
                .map_or(code.len(), |i| directive_start + i);

            let name_start = if code[directive_start..].starts_with("#pragma") {
                // Only the `include` form of `#pragma` is ours.
                let Some(word_start) = skip_blanks(&code, directive_start + 7) else {
                    break;
                };
                if !code[word_start..].starts_with("include") {
                    pos = end_of_line;
                    continue;
                }
                match skip_blanks(&code, word_start + 7) {
                    Some(p) => p,
                    None => break,
                }
            } else {
                match skip_blanks(&code, directive_start + 8) {
                    Some(p) => p,
                    None => break,
                }
            };

            // Filename span: up to end of line, trailing blanks trimmed.
            let mut name_end = end_of_line;
            while name_end > name_start
                && matches!(code.as_bytes()[name_end - 1], b' ' | b'\t')
            {
                name_end -= 1;
            }
            if name_end == name_start {
                // Empty span: not a valid directive, leave the line in place.
                pos = name_start;
                continue;
            }

            let filename = strip_quotes(&code[name_start..name_end]).to_string();

            code.replace_range(start_of_line..end_of_line, "");
            pos = start_of_line;

            let eol = self.line_ending.as_str();
            let mut splice = String::new();
            match loader.load(&filename) {
                Some(fragment) => {
                    log::trace!("splicing include fragment '{filename}'");
                    if !self.start_marker.is_empty() {
                        splice.push_str(&self.start_marker);
                        splice.push_str(&filename);
                        splice.push_str(eol);
                    }
                    splice.push_str(&fragment);
                    if !self.end_marker.is_empty() {
                        splice.push_str(&self.end_marker);
                        splice.push_str(&filename);
                        splice.push_str(eol);
                    }
                }
                None => {
                    log::warn!("failed to load include fragment '{filename}'");
                    if !self.failed_marker.is_empty() {
                        splice.push_str(&self.failed_marker);
                        splice.push_str(&filename);
                        splice.push_str(eol);
                    }
                }
            }
            code.insert_str(pos, &splice);
            pos += splice.len();
        }

        code
    }
}

/// Resolve includes with a default [`IncludeResolver`].
#[must_use]
pub fn flatten_source(source: &str, loader: &impl FragmentLoader) -> String {
    IncludeResolver::new().resolve(source, loader)
}

/// Position of the next `#pragma` or `#include` token at or after `from`;
/// when both occur, the earlier one wins.
fn next_directive(code: &str, from: usize) -> Option<usize> {
    if from >= code.len() {
        return None;
    }
    let rest = &code[from..];
    let pragma = rest.find("#pragma");
    let include = rest.find("#include");
    let offset = match (pragma, include) {
        (Some(p), Some(i)) => p.min(i),
        (Some(p), None) => p,
        (None, Some(i)) => i,
        (None, None) => return None,
    };
    Some(from + offset)
}

/// First position at or after `from` that is not a space or tab.
/// `None` means the rest of the buffer is blank.
fn skip_blanks(code: &str, from: usize) -> Option<usize> {
    if from >= code.len() {
        return None;
    }
    code.as_bytes()[from..]
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .map(|i| from + i)
}

/// Quote handling for a trimmed filename span.
///
/// A span starting with `"` loses its first and last characters, even when
/// the final character is not a closing quote. `"name.glsl"` therefore
/// yields `name.glsl`, while the malformed `"name.glsl` yields `name.gls`.
/// The truncation on unterminated quotes is long-standing observable
/// behavior and is kept as is.
fn strip_quotes(span: &str) -> &str {
    if let Some(inner) = span.strip_prefix('"') {
        match inner.char_indices().next_back() {
            Some((idx, _)) => &inner[..idx],
            None => "",
        }
    } else {
        span
    }
}
