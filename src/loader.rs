//! Fragment Loaders
//!
//! The include resolver never touches the filesystem itself; it asks a
//! [`FragmentLoader`] for the raw text of a named fragment and splices
//! whatever comes back. A loader miss is `None`, never an error; the
//! resolver turns it into a visible marker comment in the output.
//!
//! Three implementations cover the common cases:
//!
//! - any `Fn(&str) -> Option<String>` closure (handy in tests and for
//!   in-memory fragment tables),
//! - [`FileFragmentLoader`] for ordered search-path lookup on disk,
//! - [`ResolvingLoader`] which recursively flattens a fragment's own
//!   includes before handing it to the outer resolver.

use std::path::PathBuf;

use crate::include::IncludeResolver;

/// External capability that maps a fragment filename to its raw text.
///
/// Resolution context (working directory, search paths, embedded assets) is
/// the implementation's business. A failed lookup returns `None` and must
/// not panic or raise.
pub trait FragmentLoader {
    /// Return the raw text of `name`, or `None` when it cannot be loaded.
    fn load(&self, name: &str) -> Option<String>;
}

impl<F> FragmentLoader for F
where
    F: Fn(&str) -> Option<String>,
{
    fn load(&self, name: &str) -> Option<String> {
        self(name)
    }
}

// ─── FileFragmentLoader ──────────────────────────────────────────────────────

/// Loads fragments from an ordered list of search directories.
///
/// The first directory containing a readable UTF-8 file with the requested
/// name wins. Any I/O or encoding failure is treated as a miss for that
/// directory and the search continues.
#[derive(Debug, Clone, Default)]
pub struct FileFragmentLoader {
    search_paths: Vec<PathBuf>,
}

impl FileFragmentLoader {
    /// Create a loader with no search paths (every lookup misses).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a search directory. Directories are consulted in insertion
    /// order.
    #[must_use]
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// All configured search directories, in lookup order.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl FragmentLoader for FileFragmentLoader {
    fn load(&self, name: &str) -> Option<String> {
        for dir in &self.search_paths {
            let path = dir.join(name);
            if let Ok(text) = std::fs::read_to_string(&path) {
                log::trace!("loaded shader fragment {}", path.display());
                return Some(text);
            }
        }
        None
    }
}

// ─── ResolvingLoader ─────────────────────────────────────────────────────────

/// Wraps a loader so that each fragment is itself include-resolved before it
/// is returned.
///
/// The resolver splices fragment text verbatim and never rescans it, so
/// nested `#include` directives inside a fragment survive unless the loader
/// flattens them first. This wrapper is that flattening step: it runs the
/// configured [`IncludeResolver`] over every loaded fragment, recursing
/// through itself for the fragment's own includes.
///
/// There is no cycle detection. A fragment that (transitively) includes
/// itself will recurse until the stack runs out; keeping the include graph
/// acyclic is the caller's responsibility.
pub struct ResolvingLoader<L> {
    inner: L,
    resolver: IncludeResolver,
}

impl<L: FragmentLoader> ResolvingLoader<L> {
    /// Wrap `inner`, resolving nested includes with `resolver`.
    #[must_use]
    pub fn new(inner: L, resolver: IncludeResolver) -> Self {
        Self { inner, resolver }
    }

    /// The wrapped loader.
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: FragmentLoader> FragmentLoader for ResolvingLoader<L> {
    fn load(&self, name: &str) -> Option<String> {
        let raw = self.inner.load(name)?;
        Some(self.resolver.resolve(&raw, self))
    }
}
