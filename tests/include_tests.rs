//! Include Resolver Tests
//!
//! Tests for:
//! - directive-free sources pass through unchanged
//! - `#include` / `#pragma include` splicing with provenance markers
//! - missing fragments degrading to a failure marker
//! - malformed pragmas, empty filename spans, quote handling quirks
//! - nested include behavior with and without a resolving loader
//! - line-ending and marker configuration
//! - `FileFragmentLoader` search-path ordering

use std::cell::RefCell;
use std::io::Write;

use shaderweld::{
    FileFragmentLoader, FragmentLoader, IncludeResolver, LineEnding, ResolvingLoader,
    flatten_source,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Resolver with a fixed Lf convention so expectations are portable.
fn resolver() -> IncludeResolver {
    IncludeResolver::new().with_line_ending(LineEnding::Lf)
}

fn single_fragment(name: &'static str, body: &'static str) -> impl Fn(&str) -> Option<String> {
    move |requested: &str| (requested == name).then(|| body.to_string())
}

fn no_fragments(_: &str) -> Option<String> {
    None
}

// ============================================================================
// Pass-through
// ============================================================================

#[test]
fn source_without_directives_is_unchanged() {
    init_logs();
    let src = "#version 450\nvoid main() {\n    gl_Position = vec4(0.0);\n}\n";
    assert_eq!(resolver().resolve(src, &no_fragments), src);
}

#[test]
fn empty_source_is_unchanged() {
    assert_eq!(resolver().resolve("", &no_fragments), "");
}

#[test]
fn pragma_without_include_is_preserved_byte_for_byte() {
    let src = "#pragma once\n#pragma optimize(off)\nvoid main() {}\n";
    assert_eq!(resolver().resolve(src, &no_fragments), src);
}

// ============================================================================
// Splicing
// ============================================================================

#[test]
fn include_directive_is_replaced_by_markers_and_fragment() {
    init_logs();
    let loader = single_fragment("a.glsl", "float a = 1.0;\n");
    let out = resolver().resolve("#include \"a.glsl\"\nvoid main() {}\n", &loader);

    let start = out.find("// Start of include code : a.glsl\n").unwrap();
    let body = out.find("float a = 1.0;\n").unwrap();
    let end = out.find("// End of include code : a.glsl\n").unwrap();
    assert!(start < body && body < end, "marker ordering broken:\n{out}");
    assert!(!out.contains("#include"), "directive line survived:\n{out}");
    assert!(out.contains("void main() {}"));
}

#[test]
fn pragma_include_unquoted_resolves_same_as_include() {
    let loader = single_fragment("lighting.glsl", "vec3 l;\n");
    let out = resolver().resolve("#pragma include lighting.glsl\n", &loader);
    assert!(out.contains("// Start of include code : lighting.glsl\n"));
    assert!(out.contains("vec3 l;\n"));
    assert!(out.contains("// End of include code : lighting.glsl\n"));
}

#[test]
fn missing_fragment_leaves_exactly_one_failure_marker() {
    let out = resolver().resolve("#pragma include b.glsl\n", &no_fragments);
    assert_eq!(
        out.matches("// Failed to load include code : b.glsl\n").count(),
        1,
        "unexpected output:\n{out}"
    );
    assert!(!out.contains("// Start of include code"));
    assert!(!out.contains("// End of include code"));
    assert!(!out.contains("#pragma include"));
}

#[test]
fn each_occurrence_is_resolved_independently() {
    // No deduplication: including the same fragment twice splices it twice.
    let loader = single_fragment("tw.glsl", "int t;\n");
    let src = "#include \"tw.glsl\"\nvoid f() {}\n#include \"tw.glsl\"\n";
    let out = resolver().resolve(src, &loader);
    assert_eq!(out.matches("int t;\n").count(), 2);
    assert_eq!(out.matches("// Start of include code : tw.glsl\n").count(), 2);
}

#[test]
fn include_before_malformed_pragma_is_still_resolved() {
    // The earlier directive wins even when a #pragma appears later in the
    // buffer; the non-include pragma line itself is untouched.
    let loader = single_fragment("a.glsl", "int a;\n");
    let src = "#include \"a.glsl\"\n#pragma warning(disable)\n";
    let out = resolver().resolve(src, &loader);
    assert!(out.contains("int a;\n"));
    assert!(out.contains("#pragma warning(disable)\n"));
}

#[test]
fn directive_as_last_line_without_terminator_is_resolved() {
    let loader = single_fragment("tail.glsl", "int z;\n");
    let out = resolver().resolve("void main() {}\n#include \"tail.glsl\"", &loader);
    assert!(out.contains("int z;\n"));
    assert!(!out.contains("#include"));
}

#[test]
fn surrounding_lines_keep_their_positions() {
    let loader = single_fragment("mid.glsl", "int mid;\n");
    let out = resolver().resolve("// before\n#include \"mid.glsl\"\n// after\n", &loader);
    let before = out.find("// before\n").unwrap();
    let mid = out.find("int mid;\n").unwrap();
    let after = out.find("// after\n").unwrap();
    assert!(before < mid && mid < after);
}

// ============================================================================
// Filename parsing
// ============================================================================

#[test]
fn quoted_and_unquoted_filenames_use_the_same_loader_key() {
    let requested = RefCell::new(Vec::new());
    let loader = |name: &str| -> Option<String> {
        requested.borrow_mut().push(name.to_string());
        Some(String::from("int q;\n"))
    };
    resolver().resolve("#include \"c.glsl\"\n#include c.glsl\n", &loader);
    assert_eq!(*requested.borrow(), vec!["c.glsl", "c.glsl"]);
}

#[test]
fn unterminated_quote_truncates_the_last_filename_character() {
    // `"d.glsl` (no closing quote) asks the loader for `d.gls`: the span
    // loses its first and last characters whether or not the last one is a
    // quote. Long-standing behavior, kept deliberately.
    let requested = RefCell::new(Vec::new());
    let loader = |name: &str| -> Option<String> {
        requested.borrow_mut().push(name.to_string());
        None
    };
    let out = resolver().resolve("#include \"d.glsl\n", &loader);
    assert_eq!(*requested.borrow(), vec!["d.gls"]);
    assert!(out.contains("// Failed to load include code : d.gls\n"));
}

#[test]
fn filename_trailing_blanks_are_trimmed() {
    let requested = RefCell::new(Vec::new());
    let loader = |name: &str| -> Option<String> {
        requested.borrow_mut().push(name.to_string());
        None
    };
    resolver().resolve("#pragma include  spaced.glsl  \t \n", &loader);
    assert_eq!(*requested.borrow(), vec!["spaced.glsl"]);
}

#[test]
fn tabs_between_tokens_are_accepted() {
    let loader = single_fragment("t.glsl", "int t;\n");
    let out = resolver().resolve("#pragma\t\tinclude\tt.glsl\n", &loader);
    assert!(out.contains("int t;\n"));
}

#[test]
fn directive_with_empty_filename_is_left_in_place() {
    let src = "#include\nvoid main() {}\n";
    let out = resolver().resolve(src, &no_fragments);
    assert_eq!(out, src);
}

#[test]
fn directive_with_only_blanks_before_newline_is_left_in_place() {
    let src = "#pragma include   \nvoid main() {}\n";
    let out = resolver().resolve(src, &no_fragments);
    assert_eq!(out, src);
}

#[test]
fn directive_with_only_blanks_at_end_of_input_is_left_in_place() {
    let src = "void main() {}\n#include   ";
    assert_eq!(resolver().resolve(src, &no_fragments), src);
}

// ============================================================================
// Nested includes
// ============================================================================

#[test]
fn spliced_fragment_text_is_not_rescanned() {
    // A plain loader splices verbatim: the fragment's own directive
    // survives in the output.
    let loader = |name: &str| -> Option<String> {
        match name {
            "outer.glsl" => Some("#include \"inner.glsl\"\nint outer;\n".to_string()),
            "inner.glsl" => Some("int inner;\n".to_string()),
            _ => None,
        }
    };
    let out = resolver().resolve("#include \"outer.glsl\"\n", &loader);
    assert!(out.contains("#include \"inner.glsl\"\n"));
    assert!(!out.contains("int inner;\n"));
}

#[test]
fn resolving_loader_flattens_nested_includes() {
    let base = |name: &str| -> Option<String> {
        match name {
            "outer.glsl" => Some("#include \"inner.glsl\"\nint outer;\n".to_string()),
            "inner.glsl" => Some("int inner;\n".to_string()),
            _ => None,
        }
    };
    let loader = ResolvingLoader::new(base, resolver());
    let out = resolver().resolve("#include \"outer.glsl\"\n", &loader);
    assert!(out.contains("int inner;\n"));
    assert!(out.contains("int outer;\n"));
    assert!(!out.contains("#include"));
    // Inner provenance markers come from the nested resolution pass.
    assert!(out.contains("// Start of include code : inner.glsl\n"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn crlf_line_ending_is_used_for_marker_lines_only() {
    let loader = single_fragment("w.glsl", "int w;\n");
    let out = IncludeResolver::new()
        .with_line_ending(LineEnding::CrLf)
        .resolve("#include \"w.glsl\"\nint rest;\n", &loader);
    assert!(out.contains("// Start of include code : w.glsl\r\n"));
    assert!(out.contains("// End of include code : w.glsl\r\n"));
    // The untouched remainder keeps its original terminator.
    assert!(out.contains("int rest;\n"));
}

#[test]
fn cr_line_ending_terminates_failure_markers() {
    let out = IncludeResolver::new()
        .with_line_ending(LineEnding::Cr)
        .resolve("#include \"gone.glsl\"\n", &no_fragments);
    assert!(out.contains("// Failed to load include code : gone.glsl\r"));
}

#[test]
fn empty_markers_splice_the_bare_fragment() {
    let loader = single_fragment("bare.glsl", "int bare;\n");
    let out = resolver()
        .with_start_marker("")
        .with_end_marker("")
        .resolve("#include \"bare.glsl\"\n", &loader);
    assert!(out.contains("int bare;\n"));
    assert!(!out.contains("// Start of include code"));
    assert!(!out.contains("// End of include code"));
}

#[test]
fn flatten_source_uses_default_markers() {
    let loader = single_fragment("f.glsl", "int f;\n");
    let out = flatten_source("#include \"f.glsl\"\n", &loader);
    assert!(out.contains("int f;\n"));
    assert!(out.contains("// Start of include code : f.glsl"));
}

// ============================================================================
// FileFragmentLoader
// ============================================================================

#[test]
fn file_loader_misses_when_no_search_path_has_the_file() {
    let loader = FileFragmentLoader::new();
    assert_eq!(loader.load("nowhere.glsl"), None);
}

#[test]
fn file_loader_reads_from_first_matching_search_path() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let mut f = std::fs::File::create(first.path().join("dup.glsl")).unwrap();
    f.write_all(b"int first;\n").unwrap();
    let mut s = std::fs::File::create(second.path().join("dup.glsl")).unwrap();
    s.write_all(b"int second;\n").unwrap();
    let mut only = std::fs::File::create(second.path().join("only.glsl")).unwrap();
    only.write_all(b"int only;\n").unwrap();

    let loader = FileFragmentLoader::new()
        .with_search_path(first.path())
        .with_search_path(second.path());

    assert_eq!(loader.load("dup.glsl").as_deref(), Some("int first;\n"));
    assert_eq!(loader.load("only.glsl").as_deref(), Some("int only;\n"));
    assert_eq!(loader.load("missing.glsl"), None);
}

#[test]
fn file_loader_drives_the_resolver_end_to_end() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("common.glsl"), "const float PI = 3.14159;\n").unwrap();

    let loader = FileFragmentLoader::new().with_search_path(dir.path());
    let out = resolver().resolve("#pragma include common.glsl\nvoid main() {}\n", &loader);
    assert!(out.contains("const float PI = 3.14159;\n"));
    assert!(out.contains("// Start of include code : common.glsl\n"));
}
