//! # nicecss-native
//!
//! Native core of a bundler plugin that compiles co-located style
//! dictionaries. A component file declares `const styles = { name: ` CSS
//! template ` }` and references entries as `className={styles.name}`; per
//! build mode each reference becomes either an inline `style` attribute
//! (dev) or a generated `Component-name` class backed by an emitted,
//! minified `bundle.css` (build).
//!
//! ## Pipeline contract
//!
//! 1. Comments are stripped lexically before anything else looks at the
//!    text; strings and template literals are opaque to the stripper.
//! 2. The dictionary literal is isolated by balanced-brace scanning, never
//!    by a grammar; the syntax tree is reserved for usage-site rewriting.
//! 3. All edits are byte-range replacements anchored to resolved AST nodes
//!    and applied to the text in one pass; nodes are never mutated.
//! 4. Build-mode rules accumulate in a thread-safe collector that is
//!    drained exactly once per build at flush time.
//! 5. Files without a dictionary or an uppercase export are skipped, not
//!    failed; only unparsable source is fatal.
//!
//! Generated class names follow `<ComponentName>-<styleKey>` — external
//! tooling relies on that format.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod cache;
mod collector;
mod diag;
mod discovery;
mod emit;
mod fragment;
mod lint;
mod locate;
mod rewrite;
mod strip;
mod transform;


pub use cache::TransformCache;
pub use collector::{global as global_collector, StyleCollector};
pub use diag::{CompilerError, Diagnostic, Fix};
pub use discovery::{lint_project, FileDiagnostics};
pub use emit::{emit_bundle, minify_stylesheet, BUNDLE_FILE_NAME};
pub use fragment::{parse_fragment, validate_fragment, CssIssue, StyleDecl};
pub use lint::{apply_fixes, lint_source};
pub use locate::{
    extract_component_name, extract_fragments, locate_dictionary, DictionarySpan, DICT_IDENT,
};
pub use strip::strip_comments;
pub use transform::{
    transform_file, transform_source, Mode, TransformOptions, TransformOutput,
};

#[cfg(feature = "napi")]
pub use discovery::lint_project_native;
#[cfg(feature = "napi")]
pub use emit::flush_bundle_native;
#[cfg(feature = "napi")]
pub use lint::lint_source_native;
#[cfg(feature = "napi")]
pub use transform::transform_styles_native;

#[cfg(feature = "napi")]
#[napi]
pub fn compile_bridge() -> String {
    "NiceCss Native Bridge Connected".to_string()
}
