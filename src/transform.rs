//! Per-file transformation driver.
//!
//! Orchestrates the pipeline: strip comments → component name → locate
//! dictionary → extract fragments → parse → rewrite usage sites → apply
//! edits. Returns `Ok(None)` for files the transform does not apply to;
//! those are the common case, not errors.

use std::fs;
use std::path::Path;

#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::{Deserialize, Serialize};

use crate::cache::TransformCache;
use crate::collector::StyleCollector;
use crate::diag::{CompilerError, Diagnostic, ERR_IO, ERR_PARSE};
use crate::locate::{
    dictionary_interior, extract_component_name, extract_fragments, locate_dictionary,
};
use crate::rewrite::rewrite_usages;
use crate::strip::strip_comments;

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Inline parsed styles directly onto elements.
    Dev,
    /// Substitute generated class names and collect rules for the bundle.
    Build,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Dev => "dev",
            Mode::Build => "build",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    pub mode: Mode,
    /// Strict mode fails on an unterminated dictionary literal; lenient
    /// (default) extends the span to end of input.
    pub strict: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            mode: Mode::Dev,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "napi", napi(object))]
pub struct TransformOutput {
    pub code: String,
    pub warnings: Vec<Diagnostic>,
    /// Rules this file contributed in build mode. They are already appended
    /// to the collector; carried here so cache hits can replay them.
    pub rules: Vec<String>,
}

const SOURCE_EXTENSIONS: [&str; 4] = ["js", "jsx", "ts", "tsx"];

pub(crate) fn has_source_extension(file_path: &str) -> bool {
    Path::new(file_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

// ═══════════════════════════════════════════════════════════════════════════════
// DRIVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Transform one file's source text.
///
/// `Ok(None)` means the transform does not apply: wrong extension, no
/// uppercase exported declaration, or no dictionary. In build mode the
/// generated rules are appended to `collector` as a side effect.
pub fn transform_source(
    source: &str,
    file_path: &str,
    options: &TransformOptions,
    collector: &StyleCollector,
) -> Result<Option<TransformOutput>, CompilerError> {
    if !has_source_extension(file_path) {
        return Ok(None);
    }

    let stripped = strip_comments(source);

    let component = match extract_component_name(&stripped) {
        Some(name) => name,
        None => return Ok(None),
    };

    let span = match locate_dictionary(&stripped, options.strict, file_path)? {
        Some(span) => span,
        None => return Ok(None),
    };
    let dict = extract_fragments(dictionary_interior(&stripped, &span));

    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_module(true)
        .with_typescript(true)
        .with_jsx(true);
    let ret = Parser::new(&allocator, &stripped, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let detail = ret
            .errors
            .first()
            .map(|e| format!("{:?}", e))
            .unwrap_or_else(|| "parser panicked".to_string());
        return Err(CompilerError::new(ERR_PARSE, &detail, file_path, 1, 1));
    }

    let outcome = rewrite_usages(
        &ret.program,
        &stripped,
        file_path,
        &component,
        &dict,
        options.mode,
    );

    for warning in &outcome.warnings {
        eprintln!("[nicecss] {}: {}", file_path, warning.message);
    }
    if options.mode == Mode::Build {
        collector.extend(outcome.rules.iter().cloned());
    }

    let code = apply_replacements(&stripped, outcome.replacements);
    Ok(Some(TransformOutput {
        code,
        warnings: outcome.warnings,
        rules: outcome.rules,
    }))
}

/// Disk-backed wrapper around [`transform_source`] with optional caching.
/// A cache hit still repopulates the collector for the current build.
pub fn transform_file(
    path: &Path,
    options: &TransformOptions,
    collector: &StyleCollector,
    cache: Option<&TransformCache>,
) -> Result<Option<TransformOutput>, CompilerError> {
    let file_path = path.to_string_lossy().to_string();
    let source = fs::read_to_string(path).map_err(|e| {
        CompilerError::new(
            ERR_IO,
            &format!("failed to read {}: {}", file_path, e),
            &file_path,
            0,
            0,
        )
    })?;

    if let Some(cache) = cache {
        if let Some(output) = cache.get(&file_path, &source, options.mode) {
            if options.mode == Mode::Build {
                collector.extend(output.rules.iter().cloned());
            }
            return Ok(Some(output));
        }
    }

    let result = transform_source(&source, &file_path, options, collector)?;
    if let (Some(cache), Some(output)) = (cache, result.as_ref()) {
        cache.set(&file_path, &source, options.mode, output);
    }
    Ok(result)
}

/// Apply collected byte-range edits to `source`. Edits are disjoint by
/// construction except when the removed dictionary declaration covers inner
/// edits; the outermost edit wins on overlap.
pub(crate) fn apply_replacements(source: &str, mut replacements: Vec<(u32, u32, String)>) -> String {
    replacements.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut kept: Vec<(u32, u32, String)> = Vec::new();
    let mut last_end = 0u32;
    for replacement in replacements {
        if replacement.0 >= last_end {
            last_end = replacement.1;
            kept.push(replacement);
        }
    }

    let mut output = source.to_string();
    for (start, end, text) in kept.iter().rev() {
        output.replace_range((*start as usize)..(*end as usize), text);
    }
    output
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn transform_styles_native(
    source: String,
    id: String,
    options_json: Option<String>,
) -> napi::Result<Option<TransformOutput>> {
    let options: TransformOptions = match options_json.as_deref() {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| napi::Error::from_reason(format!("invalid options: {}", e)))?,
        None => TransformOptions::default(),
    };

    transform_source(&source, &id, &options, crate::collector::global())
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter() {
        assert!(has_source_extension("a/b/Component.jsx"));
        assert!(has_source_extension("Component.ts"));
        assert!(has_source_extension("Component.tsx"));
        assert!(has_source_extension("Component.js"));
        assert!(!has_source_extension("styles.css"));
        assert!(!has_source_extension("README"));
    }

    #[test]
    fn test_apply_replacements_descending() {
        let out = apply_replacements(
            "abcdef",
            vec![(4, 5, "X".to_string()), (0, 2, "YY".to_string())],
        );
        assert_eq!(out, "YYcdXf");
    }

    #[test]
    fn test_apply_replacements_outermost_wins_on_overlap() {
        let out = apply_replacements(
            "abcdef",
            vec![(2, 3, "inner".to_string()), (1, 5, "".to_string())],
        );
        assert_eq!(out, "af");
    }

    #[test]
    fn test_options_json_defaults() {
        let options: TransformOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.mode, Mode::Dev);
        assert!(!options.strict);

        let options: TransformOptions = serde_json::from_str(r#"{"mode":"build"}"#).unwrap();
        assert_eq!(options.mode, Mode::Build);
    }
}
