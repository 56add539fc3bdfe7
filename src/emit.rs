//! Bundle emission for build mode.
//!
//! Drains the collector once per build, minifies the joined rules with
//! lightningcss and writes `<outDir>/bundle.css`. Single best-effort
//! attempt: emit failures propagate, there is no retry.

use std::fs;
use std::path::{Path, PathBuf};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::collector::StyleCollector;
use crate::diag::{CompilerError, ERR_CSS_EMIT, ERR_IO};

pub const BUNDLE_FILE_NAME: &str = "bundle.css";

/// Drain `collector` and write the minified bundle into `out_dir`,
/// creating directories as needed. Returns the written path, or `Ok(None)`
/// when nothing was collected (no file is touched).
pub fn emit_bundle(
    collector: &StyleCollector,
    out_dir: &Path,
) -> Result<Option<PathBuf>, CompilerError> {
    let rules = collector.drain();
    if rules.is_empty() {
        return Ok(None);
    }

    let css = rules.join("\n");
    let minified = minify_stylesheet(&css)?;

    let out_path = out_dir.join(BUNDLE_FILE_NAME);
    fs::create_dir_all(out_dir).map_err(|e| {
        CompilerError::new(
            ERR_IO,
            &format!("failed to create {}: {}", out_dir.display(), e),
            BUNDLE_FILE_NAME,
            0,
            0,
        )
    })?;
    fs::write(&out_path, minified).map_err(|e| {
        CompilerError::new(
            ERR_IO,
            &format!("failed to write {}: {}", out_path.display(), e),
            BUNDLE_FILE_NAME,
            0,
            0,
        )
    })?;

    Ok(Some(out_path))
}

/// Parse → minify → print. Error recovery is on so one bad collected rule
/// cannot sink the whole bundle.
pub fn minify_stylesheet(css: &str) -> Result<String, CompilerError> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let mut stylesheet = StyleSheet::parse(css, options).map_err(|e| {
        CompilerError::new(
            ERR_CSS_EMIT,
            &format!("stylesheet parse error: {}", e),
            BUNDLE_FILE_NAME,
            0,
            0,
        )
    })?;

    stylesheet.minify(MinifyOptions::default()).map_err(|e| {
        CompilerError::new(
            ERR_CSS_EMIT,
            &format!("stylesheet minify error: {:?}", e),
            BUNDLE_FILE_NAME,
            0,
            0,
        )
    })?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| {
            CompilerError::new(
                ERR_CSS_EMIT,
                &format!("stylesheet print error: {:?}", e),
                BUNDLE_FILE_NAME,
                0,
                0,
            )
        })?;

    Ok(result.code)
}

#[cfg(feature = "napi")]
#[napi]
pub fn flush_bundle_native(out_dir: String) -> napi::Result<Option<String>> {
    emit_bundle(crate::collector::global(), Path::new(&out_dir))
        .map(|path| path.map(|p| p.to_string_lossy().to_string()))
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_collapses_rule() {
        let minified = minify_stylesheet(".Box-box { color: red; padding: 4px; }").unwrap();
        assert!(minified.contains(".Box-box"));
        assert!(minified.contains("color:red"));
        assert!(!minified.contains('\n'));
    }

    #[test]
    fn test_empty_collector_emits_nothing() {
        let collector = StyleCollector::new();
        let out_dir = std::env::temp_dir().join(format!("nicecss-emit-none-{}", std::process::id()));
        let result = emit_bundle(&collector, &out_dir).unwrap();
        assert!(result.is_none());
        assert!(!out_dir.join(BUNDLE_FILE_NAME).exists());
    }

    #[test]
    fn test_emit_writes_and_drains() {
        let collector = StyleCollector::new();
        collector.append(".Box-box { color: red; }".to_string());

        let out_dir = std::env::temp_dir().join(format!("nicecss-emit-{}", std::process::id()));
        let path = emit_bundle(&collector, &out_dir).unwrap().unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains(".Box-box"));

        // Drained: a second flush with no new transforms writes nothing.
        fs::remove_file(&path).unwrap();
        assert!(emit_bundle(&collector, &out_dir).unwrap().is_none());
        assert!(!path.exists());

        fs::remove_dir_all(&out_dir).ok();
    }
}
