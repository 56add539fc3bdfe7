//! Project-wide lint driver.
//!
//! Recursively scans a source tree and lints every matching file. Faults in
//! one file (unreadable, unparsable) become diagnostics for that file and
//! never abort the scan.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "napi")]
use napi_derive::napi;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::diag::{Diagnostic, ERR_IO};
use crate::lint::lint_source;
use crate::transform::has_source_extension;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "napi", napi(object))]
pub struct FileDiagnostics {
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lint every source file under `base_dir`. Files with no findings are
/// omitted; results are path-sorted for deterministic output.
pub fn lint_project(base_dir: &Path) -> Vec<FileDiagnostics> {
    let files = find_source_files(base_dir);

    let mut results: Vec<FileDiagnostics> =
        files.par_iter().filter_map(|path| lint_one(path)).collect();
    results.sort_by(|a, b| a.path.cmp(&b.path));
    results
}

fn lint_one(path: &Path) -> Option<FileDiagnostics> {
    let display = path.to_string_lossy().to_string();

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            return Some(FileDiagnostics {
                path: display.clone(),
                diagnostics: vec![Diagnostic::error(
                    ERR_IO,
                    &format!("failed to read file: {}", e),
                    &display,
                    0,
                    0,
                )],
            });
        }
    };

    match lint_source(&source, &display) {
        Ok(diagnostics) if diagnostics.is_empty() => None,
        Ok(diagnostics) => Some(FileDiagnostics {
            path: display,
            diagnostics,
        }),
        Err(e) => {
            eprintln!("[nicecss] failed to lint {}: {}", display, e);
            Some(FileDiagnostics {
                path: display,
                diagnostics: vec![Diagnostic::error(&e.code, &e.message, &e.file, e.line, e.column)],
            })
        }
    }
}

/// Recursively collect lintable files, skipping dependency and hidden
/// directories.
fn find_source_files(base_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(base_dir)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().is_dir() && (name == "node_modules" || name.starts_with('.')))
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_source_extension(&path.to_string_lossy()))
        .collect()
}

#[cfg(feature = "napi")]
#[napi]
pub fn lint_project_native(base_dir: String) -> Vec<FileDiagnostics> {
    lint_project(Path::new(&base_dir))
}
