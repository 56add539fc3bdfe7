//! Shared diagnostic and error types.
//!
//! Every fallible layer reports through these records so the napi boundary
//! can hand the host structured data instead of formatted strings.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_PARSE: &str = "PARSE_ERROR";
pub const ERR_IO: &str = "IO_ERROR";
pub const ERR_MALFORMED_DICTIONARY: &str = "MALFORMED_DICTIONARY";
pub const ERR_CSS_EMIT: &str = "CSS_EMIT_ERROR";
pub const WARN_UNKNOWN_STYLE_KEY: &str = "UNKNOWN_STYLE_KEY";
pub const LINT_CSS_SYNTAX: &str = "CSS_SYNTAX_ERROR";
pub const LINT_CSS_INDENT: &str = "CSS_INDENT";

// ═══════════════════════════════════════════════════════════════════════════════
// FATAL ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// A fatal, per-file failure. Skip conditions are not errors and are modeled
/// as `Ok(None)` by the driver; this type is reserved for conditions the
/// caller must see (unparsable source, strict-mode malformed dictionaries,
/// I/O and emit failures).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
pub struct CompilerError {
    pub code: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl CompilerError {
    pub fn new(code: &str, message: &str, file: &str, line: u32, column: u32) -> Self {
        CompilerError {
            code: code.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.file, self.line, self.column, self.code, self.message
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECOVERABLE DIAGNOSTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// A byte-range text edit attached to a fixable diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "napi", napi(object))]
pub struct Fix {
    pub start: u32,
    pub end: u32,
    pub replacement: String,
}

/// A recoverable finding: transform warnings and lint reports.
/// `severity` is "warning" or "error"; a diagnostic is fixable iff `fix`
/// carries an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "napi", napi(object))]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub severity: String,
    pub fix: Option<Fix>,
}

impl Diagnostic {
    pub fn warning(code: &str, message: &str, file: &str, line: u32, column: u32) -> Self {
        Diagnostic {
            code: code.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            line,
            column,
            severity: "warning".to_string(),
            fix: None,
        }
    }

    pub fn error(code: &str, message: &str, file: &str, line: u32, column: u32) -> Self {
        Diagnostic {
            severity: "error".to_string(),
            ..Diagnostic::warning(code, message, file, line, column)
        }
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }
}

/// Convert a byte offset into a 1-based (line, column) pair.
pub fn byte_offset_to_line_col(source: &str, offset: u32) -> (u32, u32) {
    let offset = offset as usize;
    let mut line: u32 = 1;
    let mut line_start: usize = 0;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            line_start = i + 1;
        }
    }

    let col = (offset - line_start) as u32 + 1;
    (line, col)
}
