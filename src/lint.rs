//! Lint rule for dictionary fragments.
//!
//! Validates and auto-formats the CSS inside style template literals. This
//! is deliberately independent of the transform pipeline: the dictionary is
//! located through its own syntax-tree pass, so the only thing shared with
//! the driver is the literal shape convention (`const styles = { ... }`).
//!
//! Two findings per entry are possible:
//! - a CSS syntax error — blocking, not fixable;
//! - interior lines not indented by exactly two spaces — fixable, the fix
//!   rewrites the template literal with normalized indentation.

#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Expression, ObjectExpression, ObjectPropertyKind, TemplateLiteral, VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::diag::{
    byte_offset_to_line_col, CompilerError, Diagnostic, Fix, ERR_PARSE, LINT_CSS_INDENT,
    LINT_CSS_SYNTAX,
};
use crate::fragment::validate_fragment;
use crate::locate::DICT_IDENT;
use crate::transform::apply_replacements;

const EXPECTED_INDENT: &str = "  ";

/// Lint one file's dictionary entries. Files without a dictionary produce
/// no diagnostics; an unparsable file is a fatal error.
pub fn lint_source(source: &str, file_path: &str) -> Result<Vec<Diagnostic>, CompilerError> {
    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_module(true)
        .with_typescript(true)
        .with_jsx(true);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let detail = ret
            .errors
            .first()
            .map(|e| format!("{:?}", e))
            .unwrap_or_else(|| "parser panicked".to_string());
        return Err(CompilerError::new(ERR_PARSE, &detail, file_path, 1, 1));
    }

    let mut visitor = LintVisitor {
        source,
        file: file_path,
        diagnostics: Vec::new(),
    };
    visitor.visit_program(&ret.program);
    Ok(visitor.diagnostics)
}

/// Apply the fix payloads carried by `diagnostics` to `source`.
pub fn apply_fixes(source: &str, diagnostics: &[Diagnostic]) -> String {
    let edits: Vec<(u32, u32, String)> = diagnostics
        .iter()
        .filter_map(|diagnostic| diagnostic.fix.as_ref())
        .map(|fix| (fix.start, fix.end, fix.replacement.clone()))
        .collect();
    apply_replacements(source, edits)
}

struct LintVisitor<'s> {
    source: &'s str,
    file: &'s str,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Visit<'a> for LintVisitor<'_> {
    fn visit_variable_declarator(&mut self, declarator: &VariableDeclarator<'a>) {
        let is_dict = declarator
            .id
            .get_binding_identifier()
            .map(|ident| ident.name.as_str() == DICT_IDENT)
            .unwrap_or(false);
        if is_dict {
            if let Some(Expression::ObjectExpression(object)) = &declarator.init {
                self.check_dictionary(object);
            }
        }
        walk::walk_variable_declarator(self, declarator);
    }
}

impl LintVisitor<'_> {
    fn check_dictionary(&mut self, object: &ObjectExpression<'_>) {
        for property in &object.properties {
            if let ObjectPropertyKind::ObjectProperty(property) = property {
                if let Expression::TemplateLiteral(template) = &property.value {
                    // Interpolated templates are not dictionary entries.
                    if template.quasis.len() == 1 && template.expressions.is_empty() {
                        self.check_entry(template);
                    }
                }
            }
        }
    }

    fn check_entry(&mut self, template: &TemplateLiteral<'_>) {
        let raw = template.quasis[0].value.raw.as_str();
        let (line, column) = byte_offset_to_line_col(self.source, template.span.start);

        let issues = validate_fragment(raw);
        if let Some(issue) = issues.first() {
            self.diagnostics.push(Diagnostic::error(
                LINT_CSS_SYNTAX,
                &format!(
                    "CSS syntax error at fragment line {}: {}",
                    issue.line, issue.message
                ),
                self.file,
                line,
                column,
            ));
            return;
        }

        if let Some(fixed) = reindent_fragment(raw) {
            self.diagnostics.push(
                Diagnostic::warning(
                    LINT_CSS_INDENT,
                    "CSS inside a style template literal should be indented by 2 spaces",
                    self.file,
                    line,
                    column,
                )
                .with_fix(Fix {
                    start: template.span.start,
                    end: template.span.end,
                    replacement: format!("`{}`", fixed),
                }),
            );
        }
    }
}

/// Re-indent the interior lines of a fragment to the expected two spaces.
/// Returns `None` when nothing deviates. The first and last lines (the text
/// on the backquote lines) and blank lines are left alone.
fn reindent_fragment(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.split('\n').collect();
    if lines.len() < 3 {
        return None;
    }

    let content = &lines[1..lines.len() - 1];
    let needs_fix = content
        .iter()
        .any(|line| !line.is_empty() && !line.starts_with(EXPECTED_INDENT));
    if !needs_fix {
        return None;
    }

    let mut fixed = Vec::with_capacity(lines.len());
    fixed.push(lines[0].to_string());
    for line in content {
        if line.is_empty() {
            fixed.push(String::new());
        } else {
            fixed.push(format!("{}{}", EXPECTED_INDENT, line.trim_start()));
        }
    }
    fixed.push(lines[lines.len() - 1].to_string());
    Some(fixed.join("\n"))
}

#[cfg(feature = "napi")]
#[napi]
pub fn lint_source_native(source: String, file_path: String) -> napi::Result<Vec<Diagnostic>> {
    lint_source(&source, &file_path).map_err(|e| napi::Error::from_reason(e.to_string()))
}
