//! Usage-site rewriting over the syntax tree.
//!
//! The tree is walked once, pre-order, collecting byte-range replacements
//! that are later applied to the source text; nodes are never mutated in
//! place. Replacements are anchored to resolved AST nodes, so a string
//! literal that happens to contain `styles.box` is never rewritten, and the
//! dictionary declaration is removed through its declaration node rather
//! than a text pattern.

use std::collections::HashSet;

use lazy_static::lazy_static;
use oxc_ast::ast::{
    Expression, JSXAttribute, JSXAttributeItem, JSXAttributeName, JSXAttributeValue,
    JSXOpeningElement, Program, StaticMemberExpression, VariableDeclaration,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::GetSpan;
use regex::Regex;

use crate::diag::{byte_offset_to_line_col, Diagnostic, WARN_UNKNOWN_STYLE_KEY};
use crate::fragment::{parse_fragment, StyleDecl};
use crate::locate::DICT_IDENT;
use crate::transform::Mode;

lazy_static! {
    static ref BARE_KEY_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

pub struct RewriteOutcome {
    pub replacements: Vec<(u32, u32, String)>,
    pub warnings: Vec<Diagnostic>,
    /// Build mode only: generated class rules in first-use order.
    pub rules: Vec<String>,
}

/// Walk `program` and collect the edits that realize `mode` for every usage
/// site of the style dictionary.
pub fn rewrite_usages(
    program: &Program<'_>,
    source: &str,
    file: &str,
    component: &str,
    dict: &[(String, String)],
    mode: Mode,
) -> RewriteOutcome {
    let mut rewriter = UsageRewriter {
        mode,
        source,
        file,
        component,
        dict,
        replacements: Vec::new(),
        warnings: Vec::new(),
        rules: Vec::new(),
        emitted_keys: HashSet::new(),
        dictionary_removed: false,
    };
    rewriter.visit_program(program);

    RewriteOutcome {
        replacements: rewriter.replacements,
        warnings: rewriter.warnings,
        rules: rewriter.rules,
    }
}

struct UsageRewriter<'s> {
    mode: Mode,
    source: &'s str,
    file: &'s str,
    component: &'s str,
    dict: &'s [(String, String)],
    replacements: Vec<(u32, u32, String)>,
    warnings: Vec<Diagnostic>,
    rules: Vec<String>,
    emitted_keys: HashSet<String>,
    dictionary_removed: bool,
}

impl UsageRewriter<'_> {
    fn fragment_for(&self, key: &str) -> Option<&str> {
        self.dict
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, raw)| raw.as_str())
    }

    fn drop_attribute(&mut self, attr: &JSXAttribute<'_>) {
        self.replacements
            .push((attr.span.start, attr.span.end, String::new()));
    }

    fn warn_unknown_key(&mut self, attr: &JSXAttribute<'_>, key: &str) {
        let (line, column) = byte_offset_to_line_col(self.source, attr.span.start);
        self.warnings.push(Diagnostic::warning(
            WARN_UNKNOWN_STYLE_KEY,
            &format!("no matching style found for key: {}", key),
            self.file,
            line,
            column,
        ));
        self.drop_attribute(attr);
    }

    fn inject_inline_style(
        &mut self,
        class_attr: &JSXAttribute<'_>,
        style_attr: Option<&JSXAttribute<'_>>,
        key: &str,
    ) {
        let raw = match self.fragment_for(key) {
            Some(raw) => raw.to_string(),
            None => {
                self.warn_unknown_key(class_attr, key);
                return;
            }
        };
        let object = render_style_object(&parse_fragment(&raw));

        match style_attr {
            Some(style_attr) => {
                let replacement = match existing_style_source(style_attr, self.source) {
                    // The dictionary-derived object is assigned last, so it
                    // wins on key collisions.
                    Some(existing) => {
                        format!("style={{Object.assign({{}}, {}, {})}}", existing, object)
                    }
                    None => format!("style={{{}}}", object),
                };
                self.replacements
                    .push((style_attr.span.start, style_attr.span.end, replacement));
                self.drop_attribute(class_attr);
            }
            None => {
                // No existing style attribute: the class reference itself
                // becomes the style attribute.
                self.replacements.push((
                    class_attr.span.start,
                    class_attr.span.end,
                    format!("style={{{}}}", object),
                ));
            }
        }
    }
}

impl<'a> Visit<'a> for UsageRewriter<'_> {
    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration<'a>) {
        if !self.dictionary_removed && is_dictionary_declaration(decl) {
            self.dictionary_removed = true;
            let mut end = decl.span.end;
            if self.source.as_bytes().get(end as usize) == Some(&b';') {
                end += 1;
            }
            self.replacements
                .push((decl.span.start, end, String::new()));
        }
        walk::walk_variable_declaration(self, decl);
    }

    fn visit_jsx_opening_element(&mut self, elem: &JSXOpeningElement<'a>) {
        let mut class_attr: Option<(&JSXAttribute<'a>, String)> = None;
        let mut style_attr: Option<&JSXAttribute<'a>> = None;

        for item in &elem.attributes {
            if let JSXAttributeItem::Attribute(attr) = item {
                if let JSXAttributeName::Identifier(name) = &attr.name {
                    match name.name.as_str() {
                        "className" => {
                            if class_attr.is_none() {
                                if let Some(key) = class_reference_key(attr) {
                                    class_attr = Some((&**attr, key));
                                }
                            }
                        }
                        "style" => {
                            if style_attr.is_none() {
                                style_attr = Some(&**attr);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if let Some((attr, key)) = class_attr {
            match self.mode {
                Mode::Dev => self.inject_inline_style(attr, style_attr, &key),
                Mode::Build => {
                    // Known keys are rewritten by the member-expression pass;
                    // only a dangling reference needs handling here.
                    if self.fragment_for(&key).is_none() {
                        self.warn_unknown_key(attr, &key);
                    }
                }
            }
        }

        walk::walk_jsx_opening_element(self, elem);
    }

    fn visit_static_member_expression(&mut self, member: &StaticMemberExpression<'a>) {
        if self.mode == Mode::Build && !member.optional {
            if let Expression::Identifier(object) = &member.object {
                if object.name.as_str() == DICT_IDENT {
                    let key = member.property.name.as_str();
                    let rule_body = self.fragment_for(key).map(|raw| raw.trim().to_string());
                    if let Some(rule_body) = rule_body {
                        let class_name = format!("{}-{}", self.component, key);
                        self.replacements.push((
                            member.span.start,
                            member.span.end,
                            format!("\"{}\"", class_name),
                        ));
                        if self.emitted_keys.insert(key.to_string()) {
                            self.rules
                                .push(format!(".{} {{ {} }}", class_name, rule_body));
                        }
                    }
                }
            }
        }
        walk::walk_static_member_expression(self, member);
    }
}

/// A class-reference attribute value is a non-optional static member access
/// on the dictionary identifier with a plain identifier property.
fn class_reference_key(attr: &JSXAttribute<'_>) -> Option<String> {
    match &attr.value {
        Some(JSXAttributeValue::ExpressionContainer(container)) => {
            match container.expression.as_expression() {
                Some(Expression::StaticMemberExpression(member)) if !member.optional => {
                    match &member.object {
                        Expression::Identifier(object) if object.name.as_str() == DICT_IDENT => {
                            Some(member.property.name.to_string())
                        }
                        _ => None,
                    }
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn is_dictionary_declaration(decl: &VariableDeclaration<'_>) -> bool {
    decl.declarations.iter().any(|declarator| {
        let is_dict_name = declarator
            .id
            .get_binding_identifier()
            .map(|ident| ident.name.as_str() == DICT_IDENT)
            .unwrap_or(false);
        is_dict_name && matches!(&declarator.init, Some(Expression::ObjectExpression(_)))
    })
}

/// Source text of an existing `style` attribute's expression, when it has one.
/// A string-valued or empty `style` attribute contributes nothing to merge.
fn existing_style_source<'s>(attr: &JSXAttribute<'_>, source: &'s str) -> Option<&'s str> {
    match &attr.value {
        Some(JSXAttributeValue::ExpressionContainer(container)) => {
            container.expression.as_expression().map(|expr| {
                let span = expr.span();
                &source[span.start as usize..span.end as usize]
            })
        }
        _ => None,
    }
}

/// Render a parsed style as a JS object literal. Property names that are
/// valid identifiers stay bare, the rest are quoted; values are always
/// string literals.
fn render_style_object(decls: &[StyleDecl]) -> String {
    if decls.is_empty() {
        return "{}".to_string();
    }

    let props: Vec<String> = decls
        .iter()
        .map(|decl| {
            let key = if BARE_KEY_RE.is_match(&decl.property) {
                decl.property.clone()
            } else {
                format!("\"{}\"", escape_js_string(&decl.property))
            };
            format!("{}: \"{}\"", key, escape_js_string(&decl.value))
        })
        .collect();

    format!("{{ {} }}", props.join(", "))
}

fn escape_js_string(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_style_object() {
        let decls = vec![
            StyleDecl {
                property: "color".to_string(),
                value: "red".to_string(),
            },
            StyleDecl {
                property: "padding".to_string(),
                value: "4px".to_string(),
            },
        ];
        assert_eq!(
            render_style_object(&decls),
            "{ color: \"red\", padding: \"4px\" }"
        );
        assert_eq!(render_style_object(&[]), "{}");
    }

    #[test]
    fn test_render_quotes_non_identifier_keys() {
        let decls = vec![StyleDecl {
            property: "-Foo".to_string(),
            value: "bar".to_string(),
        }];
        assert_eq!(render_style_object(&decls), "{ \"-Foo\": \"bar\" }");
    }

    #[test]
    fn test_escape_js_string() {
        assert_eq!(escape_js_string(r#"url("a.png")"#), r#"url(\"a.png\")"#);
        assert_eq!(escape_js_string(r"a\b"), r"a\\b");
    }
}
