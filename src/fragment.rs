//! Style fragment parsing.
//!
//! One dictionary fragment is a declaration list (`color: red; padding: 4px;`).
//! Tokenization is delegated to cssparser; value text is captured as raw
//! source slices so nothing is normalized (`#FF0000` stays `#FF0000`).
//!
//! Two entry points share the scan: [`parse_fragment`] recovers silently
//! from malformed declarations (transform path), [`validate_fragment`]
//! reports them (lint path).

use cssparser::{BasicParseErrorKind, ParseError, Parser, ParserInput, Token};

/// One parsed declaration: property converted to lower camelCase, value raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDecl {
    pub property: String,
    pub value: String,
}

/// A declaration the tokenizer could not shape into `property: value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssIssue {
    pub message: String,
    /// 1-based line within the fragment.
    pub line: u32,
    pub column: u32,
}

/// Parse a raw fragment into ordered property/value pairs.
///
/// Declaration order is kept; a repeated property keeps its first position
/// with the last value. Malformed declarations are skipped, never errored.
pub fn parse_fragment(raw: &str) -> Vec<StyleDecl> {
    let mut input = ParserInput::new(raw);
    let mut parser = Parser::new(&mut input);
    let mut decls: Vec<StyleDecl> = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        match parse_declaration(&mut parser) {
            Ok((property, value)) => {
                let property = kebab_to_camel(&property);
                match decls.iter_mut().find(|d| d.property == property) {
                    Some(decl) => decl.value = value,
                    None => decls.push(StyleDecl { property, value }),
                }
            }
            Err(_) => {
                // Recovery: drop the offending token and rescan.
                let _ = parser.next();
            }
        }
    }

    decls
}

/// Strict variant of the same scan for the lint rule: a declaration that
/// fails to parse produces an issue instead of a silent skip.
pub fn validate_fragment(raw: &str) -> Vec<CssIssue> {
    let mut input = ParserInput::new(raw);
    let mut parser = Parser::new(&mut input);
    let mut issues = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let location = parser.current_source_location();
        if parse_declaration(&mut parser).is_err() {
            issues.push(CssIssue {
                message: "expected `property: value` declaration".to_string(),
                line: location.line + 1,
                column: location.column,
            });
            // Resynchronize at the next declaration boundary.
            loop {
                match parser.next() {
                    Ok(&Token::Semicolon) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        }
    }

    issues
}

/// Parse `ident : <tokens> (; | eof)`, capturing the value as the raw
/// source text between the colon and the terminator.
fn parse_declaration<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<(String, String), ParseError<'i, ()>> {
    parser.skip_whitespace();

    let property = match parser.next()? {
        Token::Ident(name) => name.to_string(),
        _ => {
            return Err(
                parser.new_error(BasicParseErrorKind::UnexpectedToken(Token::Ident(
                    "property".into(),
                ))),
            );
        }
    };

    parser.skip_whitespace();

    match parser.next()? {
        Token::Colon => {}
        _ => {
            return Err(parser.new_error(BasicParseErrorKind::UnexpectedToken(Token::Colon)));
        }
    }

    parser.skip_whitespace();

    let mut value_parts = Vec::new();
    loop {
        let start = parser.position();
        match parser.next_including_whitespace() {
            Ok(Token::Semicolon) | Err(_) => break,
            Ok(_) => {
                let part = parser.slice_from(start);
                value_parts.push(part);
            }
        }
    }

    Ok((property, value_parts.join("").trim().to_string()))
}

/// `background-color` → `backgroundColor`; a dash not followed by a
/// lowercase letter is kept, matching the transform's historical behavior
/// for vendor prefixes (`-webkit-transform` → `WebkitTransform`).
fn kebab_to_camel(property: &str) -> String {
    let mut out = String::with_capacity(property.len());
    let mut chars = property.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '-' {
            match chars.peek() {
                Some(c) if c.is_ascii_lowercase() => {
                    let c = chars.next().unwrap();
                    out.push(c.to_ascii_uppercase());
                }
                _ => out.push('-'),
            }
        } else {
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &str) -> Vec<(String, String)> {
        parse_fragment(raw)
            .into_iter()
            .map(|d| (d.property, d.value))
            .collect()
    }

    #[test]
    fn test_parses_declarations_in_order() {
        assert_eq!(
            pairs("color: red; padding: 4px;"),
            vec![
                ("color".to_string(), "red".to_string()),
                ("padding".to_string(), "4px".to_string()),
            ]
        );
    }

    #[test]
    fn test_kebab_properties_become_camel_case() {
        assert_eq!(
            pairs("background-color: #FF0000;"),
            vec![("backgroundColor".to_string(), "#FF0000".to_string())]
        );
        assert_eq!(kebab_to_camel("-webkit-transform"), "WebkitTransform");
    }

    #[test]
    fn test_multi_token_values_keep_raw_text() {
        assert_eq!(
            pairs("border: 1px solid red;"),
            vec![("border".to_string(), "1px solid red".to_string())]
        );
        assert_eq!(
            pairs("font-family: \"Fira Sans\", sans-serif;"),
            vec![("fontFamily".to_string(), "\"Fira Sans\", sans-serif".to_string())]
        );
    }

    #[test]
    fn test_missing_final_semicolon() {
        assert_eq!(pairs("color: red"), vec![("color".to_string(), "red".to_string())]);
    }

    #[test]
    fn test_malformed_declaration_is_skipped() {
        assert_eq!(
            pairs("color red; padding: 4px;"),
            vec![("padding".to_string(), "4px".to_string())]
        );
    }

    #[test]
    fn test_duplicate_property_keeps_last_value() {
        assert_eq!(pairs("color: red; color: blue;"), vec![("color".to_string(), "blue".to_string())]);
    }

    #[test]
    fn test_validate_clean_fragment() {
        assert!(validate_fragment("color: red;\npadding: 4px;").is_empty());
    }

    #[test]
    fn test_validate_reports_malformed_declaration() {
        let issues = validate_fragment("color red;\npadding: 4px;");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 1);

        let issues = validate_fragment("color: red;\npadding 4px;");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 2);
    }
}
