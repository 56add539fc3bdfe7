//! Dictionary location and fragment extraction.
//!
//! The style dictionary is one well-known literal (`const styles = { ... }`)
//! inside otherwise arbitrary script text. It is found with a
//! balanced-delimiter scan rather than a full parse: braces are counted
//! outside strings, with the same generic string/escape tracking as the
//! comment stripper. Structured usage-site rewriting is the syntax tree's
//! job; this module only isolates the literal.

use lazy_static::lazy_static;
use regex::Regex;

use crate::diag::{CompilerError, ERR_MALFORMED_DICTIONARY};

/// The well-known dictionary binding name.
pub const DICT_IDENT: &str = "styles";

lazy_static! {
    static ref PROLOGUE_RE: Regex =
        Regex::new(&format!(r"const\s+{}\s*=", DICT_IDENT)).unwrap();
    static ref ENTRY_RE: Regex = Regex::new(r"(\w+)\s*:\s*`([^`]*)`").unwrap();
    static ref EXPORT_RE: Regex = Regex::new(
        r"export\s+(?:default\s+)?(?:(?:async\s+)?function\s+|class\s+|const\s+|let\s+|var\s+)?([A-Z][A-Za-z0-9_]*)"
    )
    .unwrap();
}

/// Byte range of the dictionary declaration, prologue through closing brace
/// inclusive (`end` exclusive as a slice bound).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionarySpan {
    pub start: usize,
    pub end: usize,
}

/// Find the first dictionary declaration in `code`.
///
/// Returns `Ok(None)` when no prologue or no opening brace exists — most
/// files carry no dictionary and are skipped, not failed. An unterminated
/// literal extends the span to end of input in lenient mode and is a
/// `MALFORMED_DICTIONARY` error in strict mode.
pub fn locate_dictionary(
    code: &str,
    strict: bool,
    file: &str,
) -> Result<Option<DictionarySpan>, CompilerError> {
    let prologue = match PROLOGUE_RE.find(code) {
        Some(m) => m,
        None => return Ok(None),
    };

    let bytes = code.as_bytes();
    let mut i = prologue.end();
    while i < bytes.len() && bytes[i] != b'{' {
        i += 1;
    }
    if i >= bytes.len() {
        return Ok(None);
    }

    let mut depth: i32 = 0;
    let mut in_string: Option<u8> = None;
    let mut escape = false;

    while i < bytes.len() {
        let c = bytes[i];

        if escape {
            escape = false;
            i += 1;
            continue;
        }
        if c == b'\\' {
            escape = true;
            i += 1;
            continue;
        }
        if c == b'"' || c == b'\'' || c == b'`' {
            match in_string {
                Some(delim) if delim == c => in_string = None,
                Some(_) => {}
                None => in_string = Some(c),
            }
            i += 1;
            continue;
        }

        if in_string.is_none() {
            if c == b'{' {
                depth += 1;
            } else if c == b'}' {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(DictionarySpan {
                        start: prologue.start(),
                        end: i + 1,
                    }));
                }
            }
        }

        i += 1;
    }

    if strict {
        return Err(CompilerError::new(
            ERR_MALFORMED_DICTIONARY,
            "style dictionary literal is never closed",
            file,
            1,
            1,
        ));
    }

    Ok(Some(DictionarySpan {
        start: prologue.start(),
        end: code.len(),
    }))
}

/// Slice the interior of a located span, with the outermost braces removed.
pub fn dictionary_interior<'s>(code: &'s str, span: &DictionarySpan) -> &'s str {
    let slice = &code[span.start..span.end];
    match (slice.find('{'), slice.rfind('}')) {
        (Some(open), Some(close)) if close > open => &slice[open + 1..close],
        _ => "",
    }
}

/// Extract `name: `...`` entries from the span interior into an ordered
/// name → raw fragment mapping. Entries keep their first-seen position and
/// the last value wins on duplicate names. Anything that is not a plain
/// identifier bound to a single template literal (spreads, computed keys,
/// non-template values) is ignored.
pub fn extract_fragments(interior: &str) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();

    for caps in ENTRY_RE.captures_iter(interior) {
        let name = caps[1].to_string();
        let fragment = caps[2].to_string();
        match entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = fragment,
            None => entries.push((name, fragment)),
        }
    }

    entries
}

/// First exported declaration whose identifier starts uppercase; the
/// namespace prefix for generated class names.
pub fn extract_component_name(code: &str) -> Option<String> {
    EXPORT_RE
        .captures(code)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_simple() {
        let code = "const a = 1;\nconst styles = { box: `color: red;` };\nconst b = 2;";
        let span = locate_dictionary(code, false, "a.jsx").unwrap().unwrap();
        assert_eq!(&code[span.start..span.end], "const styles = { box: `color: red;` }");
    }

    #[test]
    fn test_locate_none_without_dictionary() {
        assert_eq!(locate_dictionary("const a = 1;", false, "a.jsx").unwrap(), None);
    }

    #[test]
    fn test_locate_balances_nested_objects() {
        let code = "const styles = { a: `color: red;`, b: { nested: true } }; tail";
        let span = locate_dictionary(code, false, "a.jsx").unwrap().unwrap();
        assert!(code[span.start..span.end].ends_with("{ nested: true } }"));
    }

    #[test]
    fn test_locate_ignores_braces_in_strings() {
        let code = "const styles = { a: `content: \"}\";` }; tail";
        let span = locate_dictionary(code, false, "a.jsx").unwrap().unwrap();
        assert_eq!(&code[span.start..span.end], "const styles = { a: `content: \"}\";` }");
    }

    #[test]
    fn test_unterminated_lenient_runs_to_end() {
        let code = "const styles = { a: `color: red;`";
        let span = locate_dictionary(code, false, "a.jsx").unwrap().unwrap();
        assert_eq!(span.end, code.len());
    }

    #[test]
    fn test_unterminated_strict_errors() {
        let code = "const styles = { a: `color: red;`";
        let err = locate_dictionary(code, true, "a.jsx").unwrap_err();
        assert_eq!(err.code, ERR_MALFORMED_DICTIONARY);
    }

    #[test]
    fn test_extract_fragments_round_trip() {
        let code = "const styles = { box: `color: red;`, title: `font-weight: bold;` };";
        let span = locate_dictionary(code, false, "a.jsx").unwrap().unwrap();
        let entries = extract_fragments(dictionary_interior(code, &span));
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["box", "title"]);
        assert_eq!(entries[0].1, "color: red;");
    }

    #[test]
    fn test_extract_last_entry_wins() {
        let entries = extract_fragments("box: `color: red;`, box: `color: blue;`");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, "color: blue;");
    }

    #[test]
    fn test_extract_ignores_non_literal_entries() {
        let entries =
            extract_fragments("...base, box: `color: red;`, count: 4, [key]: `x`, fn: () => 1");
        assert!(entries.iter().any(|(n, _)| n == "box"));
        assert!(!entries.iter().any(|(n, _)| n == "count"));
        assert!(!entries.iter().any(|(n, _)| n == "key"));
        assert!(!entries.iter().any(|(n, _)| n == "fn"));
    }

    #[test]
    fn test_component_name() {
        assert_eq!(extract_component_name("export const Box = () => null;").as_deref(), Some("Box"));
        assert_eq!(extract_component_name("export default function App() {}").as_deref(), Some("App"));
        assert_eq!(extract_component_name("export default Card;").as_deref(), Some("Card"));
        assert_eq!(extract_component_name("export const helper = 1;"), None);
        assert_eq!(extract_component_name("const Box = 1;"), None);
    }
}
