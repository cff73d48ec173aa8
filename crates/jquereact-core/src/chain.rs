//! jQuery call chains.
//!
//! A chain is a root call `$(args)` or `jQuery(args)` followed by any number of
//! `.method(args)` calls. A utility call is `$.name(args)` with optional
//! promise-style continuations such as `.done(fn)`.

use std::ops::Range;

use crate::scan::{is_ident_char, string_literal, Scanner};

/// One `.method(args)` link of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,

    /// Top-level arguments, trimmed
    pub args: Vec<String>,

    pub span: Range<usize>,
}

impl Call {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Value of an argument when it is a plain string literal.
    pub fn literal_arg(&self, index: usize) -> Option<String> {
        self.arg(index).and_then(string_literal)
    }
}

/// A `$(...)` call followed by method calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// Whole chain, including a trailing `;`
    pub span: Range<usize>,

    pub root_args: Vec<String>,
    pub calls: Vec<Call>,
}

impl Chain {
    /// The selector expression passed to `$()`.
    pub fn selector(&self) -> &str {
        self.root_args.first().map(String::as_str).unwrap_or("")
    }

    pub fn methods(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.method.as_str()).collect()
    }
}

/// A `$.name(...)` call with its continuations.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityCall {
    pub span: Range<usize>,
    pub function: String,
    pub args: Vec<String>,
    pub continuations: Vec<Call>,
}

/// Root identifiers that refer to jQuery.
const ROOTS: [&str; 2] = ["$", "jQuery"];

/// Find every chain in code positions, including chains nested in arguments.
pub fn find_chains(scanner: &Scanner<'_>) -> Vec<Chain> {
    root_positions(scanner)
        .into_iter()
        .filter_map(|at| parse_chain_at(scanner, at))
        .collect()
}

/// Find every utility call in code positions.
pub fn find_utility_calls(scanner: &Scanner<'_>) -> Vec<UtilityCall> {
    root_positions(scanner)
        .into_iter()
        .filter_map(|at| parse_utility_at(scanner, at))
        .collect()
}

fn root_positions(scanner: &Scanner<'_>) -> Vec<usize> {
    let source = scanner.source();
    let bytes = source.as_bytes();

    let mut positions: Vec<usize> = ROOTS
        .iter()
        .flat_map(|root| source.match_indices(root).map(|(i, _)| i))
        .filter(|&i| scanner.is_code(i))
        .filter(|&i| i == 0 || !(is_ident_char(bytes[i - 1]) || bytes[i - 1] == b'.'))
        .filter(|&i| {
            scanner
                .identifier_at(i)
                .is_some_and(|ident| ROOTS.contains(&scanner.text(ident)))
        })
        .collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}

/// Parse a chain whose root identifier starts exactly at `at`.
pub fn parse_chain_at(scanner: &Scanner<'_>, at: usize) -> Option<Chain> {
    let root = scanner.identifier_at(at)?;
    if !ROOTS.contains(&scanner.text(root.clone())) {
        return None;
    }

    let open = scanner.skip_trivia(root.end);
    if scanner.byte(open) != Some(b'(') {
        return None;
    }
    let close = scanner.find_closing(open)?;
    let root_args = arguments(scanner, open, close);

    let (calls, end) = parse_calls(scanner, close + 1);
    Some(Chain {
        span: at..statement_end(scanner, end),
        root_args,
        calls,
    })
}

/// Parse a utility call whose root identifier starts exactly at `at`.
pub fn parse_utility_at(scanner: &Scanner<'_>, at: usize) -> Option<UtilityCall> {
    let root = scanner.identifier_at(at)?;
    if !ROOTS.contains(&scanner.text(root.clone())) {
        return None;
    }

    let dot = scanner.skip_trivia(root.end);
    if scanner.byte(dot) != Some(b'.') {
        return None;
    }
    let name = scanner.identifier_at(scanner.skip_trivia(dot + 1))?;
    let open = scanner.skip_trivia(name.end);
    if scanner.byte(open) != Some(b'(') {
        return None;
    }
    let close = scanner.find_closing(open)?;

    let (continuations, end) = parse_calls(scanner, close + 1);
    Some(UtilityCall {
        span: at..statement_end(scanner, end),
        function: scanner.text(name).to_string(),
        args: arguments(scanner, open, close),
        continuations,
    })
}

/// Parse `.method(args)` links starting at `from`; returns the calls and the end offset.
fn parse_calls(scanner: &Scanner<'_>, from: usize) -> (Vec<Call>, usize) {
    let mut calls = Vec::new();
    let mut end = from;

    loop {
        let dot = scanner.skip_trivia(end);
        if scanner.byte(dot) != Some(b'.') || !scanner.is_code(dot) {
            break;
        }
        let Some(name) = scanner.identifier_at(scanner.skip_trivia(dot + 1)) else {
            break;
        };
        let open = scanner.skip_trivia(name.end);
        if scanner.byte(open) != Some(b'(') {
            break;
        }
        let Some(close) = scanner.find_closing(open) else {
            break;
        };

        calls.push(Call {
            method: scanner.text(name).to_string(),
            args: arguments(scanner, open, close),
            span: dot..close + 1,
        });
        end = close + 1;
    }

    (calls, end)
}

fn arguments(scanner: &Scanner<'_>, open: usize, close: usize) -> Vec<String> {
    scanner
        .split_top_level(open + 1..close, b',')
        .into_iter()
        .map(|range| scanner.text(range).to_string())
        .collect()
}

/// Extend a chain end over a trailing `;` on the same statement.
fn statement_end(scanner: &Scanner<'_>, end: usize) -> usize {
    let next = scanner.skip_trivia(end);
    if scanner.byte(next) == Some(b';') {
        next + 1
    } else {
        end
    }
}

/// Entries of an object literal `{ key: value, ... }`.
///
/// Keys are unquoted; shorthand properties map to themselves. Returns `None` if
/// `text` is not a plain object literal (spreads and computed keys included).
pub fn object_entries(text: &str) -> Option<Vec<(String, String)>> {
    let text = text.trim();
    let scanner = Scanner::new(text);
    if scanner.byte(0) != Some(b'{') || scanner.find_closing(0) != Some(text.len() - 1) {
        return None;
    }

    let mut entries = Vec::new();
    for range in scanner.split_top_level(1..text.len() - 1, b',') {
        let entry = scanner.text(range.clone());
        let colon = range.clone().find(|&i| {
            scanner.byte(i) == Some(b':') && scanner.is_code(i) && depth_at(&scanner, range.start, i) == 0
        });

        let (key, value) = match colon {
            Some(colon) => (
                scanner.text(range.start..colon).trim(),
                scanner.text(colon + 1..range.end).trim(),
            ),
            None => (entry, entry),
        };

        let key = match string_literal(key) {
            Some(unquoted) => unquoted,
            None if key.bytes().all(is_ident_char) && !key.is_empty() => key.to_string(),
            None => return None,
        };
        entries.push((key, value.to_string()));
    }

    Some(entries)
}

fn depth_at(scanner: &Scanner<'_>, from: usize, at: usize) -> usize {
    let mut depth = 0usize;
    for i in from..at {
        if !scanner.is_code(i) {
            continue;
        }
        match scanner.byte(i) {
            Some(b'(' | b'[' | b'{') => depth += 1,
            Some(b')' | b']' | b'}') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chains(src: &str) -> Vec<Chain> {
        find_chains(&Scanner::new(src))
    }

    #[test]
    fn parses_simple_chain() {
        let src = "$('div.greeting').css('color', 'red').text('Hello');";
        let found = chains(src);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, 0..src.len());
        assert_eq!(found[0].selector(), "'div.greeting'");
        assert_eq!(found[0].methods(), vec!["css", "text"]);
        assert_eq!(found[0].calls[0].args, vec!["'color'", "'red'"]);
    }

    #[test]
    fn chain_continues_across_lines_and_comments() {
        let src = "jQuery('#a')\n  // style\n  .addClass('on')\n  .show()";
        let found = chains(src);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].methods(), vec!["addClass", "show"]);
        assert_eq!(found[0].span.end, src.len());
    }

    #[test]
    fn finds_nested_chains() {
        let src = "$('button').on('click', function () { $(this).text('x'); });";
        let found = chains(src);

        assert_eq!(found.len(), 2);
        assert_eq!(found[1].selector(), "this");
        assert!(found[1].span.start > found[0].span.start);
        assert!(found[1].span.end < found[0].span.end);
    }

    #[test]
    fn ignores_comments_strings_and_members() {
        let src = "// $('a').hide()\nvar s = \"$('b').hide()\"; obj.$('c'); my$('d');";
        assert!(chains(src).is_empty());
    }

    #[test]
    fn parses_utility_calls() {
        let src = "$.get('/api/users').done(function (data) { show(data); }).fail(report);";
        let calls = find_utility_calls(&Scanner::new(src));

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function, "get");
        assert_eq!(calls[0].args, vec!["'/api/users'"]);
        let names: Vec<&str> = calls[0].continuations.iter().map(|c| c.method.as_str()).collect();
        assert_eq!(names, vec!["done", "fail"]);
        assert_eq!(calls[0].span, 0..src.len());
    }

    #[test]
    fn reads_object_entries() {
        let entries = object_entries("{ color: 'red', 'font-size': size > 2 ? a : b, width }").unwrap();

        assert_eq!(
            entries,
            vec![
                ("color".to_string(), "'red'".to_string()),
                ("font-size".to_string(), "size > 2 ? a : b".to_string()),
                ("width".to_string(), "width".to_string()),
            ]
        );
        assert!(object_entries("{ ...rest }").is_none());
        assert!(object_entries("options").is_none());
    }
}
