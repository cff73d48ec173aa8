//! Lexical classification of script source.
//!
//! Every byte is classified as code, comment, or literal (string, template or
//! regex). Detectors only look at code bytes, so jQuery text that appears in a
//! comment or a string is never treated as a call.

use std::ops::Range;

/// Lexical class of a source byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    Code,
    Comment,
    Literal,
}

/// A classified view over a script.
#[derive(Debug, Clone)]
pub struct Scanner<'s> {
    source: &'s str,
    classes: Vec<ByteClass>,
}

impl<'s> Scanner<'s> {
    /// Classify a script.
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            classes: classify(source.as_bytes()),
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn byte(&self, i: usize) -> Option<u8> {
        self.source.as_bytes().get(i).copied()
    }

    pub fn class(&self, i: usize) -> ByteClass {
        self.classes.get(i).copied().unwrap_or(ByteClass::Code)
    }

    pub fn is_code(&self, i: usize) -> bool {
        i < self.len() && self.classes[i] == ByteClass::Code
    }

    /// Source text of a byte range.
    pub fn text(&self, range: Range<usize>) -> &'s str {
        &self.source[range]
    }

    /// The script with every comment and literal byte blanked out.
    ///
    /// Newlines are preserved so line structure survives.
    pub fn code_only(&self) -> String {
        self.source
            .char_indices()
            .map(|(i, c)| {
                if self.classes[i] == ByteClass::Code || c == '\n' {
                    c
                } else {
                    ' '
                }
            })
            .collect()
    }

    /// Skip whitespace and comments starting at `from`.
    pub fn skip_trivia(&self, from: usize) -> usize {
        let bytes = self.source.as_bytes();
        let mut i = from;
        while i < bytes.len()
            && (bytes[i].is_ascii_whitespace() || self.classes[i] == ByteClass::Comment)
        {
            i += 1;
        }
        i
    }

    /// Read an identifier starting exactly at `at`.
    pub fn identifier_at(&self, at: usize) -> Option<Range<usize>> {
        let bytes = self.source.as_bytes();
        if at >= bytes.len() || !self.is_code(at) || !is_ident_start(bytes[at]) {
            return None;
        }
        let mut end = at + 1;
        while end < bytes.len() && is_ident_char(bytes[end]) {
            end += 1;
        }
        Some(at..end)
    }

    /// Find the bracket closing the one at `open`.
    ///
    /// Only code bytes count, so brackets inside strings and comments are ignored.
    pub fn find_closing(&self, open: usize) -> Option<usize> {
        let bytes = self.source.as_bytes();
        if !self.is_code(open) || closer(bytes[open]).is_none() {
            return None;
        }

        let mut stack = Vec::new();
        for i in open..bytes.len() {
            if self.classes[i] != ByteClass::Code {
                continue;
            }
            let b = bytes[i];
            if let Some(close) = closer(b) {
                stack.push(close);
            } else if matches!(b, b')' | b']' | b'}') {
                if stack.last() == Some(&b) {
                    stack.pop();
                    if stack.is_empty() {
                        return Some(i);
                    }
                } else {
                    return None;
                }
            }
        }
        None
    }

    /// Split a range at top-level occurrences of `separator`.
    ///
    /// Pieces are trimmed of surrounding whitespace; an empty trailing piece
    /// (trailing comma) is dropped.
    pub fn split_top_level(&self, range: Range<usize>, separator: u8) -> Vec<Range<usize>> {
        let bytes = self.source.as_bytes();
        let mut pieces = Vec::new();
        let mut depth = 0usize;
        let mut start = range.start;

        for i in range.clone() {
            if self.classes[i] != ByteClass::Code {
                continue;
            }
            match bytes[i] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b if b == separator && depth == 0 => {
                    pieces.push(self.trim(start..i));
                    start = i + 1;
                }
                _ => {}
            }
        }

        let last = self.trim(start..range.end);
        if !last.is_empty() {
            pieces.push(last);
        }
        pieces
    }

    /// Narrow a range to exclude surrounding whitespace.
    pub fn trim(&self, range: Range<usize>) -> Range<usize> {
        let bytes = self.source.as_bytes();
        let mut start = range.start;
        let mut end = range.end;
        while start < end && bytes[start].is_ascii_whitespace() {
            start += 1;
        }
        while end > start && bytes[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        start..end
    }

    /// Byte offsets of every code occurrence of the keyword `word`.
    pub fn keyword_positions(&self, word: &str) -> Vec<usize> {
        let bytes = self.source.as_bytes();
        self.source
            .match_indices(word)
            .map(|(i, _)| i)
            .filter(|&i| self.is_code(i))
            .filter(|&i| i == 0 || !(is_ident_char(bytes[i - 1]) || bytes[i - 1] == b'.'))
            .filter(|&i| bytes.get(i + word.len()).is_none_or(|b| !is_ident_char(*b)))
            .collect()
    }
}

pub fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

pub fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn closer(open: u8) -> Option<u8> {
    match open {
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        _ => None,
    }
}

/// Whether a `/` after this byte starts a regex literal rather than a division.
fn regex_allowed(previous: Option<u8>) -> bool {
    match previous {
        None => true,
        Some(b) => b"(,=:[!&|?{};+-*%<>~^".contains(&b),
    }
}

fn classify(bytes: &[u8]) -> Vec<ByteClass> {
    let mut classes = vec![ByteClass::Code; bytes.len()];
    let mut previous: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        let end = match (b, next) {
            (b'/', Some(b'/')) => {
                let end = bytes[i..]
                    .iter()
                    .position(|&c| c == b'\n')
                    .map_or(bytes.len(), |p| i + p);
                mark(&mut classes, i..end, ByteClass::Comment);
                end
            }
            (b'/', Some(b'*')) => {
                let end = find_subslice(bytes, i + 2, b"*/").map_or(bytes.len(), |p| p + 2);
                mark(&mut classes, i..end, ByteClass::Comment);
                end
            }
            (b'\'' | b'"', _) => {
                let end = scan_quoted(bytes, i);
                mark(&mut classes, i..end, ByteClass::Literal);
                previous = Some(b);
                end
            }
            (b'`', _) => {
                let end = scan_template(bytes, i);
                mark(&mut classes, i..end, ByteClass::Literal);
                previous = Some(b);
                end
            }
            (b'/', _) if regex_allowed(previous) => match scan_regex(bytes, i) {
                Some(end) => {
                    mark(&mut classes, i..end, ByteClass::Literal);
                    previous = Some(b'/');
                    end
                }
                None => {
                    previous = Some(b);
                    i + 1
                }
            },
            _ => {
                if !b.is_ascii_whitespace() {
                    previous = Some(b);
                }
                i + 1
            }
        };

        i = end.max(i + 1);
    }

    classes
}

fn mark(classes: &mut [ByteClass], range: Range<usize>, class: ByteClass) {
    for c in &mut classes[range] {
        *c = class;
    }
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

/// End (exclusive) of a quoted string starting at `start`. Unterminated strings end at the newline.
fn scan_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// End (exclusive) of a template literal, including nested `${...}` expressions.
fn scan_template(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' if depth == 0 => return i + 1,
            b'`' => i = scan_template(bytes, i),
            b'$' if depth == 0 && bytes.get(i + 1) == Some(&b'{') => {
                depth = 1;
                i += 2;
            }
            b'{' if depth > 0 => {
                depth += 1;
                i += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                i += 1;
            }
            b'\'' | b'"' if depth > 0 => i = scan_quoted(bytes, i),
            _ => i += 1,
        }
    }
    bytes.len()
}

/// End (exclusive) of a regex literal, or `None` when the slash is a division.
fn scan_regex(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let mut in_class = false;
    if bytes.get(i).is_none_or(|&b| b == b'/' || b == b'*' || b == b'\n') {
        return None;
    }
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return None,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Some(i);
            }
            _ => i += 1,
        }
    }
    None
}

/// Value of a single JavaScript string literal, or `None` if `text` is anything else.
///
/// Template literals qualify only when they contain no substitutions.
pub fn string_literal(text: &str) -> Option<String> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let quote = *bytes.first()?;
    if !matches!(quote, b'\'' | b'"' | b'`') || bytes.len() < 2 {
        return None;
    }

    let mut value = String::new();
    let mut chars = text[1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, other)) => value.push(other),
                None => return None,
            },
            '$' if quote == b'`' && text[1 + i..].starts_with("${") => return None,
            c if c as u32 == quote as u32 => {
                return if 1 + i + 1 == text.len() {
                    Some(value)
                } else {
                    None
                };
            }
            c => value.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_comments_and_strings() {
        let src = "a('$(x)') // $(y)\n/* $(z) */ b";
        let scanner = Scanner::new(src);

        assert!(scanner.is_code(0));
        assert_eq!(scanner.class(3), ByteClass::Literal);
        assert_eq!(scanner.class(src.find("// ").unwrap()), ByteClass::Comment);
        assert_eq!(scanner.class(src.find("$(z)").unwrap()), ByteClass::Comment);
        assert!(scanner.is_code(src.len() - 1));
    }

    #[test]
    fn masks_non_code() {
        let scanner = Scanner::new("x = '$(a)'; // $(b)\ny()");

        let code = scanner.code_only();
        assert!(!code.contains('$'));
        assert!(code.contains("y()"));
        assert_eq!(code.len(), scanner.len());
    }

    #[test]
    fn distinguishes_regex_from_division() {
        let src = "var r = /\\)/g; var d = a / b; f(')')";
        let scanner = Scanner::new(src);

        let open = src.rfind("f(").unwrap() + 1;
        assert_eq!(scanner.find_closing(open), Some(src.len() - 1));
        assert!(scanner.is_code(src.find("/ b").unwrap()));
    }

    #[test]
    fn template_literals_are_literal() {
        let src = "`a ${ $(x) } b` + c";
        let scanner = Scanner::new(src);

        assert_eq!(scanner.class(src.find("$(x)").unwrap()), ByteClass::Literal);
        assert!(scanner.is_code(src.len() - 1));
    }

    #[test]
    fn finds_matching_brackets() {
        let src = "f(a, [1, 2], { k: ')' }, g(h))";
        let scanner = Scanner::new(src);

        assert_eq!(scanner.find_closing(1), Some(src.len() - 1));
        assert_eq!(scanner.find_closing(0), None);
    }

    #[test]
    fn splits_top_level_arguments() {
        let src = "f('a,b', { x: 1, y: 2 }, function (p, q) {},)";
        let scanner = Scanner::new(src);
        let close = scanner.find_closing(1).unwrap();

        let args: Vec<&str> = scanner
            .split_top_level(2..close, b',')
            .into_iter()
            .map(|r| scanner.text(r))
            .collect();

        assert_eq!(args, vec!["'a,b'", "{ x: 1, y: 2 }", "function (p, q) {}"]);
    }

    #[test]
    fn finds_keywords_in_code_only() {
        let src = "this.x; that; 'this'; a.this; (this)";
        let scanner = Scanner::new(src);

        assert_eq!(scanner.keyword_positions("this"), vec![0, src.rfind("this").unwrap()]);
    }

    #[test]
    fn reads_string_literals() {
        assert_eq!(string_literal("'div.x'"), Some("div.x".to_string()));
        assert_eq!(string_literal("\"it\\'s\""), Some("it's".to_string()));
        assert_eq!(string_literal("`plain`"), Some("plain".to_string()));
        assert_eq!(string_literal("`a${b}`"), None);
        assert_eq!(string_literal("'a' + 'b'"), None);
        assert_eq!(string_literal("sel"), None);
    }
}
