//! Indentation helpers for generated source.

use jquereact_markup::dedent;

/// Indent every non-empty line by `spaces`.
pub fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap statements in a braced block, re-indented by two spaces.
pub fn block(statements: &str) -> String {
    let body = dedent(statements);
    if body.is_empty() {
        "{}".to_string()
    } else {
        format!("{{\n{}\n}}", indent(&body, 2))
    }
}

/// Text between the outer braces of a `{ ... }` block.
pub fn block_inner(block: &str) -> &str {
    let trimmed = block.trim();
    trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed)
}

/// Re-indent a block whose first line is already positioned by the caller.
///
/// Continuation lines keep their indentation relative to the least indented
/// of them.
pub fn hanging(text: &str) -> String {
    let mut lines = text.lines();
    let Some(first) = lines.next() else {
        return String::new();
    };
    let rest: Vec<&str> = lines.collect();
    if rest.is_empty() {
        return first.trim().to_string();
    }

    let min = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let last_closes = rest.last().is_some_and(|l| l.trim_start().starts_with(['}', ')', ']']));
    let base = if last_closes {
        rest.last().map_or(min, |l| l.len() - l.trim_start().len()).min(min)
    } else {
        min
    };

    let mut out = vec![first.trim().to_string()];
    out.extend(rest.iter().map(|l| {
        if l.trim().is_empty() {
            String::new()
        } else if l.len() >= base {
            l[base..].trim_end().to_string()
        } else {
            l.trim().to_string()
        }
    }));
    out.join("\n")
}
