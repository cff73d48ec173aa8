//! Dispatch: decide how an input file is read and extract the code to transform.

use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use jquereact_markup::{MarkupDocument, MarkupError};
use regex::Regex;

use crate::scan::Scanner;

/// A call on a dollar-prefixed identifier (`$(...)`, `$.get(...)`, `$el.on(...)`)
/// or the `jQuery` token.
static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w$.])\$[\w$]*\s*(?:\.\s*[A-Za-z_$][\w$]*\s*)?\(|\bjQuery\b")
        .expect("Invalid jQuery signature regex")
});

/// Where the code of a source unit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// A whole script file
    Script,

    /// Inline `<script>` elements of a markup document
    EmbeddedScript,
}

/// One inline script inside an embedded source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSegment {
    /// Position among the document's inline scripts, in document order
    pub index: usize,

    /// Byte range of the script inside the unit's code
    pub range: Range<usize>,
}

/// Code extracted for one transformation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub code: String,

    /// Logical path, for naming and diagnostics
    pub path: String,

    pub kind: UnitKind,

    /// Inline scripts making up `code` (embedded units only)
    pub segments: Vec<ScriptSegment>,
}

impl SourceUnit {
    /// A unit covering a whole script file.
    pub fn script(code: &str, path: &str) -> Self {
        Self {
            code: code.to_string(),
            path: path.to_string(),
            kind: UnitKind::Script,
            segments: Vec::new(),
        }
    }

    /// Index of the inline script containing a byte offset.
    pub fn script_at(&self, offset: usize) -> Option<usize> {
        self.segments
            .iter()
            .find(|s| s.range.contains(&offset) || (s.range.is_empty() && s.range.start == offset))
            .map(|s| s.index)
    }
}

/// How a file is transformed.
pub enum Dispatched {
    /// The whole file is one script
    Script(SourceUnit),

    /// A markup document; `unit` holds its qualifying inline scripts, if any
    Markup {
        document: MarkupDocument,
        unit: Option<SourceUnit>,
    },
}

/// Whether a path is read as markup (`.html` / `.htm`, any case).
pub fn is_markup_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

/// Whether code shows jQuery usage outside comments and string literals.
pub fn has_jquery_signature(code: &str) -> bool {
    SIGNATURE_RE.is_match(&Scanner::new(code).code_only())
}

/// Route a file to the script or markup path.
pub fn dispatch(content: &str, path: &str) -> Result<Dispatched, MarkupError> {
    if !is_markup_path(path) {
        return Ok(Dispatched::Script(SourceUnit::script(content, path)));
    }

    let document = MarkupDocument::parse(content)?;
    let unit = embedded_unit(&document, path);
    Ok(Dispatched::Markup { document, unit })
}

/// Join the inline scripts with a jQuery signature, in document order.
fn embedded_unit(document: &MarkupDocument, path: &str) -> Option<SourceUnit> {
    let mut code = String::new();
    let mut segments = Vec::new();

    for (index, script) in document.inline_scripts().into_iter().enumerate() {
        let text = script.text.unwrap_or_default();
        if !has_jquery_signature(&text) {
            tracing::debug!("Skipping inline script #{} in {}: no jQuery usage", index + 1, path);
            continue;
        }

        if !code.is_empty() {
            code.push('\n');
        }
        let start = code.len();
        code.push_str(&text);
        segments.push(ScriptSegment {
            index,
            range: start..code.len(),
        });
    }

    if segments.is_empty() {
        return None;
    }

    Some(SourceUnit {
        code,
        path: path.to_string(),
        kind: UnitKind::EmbeddedScript,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_extension() {
        assert!(is_markup_path("page.html"));
        assert!(is_markup_path("legacy/INDEX.HTM"));
        assert!(!is_markup_path("app.jquery.js"));
        assert!(!is_markup_path("html"));
    }

    #[test]
    fn detects_signatures() {
        assert!(has_jquery_signature("$('#a').hide();"));
        assert!(has_jquery_signature("$ ('#a')"));
        assert!(has_jquery_signature("$.ajax({})"));
        assert!(has_jquery_signature("$el.on('click', go)"));
        assert!(has_jquery_signature("jQuery(document)"));
        assert!(has_jquery_signature("(function ($) {})(jQuery);"));
    }

    #[test]
    fn ignores_signatures_in_comments_and_strings() {
        assert!(!has_jquery_signature("// $('#a').hide()\nconsole.log('$(x)');"));
        assert!(!has_jquery_signature("const price = `$${amount}`;"));
        assert!(!has_jquery_signature("select(\"div.x\").setText(\"hi\")"));
        assert!(!has_jquery_signature("obj.$('x')"));
    }

    #[test]
    fn scripts_are_one_unit() {
        let Dispatched::Script(unit) = dispatch("$('a').hide();", "a.js").unwrap() else {
            panic!("expected script");
        };
        assert_eq!(unit.kind, UnitKind::Script);
        assert_eq!(unit.code, "$('a').hide();");
        assert_eq!(unit.script_at(0), None);
    }

    #[test]
    fn joins_qualifying_inline_scripts() {
        let html = "<script>$('a').hide();</script>\n<script>console.log(1);</script>\n<script src=\"x.js\"></script>\n<script>jQuery('b').show();</script>";

        let Dispatched::Markup { unit, .. } = dispatch(html, "page.html").unwrap() else {
            panic!("expected markup");
        };
        let unit = unit.unwrap();

        assert_eq!(unit.kind, UnitKind::EmbeddedScript);
        assert_eq!(unit.code, "$('a').hide();\njQuery('b').show();");
        assert_eq!(unit.segments.len(), 2);
        assert_eq!(unit.segments[0].index, 0);
        assert_eq!(unit.segments[1].index, 2);
        assert_eq!(unit.script_at(unit.code.find("jQuery").unwrap()), Some(2));
    }

    #[test]
    fn markup_without_jquery_has_no_unit() {
        let Dispatched::Markup { unit, .. } = dispatch("<p>hi</p><script>go()</script>", "p.htm").unwrap() else {
            panic!("expected markup");
        };
        assert!(unit.is_none());
    }
}
