//! Structural HTML-to-JSX conversion.
//!
//! Static markup is rewritten into JSX syntax: `class` and `for` (and other
//! DOM attribute casings) are renamed, scripts and styles are stripped, void
//! elements are self-closed and inline styles become style objects. Deep
//! structural translation is out of scope, so document conversion is bounded
//! to a fixed number of lines with an explicit elision marker.

use tree_sitter::Node;

use crate::document::{attributes, end_tag, open_tag, tag_name, MarkupDocument, MarkupError};

/// Number of lines kept by [`convert_document`] in the reference behavior.
pub const DEFAULT_MAX_LINES: usize = 5;

/// Marker line appended when converted markup was truncated.
pub const ELIDED_MARKER: &str = "{/* ... additional markup elided ... */}";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// SVG element names whose camelCase spelling JSX requires.
const SVG_CAMEL_TAGS: &[&str] = &[
    "animateMotion", "animateTransform", "clipPath", "feBlend", "feColorMatrix",
    "feComposite", "feDropShadow", "feFlood", "feGaussianBlur", "feMerge", "feMergeNode",
    "feOffset", "feTurbulence", "foreignObject", "linearGradient", "radialGradient",
    "textPath",
];

/// Convert a parsed document into bounded JSX markup.
///
/// When the document has a `<body>`, only its content is converted. The result
/// never exceeds `max_lines` lines plus one [`ELIDED_MARKER`] line.
pub fn convert_document(doc: &MarkupDocument, max_lines: usize) -> String {
    let jsx = convert_root(doc);
    bound_lines(&jsx, max_lines)
}

/// Convert an HTML fragment (e.g., an `.append('<li>..</li>')` argument) into JSX
/// without any line bound.
pub fn convert_fragment(html: &str) -> Result<String, MarkupError> {
    let doc = MarkupDocument::parse(html)?;
    let jsx = convert_root(&doc);
    Ok(dedent(&jsx))
}

fn convert_root(doc: &MarkupDocument) -> String {
    let root = doc.root();
    let mut emitter = Emitter::new(doc);

    if let Some(body) = find_element(doc, root, "body") {
        emitter.emit_content(body);
    } else if let Some(html) = find_element(doc, root, "html") {
        emitter.emit_content(html);
    } else {
        emitter.emit_content(root);
    }

    emitter.out
}

/// Keep at most `max_lines` non-blank lines, appending [`ELIDED_MARKER`] when truncated.
pub fn bound_lines(text: &str, max_lines: usize) -> String {
    let dedented = dedent(text);
    let lines: Vec<&str> = dedented.lines().filter(|l| !l.trim().is_empty()).collect();

    if lines.len() <= max_lines {
        return lines.join("\n");
    }

    let mut out = lines[..max_lines].join("\n");
    out.push('\n');
    out.push_str(ELIDED_MARKER);
    out
}

fn find_element<'t>(doc: &MarkupDocument, node: Node<'t>, tag: &str) -> Option<Node<'t>> {
    if node.kind() == "element" && tag_name(doc, node).eq_ignore_ascii_case(tag) {
        return Some(node);
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| find_element(doc, child, tag))
}

struct Emitter<'d> {
    doc: &'d MarkupDocument,
    out: String,
}

impl<'d> Emitter<'d> {
    fn new(doc: &'d MarkupDocument) -> Self {
        Self {
            doc,
            out: String::new(),
        }
    }

    /// Emit the children of a node, copying the whitespace between them.
    fn emit_content(&mut self, node: Node<'_>) {
        let source = self.doc.source();
        let mut cursor_pos = open_tag(node).map(|t| t.end_byte()).unwrap_or(node.start_byte());
        let content_end = end_tag(node).map(|t| t.start_byte()).unwrap_or(node.end_byte());

        let mut walker = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut walker).collect();

        for child in children {
            if matches!(child.kind(), "start_tag" | "end_tag" | "self_closing_tag") {
                continue;
            }
            if child.start_byte() > cursor_pos {
                let gap = &source[cursor_pos..child.start_byte()];
                if gap.trim().is_empty() {
                    self.out.push_str(gap);
                }
            }
            self.emit_node(child);
            cursor_pos = child.end_byte();
        }

        if content_end > cursor_pos {
            let gap = &source[cursor_pos..content_end];
            if gap.trim().is_empty() {
                self.out.push_str(gap);
            }
        }
    }

    fn emit_node(&mut self, node: Node<'_>) {
        match node.kind() {
            "doctype" | "script_element" | "style_element" | "erroneous_end_tag" => {}
            "comment" => {
                let raw = self.doc.text(node);
                let inner = raw
                    .trim_start_matches("<!--")
                    .trim_end_matches("-->")
                    .replace("*/", "*\\/");
                self.out.push_str("{/*");
                self.out.push_str(&inner);
                self.out.push_str("*/}");
            }
            "text" => {
                let text = self.doc.text(node);
                self.out.push_str(&escape_text(text));
            }
            "element" => self.emit_element(node),
            _ => {
                let text = self.doc.text(node);
                self.out.push_str(&escape_text(text));
            }
        }
    }

    fn emit_element(&mut self, node: Node<'_>) {
        let tag = jsx_tag_name(tag_name(self.doc, node));
        if tag.eq_ignore_ascii_case("head") {
            return;
        }

        let is_void = VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str());
        let self_closing = open_tag(node).is_some_and(|t| t.kind() == "self_closing_tag");

        self.out.push('<');
        self.out.push_str(&tag);
        for (name, value) in attributes(self.doc, node) {
            if let Some(attr) = convert_attribute(&name, value.as_deref()) {
                self.out.push(' ');
                self.out.push_str(&attr);
            }
        }

        if is_void || self_closing {
            self.out.push_str(" />");
            return;
        }

        self.out.push('>');
        self.emit_content(node);
        self.out.push_str("</");
        self.out.push_str(&tag);
        self.out.push('>');
    }
}

/// Convert one HTML attribute into its JSX form. Inline `on*` handlers are dropped.
fn convert_attribute(name: &str, value: Option<&str>) -> Option<String> {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("on") && lower.len() > 2 {
        return None;
    }

    let jsx_name = jsx_attribute_name(name);

    if lower == "style" {
        if let Some(style) = value.and_then(style_object) {
            return Some(format!("style={{{}}}", style));
        }
        return None;
    }

    match value {
        None => Some(jsx_name),
        Some(v) if !v.contains('"') => Some(format!("{}=\"{}\"", jsx_name, v)),
        Some(v) if !v.contains('\'') => Some(format!("{}='{}'", jsx_name, v)),
        Some(v) => Some(format!("{}={{'{}'}}", jsx_name, v.replace('\'', "\\'"))),
    }
}

/// JSX spelling of an HTML tag name.
///
/// A capitalized name would be a component reference in JSX, so HTML names are
/// lowercased; SVG names such as `linearGradient` keep their camelCase.
pub fn jsx_tag_name(tag: &str) -> String {
    if let Some(svg) = SVG_CAMEL_TAGS.iter().find(|t| t.eq_ignore_ascii_case(tag)) {
        return svg.to_string();
    }
    if tag.starts_with(|c: char| c.is_ascii_uppercase()) {
        return tag.to_ascii_lowercase();
    }
    tag.to_string()
}

/// Map an HTML attribute name to the DOM property casing used by JSX.
pub fn jsx_attribute_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let mapped = match lower.as_str() {
        "class" => Some("className"),
        "for" => Some("htmlFor"),
        "tabindex" => Some("tabIndex"),
        "readonly" => Some("readOnly"),
        "maxlength" => Some("maxLength"),
        "minlength" => Some("minLength"),
        "colspan" => Some("colSpan"),
        "rowspan" => Some("rowSpan"),
        "contenteditable" => Some("contentEditable"),
        "crossorigin" => Some("crossOrigin"),
        "accesskey" => Some("accessKey"),
        "autocomplete" => Some("autoComplete"),
        "autofocus" => Some("autoFocus"),
        "enctype" => Some("encType"),
        "novalidate" => Some("noValidate"),
        "spellcheck" => Some("spellCheck"),
        "srcset" => Some("srcSet"),
        "usemap" => Some("useMap"),
        "cellpadding" => Some("cellPadding"),
        "cellspacing" => Some("cellSpacing"),
        "frameborder" => Some("frameBorder"),
        "http-equiv" => Some("httpEquiv"),
        "accept-charset" => Some("acceptCharset"),
        "charset" => Some("charSet"),
        "datetime" => Some("dateTime"),
        _ => None,
    };
    if let Some(mapped) = mapped {
        return mapped.to_string();
    }

    if lower.starts_with("data-") || lower.starts_with("aria-") {
        lower
    } else if let Some(local) = lower
        .strip_prefix("xlink:")
        .map(|local| format!("xlink-{}", local))
        .or_else(|| lower.strip_prefix("xml:").map(|local| format!("xml-{}", local)))
    {
        // xlink:href -> xlinkHref
        css_property_key(&local)
    } else if lower.contains('-') {
        // SVG presentation attributes: stroke-width -> strokeWidth
        css_property_key(&lower)
    } else if !name.bytes().any(|b| b.is_ascii_lowercase()) {
        lower
    } else {
        name.to_string()
    }
}

/// Convert a CSS declaration list into a JSX style object literal.
///
/// `"color: red; font-size: 12px"` becomes `{ color: 'red', fontSize: '12px' }`.
pub fn style_object(css: &str) -> Option<String> {
    let entries: Vec<String> = split_declarations(css)
        .into_iter()
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some(format!(
                "{}: '{}'",
                css_property_key(key),
                value.replace('\\', "\\\\").replace('\'', "\\'")
            ))
        })
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(format!("{{ {} }}", entries.join(", ")))
    }
}

/// Split a declaration list on `;` outside parentheses and quotes, so values
/// such as `url(data:image/png;base64,...)` stay whole.
fn split_declarations(css: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in css.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&css[start..]);
    parts
}

/// React style key for a CSS property (`background-color` -> `backgroundColor`).
pub fn css_property_key(property: &str) -> String {
    if property.starts_with("--") {
        return format!("'{}'", property);
    }

    // Vendor prefixes keep a leading capital: -webkit-x -> WebkitX
    let mut out = String::new();
    let mut upper = false;
    for c in property.trim().chars() {
        if c == '-' {
            upper = true;
            continue;
        }
        if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape characters that JSX text cannot contain literally.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '{' => out.push_str("{'{'}"),
            '}' => out.push_str("{'}'}"),
            '>' => out.push_str("{'>'}"),
            _ => out.push(c),
        }
    }
    out
}

/// Remove leading/trailing blank lines and the common indentation.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(start), Some(end)) = (start, end) else {
        return String::new();
    };

    let lines = &lines[start..=end];
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| if l.len() >= indent { &l[indent..] } else { l.trim_start() })
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}
