//! Markup document parsing.

use std::ops::Range;

use tree_sitter::{Language, Node, Parser, Tree};

/// A parsed HTML document.
pub struct MarkupDocument {
    source: String,
    tree: Tree,
}

/// An element found in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Lowercased tag name (e.g., "script")
    pub tag: String,

    /// Attributes in source order; valueless attributes carry `None`
    pub attributes: Vec<(String, Option<String>)>,

    /// Raw text content of `<script>` and `<style>` elements
    pub text: Option<String>,

    /// Byte range of the whole element in the document
    pub range: Range<usize>,
}

impl Element {
    /// Look up an attribute value by name (case-insensitive).
    ///
    /// Valueless attributes return an empty string.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    /// Check whether an attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// Errors that can occur while parsing markup.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("HTML grammar could not be loaded: {0}")]
    Language(String),

    #[error("Failed to parse markup: {0}")]
    Parse(String),
}

fn html_language() -> Language {
    tree_sitter_html::LANGUAGE.into()
}

fn new_parser() -> Result<Parser, MarkupError> {
    let mut parser = Parser::new();
    parser
        .set_language(&html_language())
        .map_err(|e| MarkupError::Language(e.to_string()))?;
    Ok(parser)
}

/// Verify that the HTML grammar is usable with the linked tree-sitter runtime.
pub fn check_grammar() -> Result<(), MarkupError> {
    new_parser().map(|_| ())
}

impl MarkupDocument {
    /// Parse an HTML document.
    pub fn parse(source: &str) -> Result<Self, MarkupError> {
        let mut parser = new_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| MarkupError::Parse("parser produced no syntax tree".to_string()))?;

        if tree.root_node().has_error() {
            tracing::debug!("Markup contains recoverable syntax errors");
        }

        Ok(Self {
            source: source.to_string(),
            tree,
        })
    }

    /// The original markup text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub(crate) fn text(&self, node: Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }

    /// All elements with the given tag name, in document order.
    pub fn elements(&self, tag: &str) -> Vec<Element> {
        let mut found = Vec::new();
        self.collect(self.root(), tag, &mut found);
        found
    }

    /// Inline `<script>` elements (no `src` attribute), in document order.
    pub fn inline_scripts(&self) -> Vec<Element> {
        self.elements("script")
            .into_iter()
            .filter(|el| !el.has_attribute("src"))
            .collect()
    }

    fn collect(&self, node: Node<'_>, tag: &str, found: &mut Vec<Element>) {
        if is_element(node) && tag_name(self, node).eq_ignore_ascii_case(tag) {
            found.push(self.element(node));
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect(child, tag, found);
        }
    }

    fn element(&self, node: Node<'_>) -> Element {
        let text = if matches!(node.kind(), "script_element" | "style_element") {
            let mut cursor = node.walk();
            let raw = node
                .children(&mut cursor)
                .find(|c| c.kind() == "raw_text")
                .map(|c| self.text(c).to_string());
            Some(raw.unwrap_or_default())
        } else {
            None
        };

        Element {
            tag: tag_name(self, node).to_ascii_lowercase(),
            attributes: attributes(self, node),
            text,
            range: node.byte_range(),
        }
    }
}

/// Whether a node is any kind of element.
pub(crate) fn is_element(node: Node<'_>) -> bool {
    matches!(node.kind(), "element" | "script_element" | "style_element")
}

/// The opening tag (`start_tag` or `self_closing_tag`) of an element.
pub(crate) fn open_tag(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find(|c| matches!(c.kind(), "start_tag" | "self_closing_tag"));
    found
}

/// The closing tag of an element, if it has one.
pub(crate) fn end_tag(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == "end_tag");
    found
}

/// Tag name of an element as written.
pub(crate) fn tag_name<'d>(doc: &'d MarkupDocument, node: Node<'_>) -> &'d str {
    let Some(tag) = open_tag(node) else {
        return "";
    };
    let mut cursor = tag.walk();
    let name = tag
        .children(&mut cursor)
        .find(|c| c.kind() == "tag_name")
        .map(|c| doc.text(c))
        .unwrap_or("");
    name
}

/// Attribute nodes of an element's opening tag, as name/value pairs.
pub(crate) fn attributes(doc: &MarkupDocument, node: Node<'_>) -> Vec<(String, Option<String>)> {
    let Some(tag) = open_tag(node) else {
        return Vec::new();
    };

    let mut attrs = Vec::new();
    let mut cursor = tag.walk();
    for attr in tag.children(&mut cursor).filter(|c| c.kind() == "attribute") {
        let mut name = None;
        let mut value = None;

        let mut inner = attr.walk();
        for part in attr.children(&mut inner) {
            match part.kind() {
                "attribute_name" => name = Some(doc.text(part).to_string()),
                "attribute_value" => value = Some(doc.text(part).to_string()),
                "quoted_attribute_value" => {
                    let raw = doc.text(part);
                    value = Some(raw.trim_matches(|c| c == '"' || c == '\'').to_string());
                }
                _ => {}
            }
        }

        if let Some(name) = name {
            attrs.push((name, value));
        }
    }

    attrs
}
