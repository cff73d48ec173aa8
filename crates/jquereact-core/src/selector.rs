//! Mapping jQuery selectors to the elements a component renders.

use std::sync::LazyLock;

use regex::Regex;

use crate::naming::to_camel_case;
use crate::scan::string_literal;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:([A-Za-z][\w-]*)|\*)").expect("Invalid tag regex"));

static PART_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"#([\w-]+)|\.([\w-]+)|\[\s*([\w-]+)\s*(?:([~|^$*]?=)\s*(?:"([^"]*)"|'([^']*)'|([^\]\s]*)))?\s*\]|:{1,2}([\w-]+)(?:\([^)]*\))?"#,
    )
    .expect("Invalid selector part regex")
});

/// A statically known element described by a selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementTarget {
    /// Tag name; `div` when the selector names none
    pub tag: String,

    pub id: Option<String>,
    pub classes: Vec<String>,

    /// Attribute selectors; `[disabled]` carries `None`
    pub attributes: Vec<(String, Option<String>)>,

    /// False when the selector had parts that a single element cannot express
    /// (descendant combinators, pseudo-classes, selector lists, ...)
    pub exact: bool,

    /// Selector as written
    pub selector: String,
}

impl ElementTarget {
    /// Word used to name bindings for this element.
    pub fn stem(&self) -> String {
        let word = self
            .id
            .as_deref()
            .or(self.classes.first().map(String::as_str))
            .or(self.attributes.iter().find_map(|(_, v)| v.as_deref()))
            .unwrap_or(&self.tag);
        to_camel_case(word)
    }
}

/// Browser globals that can be targeted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalTarget {
    Document,
    Window,
}

impl GlobalTarget {
    pub fn expression(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Window => "window",
        }
    }
}

/// What a `$(...)` root refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A literal selector describing one element
    Element(ElementTarget),

    /// `$(document)` or `$(window)`
    Global(GlobalTarget),

    /// A selector computed at runtime (`$(sel)`)
    Expression(String),
}

impl Target {
    /// Word used to name bindings for this target.
    pub fn stem(&self) -> String {
        match self {
            Self::Element(el) => el.stem(),
            Self::Global(global) => global.expression().to_string(),
            Self::Expression(expr) => to_camel_case(expr),
        }
    }
}

/// Resolve the argument of `$(...)`.
///
/// Returns `None` for roots no rule can translate: `this`, element creation
/// from HTML (`$('<li>')`), functions, and empty selectors.
pub fn resolve(root_arg: &str) -> Option<Target> {
    let arg = root_arg.trim();
    match arg {
        "" | "this" => return None,
        "document" => return Some(Target::Global(GlobalTarget::Document)),
        "window" => return Some(Target::Global(GlobalTarget::Window)),
        _ => {}
    }

    if arg.starts_with("function") || arg.contains("=>") {
        return None;
    }

    match string_literal(arg) {
        Some(selector) => parse_selector(&selector).map(Target::Element),
        None if arg.starts_with(['\'', '"', '`']) => None,
        None => Some(Target::Expression(arg.to_string())),
    }
}

/// Parse a CSS selector into the element its last compound selector describes.
pub fn parse_selector(selector: &str) -> Option<ElementTarget> {
    let selector = selector.trim();
    if selector.is_empty() || selector.starts_with('<') {
        return None;
    }

    let first = selector.split(',').next().unwrap_or("").trim();
    let compounds = split_compounds(first);
    let last = compounds.last()?;

    let mut target = ElementTarget {
        tag: "div".to_string(),
        id: None,
        classes: Vec::new(),
        attributes: Vec::new(),
        exact: compounds.len() == 1 && !selector.contains(','),
        selector: selector.to_string(),
    };

    let mut consumed = 0;
    if let Some(caps) = TAG_RE.captures(last) {
        if let Some(tag) = caps.get(1) {
            target.tag = tag.as_str().to_ascii_lowercase();
        }
        consumed = caps.get(0).map_or(0, |m| m.end());
    }

    for caps in PART_RE.captures_iter(&last[consumed..]) {
        if let Some(id) = caps.get(1) {
            target.id = Some(id.as_str().to_string());
        } else if let Some(class) = caps.get(2) {
            target.classes.push(class.as_str().to_string());
        } else if let Some(name) = caps.get(3) {
            let value = caps
                .get(5)
                .or(caps.get(6))
                .or(caps.get(7))
                .map(|m| m.as_str().to_string());
            match caps.get(4).map(|m| m.as_str()) {
                None => target.attributes.push((name.as_str().to_string(), None)),
                Some("=") => target.attributes.push((name.as_str().to_string(), value)),
                Some(_) => target.exact = false,
            }
        } else if caps.get(8).is_some() {
            target.exact = false;
        }
    }

    let covered: usize = PART_RE
        .find_iter(&last[consumed..])
        .map(|m| m.len())
        .sum();
    if consumed + covered != last.len() {
        target.exact = false;
    }

    Some(target)
}

/// Split a complex selector at combinators, outside brackets and parentheses.
fn split_compounds(selector: &str) -> Vec<String> {
    let mut compounds = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in selector.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '[' | '(') => {
                depth += 1;
                current.push(c);
            }
            (None, ']' | ')') => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            (None, c) if depth == 0 && (c.is_whitespace() || matches!(c, '>' | '+' | '~')) => {
                if !current.is_empty() {
                    compounds.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        compounds.push(current);
    }

    compounds
}
