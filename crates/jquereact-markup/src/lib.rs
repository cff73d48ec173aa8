//! HTML parsing and structural HTML-to-JSX conversion.
//!
//! This crate wraps the tree-sitter HTML grammar behind a small document API
//! (elements by tag name and attributes) and converts static markup into JSX
//! for the generated components.

pub mod document;
pub mod jsx;

pub use document::{check_grammar, Element, MarkupDocument, MarkupError};
pub use jsx::{
    bound_lines, convert_document, convert_fragment, css_property_key, dedent, jsx_attribute_name,
    jsx_tag_name, style_object, DEFAULT_MAX_LINES, ELIDED_MARKER,
};
