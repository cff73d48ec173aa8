//! Scaffold/fallback builder.
//!
//! Produces a minimal component that always parses, embedding the start of
//! the original source in a comment for manual follow-up. Only string
//! concatenation happens here; nothing in this module can fail.

use std::fmt;

/// Characters of original source embedded in generated comments.
pub const EXCERPT_CHARS: usize = 300;

/// Why the fallback scaffold was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No jQuery signature in the input
    NoJQueryUsage,

    /// jQuery was present but nothing usable was generated
    NoUsableOutput,

    /// The transformation failed; carries the error message
    Exception(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoJQueryUsage => write!(f, "no jQuery usage detected"),
            Self::NoUsableOutput => write!(f, "detection/generation produced no usable output"),
            Self::Exception(message) => {
                write!(f, "an exception occurred during transformation: {}", message)
            }
        }
    }
}

/// The first [`EXCERPT_CHARS`] characters of `source`, safe to place in a block comment.
///
/// A truncated excerpt ends with `...`.
pub fn excerpt(source: &str) -> String {
    let mut text: String = source.chars().take(EXCERPT_CHARS).collect();
    if source.chars().nth(EXCERPT_CHARS).is_some() {
        text.push_str("...");
    }
    text.replace("*/", "*\\/")
}

/// Build the fallback component.
pub fn fallback(name: &str, source: &str, reason: &FallbackReason) -> String {
    // Reason text is kept on one comment line
    let reason = reason.to_string().replace(['\r', '\n'], " ");

    let mut out = String::new();
    out.push_str("import React from 'react';\n\n");
    out.push_str(&format!("// {}\n", reason));
    out.push_str("// Original source:\n");
    out.push_str(&format!("/*\n{}\n*/\n\n", excerpt(source)));
    out.push_str(&format!("function {}() {{\n", name));
    out.push_str("  return (\n");
    out.push_str("    <div className=\"jquereact-component\">\n");
    out.push_str("      <p>{'Component converted from jQuery'}</p>\n");
    out.push_str("    </div>\n");
    out.push_str("  );\n");
    out.push_str("}\n\n");
    out.push_str(&format!("export default {};\n", name));
    out
}
