//! Syntax validation of generated components.

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Parse `source` as a JSX module. Returns the parser's messages on failure.
pub fn check_syntax(source: &str) -> Result<(), Vec<String>> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path("component.jsx").unwrap_or_default();

    let ret = Parser::new(&allocator, source, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let mut messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        if messages.is_empty() {
            messages.push("parser aborted".to_string());
        }
        return Err(messages);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_components() {
        let source = "import React from 'react';\n\nfunction A() {\n  return <div className=\"a\">{'x'}</div>;\n}\n\nexport default A;\n";
        assert!(check_syntax(source).is_ok());
    }

    #[test]
    fn rejects_unclosed_elements() {
        let source = "function A() {\n  return (\n    <div>\n      <p>hi</p>\n  );\n}\n";
        let errors = check_syntax(source).unwrap_err();
        assert!(!errors.is_empty());
    }
}
