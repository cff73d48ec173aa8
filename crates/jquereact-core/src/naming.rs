//! Identifier naming for generated bindings.

use std::collections::BTreeSet;

/// Names generated code must never declare.
const RESERVED: &[&str] = &[
    "React", "useState", "useEffect", "useRef", "axios", "fetch", "event", "document",
    "window", "element", "elements", "response", "result", "error", "style", "props",
    "delegateTarget", "containerRef", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "export", "extends", "finally", "for",
    "function", "if", "import", "in", "instanceof", "let", "new", "return", "super", "switch",
    "this", "throw", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Convert arbitrary text into a camelCase identifier.
///
/// Non-alphanumeric characters separate words; an empty result becomes `"element"`
/// and a leading digit gets an `el` prefix.
pub fn to_camel_case(text: &str) -> String {
    let pascal = to_pascal_case(text);
    let mut chars = pascal.chars();
    let camel = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
        None => return "element".to_string(),
    };

    if camel.starts_with(|c: char| c.is_ascii_digit()) {
        format!("el{}", camel)
    } else {
        camel
    }
}

/// Convert arbitrary text into a PascalCase word sequence.
pub fn to_pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Hands out unique identifiers within one generated component.
///
/// Allocation is deterministic: the same sequence of claims always yields the
/// same names.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    used: BTreeSet<String>,
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self {
            used: RESERVED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl NameAllocator {
    /// Create a new allocator with the reserved names taken.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base`, or `base2`, `base3`, ... if it is taken.
    pub fn claim(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "value" } else { base };
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Claim a `[value, setValue]` state pair derived from `base`.
    pub fn claim_state(&mut self, base: &str) -> (String, String) {
        loop {
            let value = self.claim(base);
            let setter = format!("set{}", to_pascal_case(&value));
            if self.used.insert(setter.clone()) {
                return (value, setter);
            }
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case() {
        assert_eq!(to_camel_case("main-nav"), "mainNav");
        assert_eq!(to_camel_case("submit_btn"), "submitBtn");
        assert_eq!(to_camel_case("Greeting"), "greeting");
        assert_eq!(to_camel_case("2col"), "el2col");
        assert_eq!(to_camel_case("--"), "element");
    }

    #[test]
    fn pascal_case() {
        assert_eq!(to_pascal_case("click"), "Click");
        assert_eq!(to_pascal_case("user-list item"), "UserListItem");
    }

    #[test]
    fn claims_unique_names() {
        let mut names = NameAllocator::new();

        assert_eq!(names.claim("handleClick"), "handleClick");
        assert_eq!(names.claim("handleClick"), "handleClick2");
        assert_eq!(names.claim("handleClick"), "handleClick3");
        assert_eq!(names.claim("event"), "event2");
    }

    #[test]
    fn claims_state_pairs() {
        let mut names = NameAllocator::new();

        assert_eq!(
            names.claim_state("greetingText"),
            ("greetingText".to_string(), "setGreetingText".to_string())
        );
        assert_eq!(
            names.claim_state("greetingText"),
            ("greetingText2".to_string(), "setGreetingText2".to_string())
        );
    }
}
