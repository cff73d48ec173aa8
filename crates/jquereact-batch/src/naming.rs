//! Component names derived from file names.

use std::path::Path;

/// Component name for a source file.
///
/// The stem loses a trailing `.jquery`, is split on `-`, `_` and `.`, and each
/// part is capitalized: `user-profile.jquery.js` becomes `UserProfile`.
/// A name starting with a digit gets a `Component` prefix.
pub fn component_name(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let stem = stem.strip_suffix(".jquery").unwrap_or(stem);

    let name: String = stem
        .split(['-', '_', '.'])
        .map(capitalize)
        .collect::<String>()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '$')
        .collect();

    if name.is_empty() {
        "Component".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Component{}", name)
    } else {
        name
    }
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_from_stems() {
        assert_eq!(component_name(Path::new("src/user-profile.jquery.js")), "UserProfile");
        assert_eq!(component_name(Path::new("todo_list.js")), "TodoList");
        assert_eq!(component_name(Path::new("legacy/nav.menu.html")), "NavMenu");
        assert_eq!(component_name(Path::new("example.jquery.js")), "Example");
        assert_eq!(component_name(Path::new("camelCase.js")), "CamelCase");
    }

    #[test]
    fn leading_digits_get_a_prefix() {
        assert_eq!(component_name(Path::new("404-page.html")), "Component404Page");
    }

    #[test]
    fn empty_stems_get_a_default() {
        assert_eq!(component_name(Path::new(".jquery.js")), "Component");
        assert_eq!(component_name(Path::new("my page!.js")), "Mypage");
    }
}
