//! Include/exclude filtering of changed paths.

use std::path::Path;

use glob::Pattern;

use crate::WatchError;

/// Default patterns for files converted in watch mode.
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.jquery.js", "**/*.jquery.html"];

/// Default patterns never converted in watch mode.
pub const DEFAULT_EXCLUDE: &[&str] = &["**/node_modules/**", "**/dist/**"];

/// Glob-based path filter.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl WatchFilter {
    /// Create a new filter from include and exclude patterns.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, WatchError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether a path (relative to a watched root) should be converted.
    ///
    /// An empty include list accepts everything not excluded.
    pub fn matches(&self, path: &Path) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches_path(path));
        included && !self.exclude.iter().any(|p| p.matches_path(path))
    }
}

impl Default for WatchFilter {
    fn default() -> Self {
        let include = DEFAULT_INCLUDE.iter().filter_map(|p| Pattern::new(p).ok()).collect();
        let exclude = DEFAULT_EXCLUDE.iter().filter_map(|p| Pattern::new(p).ok()).collect();
        Self { include, exclude }
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, WatchError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| WatchError::Pattern {
                pattern: p.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patterns() {
        let filter = WatchFilter::default();

        assert!(filter.matches(Path::new("src/widgets/menu.jquery.js")));
        assert!(filter.matches(Path::new("legacy/page.jquery.html")));
        assert!(!filter.matches(Path::new("src/widgets/menu.js")));
        assert!(!filter.matches(Path::new("src/node_modules/lib/x.jquery.js")));
        assert!(!filter.matches(Path::new("app/dist/out.jquery.js")));
    }

    #[test]
    fn custom_patterns() {
        let filter = WatchFilter::new(&["**/*.js".to_string()], &[]).unwrap();
        assert!(filter.matches(Path::new("a/b.js")));
        assert!(!filter.matches(Path::new("a/b.html")));
    }

    #[test]
    fn invalid_patterns_are_errors() {
        let err = WatchFilter::new(&["[".to_string()], &[]).unwrap_err();
        assert!(matches!(err, WatchError::Pattern { .. }));
    }
}
