//! Discovery of source files from paths and glob patterns.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::BatchError;

/// Extensions picked up when walking directories.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "html", "htm"];

/// A discovered input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path to the file
    pub path: PathBuf,

    /// Directory the output layout is relative to
    pub root: PathBuf,
}

impl SourceFile {
    /// Directory of the file relative to its root.
    pub fn relative_dir(&self) -> PathBuf {
        self.path
            .strip_prefix(&self.root)
            .ok()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Locate a file under the first root that contains it, or its own directory.
    pub fn locate(path: &Path, roots: &[PathBuf]) -> Self {
        let root = roots
            .iter()
            .find(|root| path.starts_with(root))
            .cloned()
            .unwrap_or_else(|| path.parent().map(Path::to_path_buf).unwrap_or_default());
        Self {
            path: path.to_path_buf(),
            root,
        }
    }
}

/// Whether a path has a source extension (case-insensitive).
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

/// Whether any directory component of `path` is an excluded name.
pub fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| exclude.iter().any(|e| e == n)),
        _ => false,
    })
}

/// Resolve inputs into source files, sorted by path and deduplicated.
///
/// Each input is a directory (walked recursively), a file, or a glob pattern.
pub fn discover(inputs: &[String], exclude: &[String]) -> Result<Vec<SourceFile>, BatchError> {
    let mut found: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    for input in inputs {
        let path = Path::new(input);

        if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_excluded_name(e.file_name().to_str(), exclude))
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && is_source_file(entry.path()) {
                    found
                        .entry(entry.path().to_path_buf())
                        .or_insert_with(|| path.to_path_buf());
                }
            }
        } else if path.is_file() {
            let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
            found.entry(path.to_path_buf()).or_insert(root);
        } else {
            let entries = glob::glob(input).map_err(|e| BatchError::Pattern {
                pattern: input.clone(),
                message: e.to_string(),
            })?;
            let root = glob_base(input);

            let before = found.len();
            for entry in entries.filter_map(|e| e.ok()) {
                let relative = entry.strip_prefix(&root).unwrap_or(&entry);
                if entry.is_file() && !is_excluded(relative, exclude) {
                    found.entry(entry).or_insert_with(|| root.clone());
                }
            }
            if found.len() == before {
                tracing::warn!("No files matched {}", input);
            }
        }
    }

    Ok(found
        .into_iter()
        .map(|(path, root)| SourceFile { path, root })
        .collect())
}

fn is_excluded_name(name: Option<&str>, exclude: &[String]) -> bool {
    name.is_some_and(|n| exclude.iter().any(|e| e == n))
}

/// The literal directory prefix of a glob pattern.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[', '{']) {
            return base;
        }
        base.push(component);
    }
    // A pattern without wildcards names a file
    base.parent().map(Path::to_path_buf).unwrap_or_default()
}
