//! Watch session: converts changed files again as they are saved.

use std::path::{Path, PathBuf};

use jquereact_batch::{BatchRunner, FileReport, SourceFile};

use crate::filter::{WatchFilter, DEFAULT_EXCLUDE, DEFAULT_INCLUDE};
use crate::watcher::{FileWatcher, WatchEvent};
use crate::WatchError;

/// Configuration for watch mode.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Directories to watch
    pub roots: Vec<PathBuf>,

    /// Glob patterns a changed file must match
    pub include: Vec<String>,

    /// Glob patterns that are never converted
    pub exclude: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from("src")],
            include: DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect(),
            exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Re-runs the batch pipeline for each changed file.
pub struct WatchSession {
    roots: Vec<PathBuf>,
    filter: WatchFilter,
    runner: BatchRunner,
}

impl WatchSession {
    /// Create a new watch session.
    pub fn new(config: WatchConfig, runner: BatchRunner) -> Result<Self, WatchError> {
        let filter = WatchFilter::new(&config.include, &config.exclude)?;
        // Watcher events carry absolute paths
        let roots = config
            .roots
            .iter()
            .map(|root| std::fs::canonicalize(root).unwrap_or_else(|_| root.clone()))
            .collect();

        Ok(Self {
            roots,
            filter,
            runner,
        })
    }

    /// Handle one watcher event. Returns the conversion report when a file was converted.
    pub fn handle(&self, event: &WatchEvent) -> Option<FileReport> {
        match event {
            WatchEvent::Removed(path) => {
                if self.accepts(path) {
                    tracing::info!("Removed {}; its generated component was kept", path.display());
                }
                None
            }
            WatchEvent::Changed(path) => {
                if !self.accepts(path) || !path.is_file() {
                    return None;
                }

                let file = SourceFile::locate(path, &self.roots);
                let report = self.runner.run_file(&file);
                match (&report.output, report.succeeded()) {
                    (Some(output), true) => {
                        tracing::info!("Converted {} -> {}", path.display(), output.display())
                    }
                    _ => tracing::warn!(
                        "Failed to convert {}: {}",
                        path.display(),
                        report.message.as_deref().unwrap_or("unknown error")
                    ),
                }
                Some(report)
            }
        }
    }

    /// Watch until the event stream ends or Ctrl+C is pressed.
    pub async fn run(&self) -> Result<(), WatchError> {
        let (_watcher, mut rx) = FileWatcher::new(&self.roots)?;
        tracing::info!("Watching for changes (Ctrl+C to stop)...");

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => {
                        self.handle(&event);
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Stopping watch mode");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Whether a path passes the filter, relative to the root containing it.
    fn accepts(&self, path: &Path) -> bool {
        let relative = self
            .roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        self.filter.matches(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use jquereact_batch::{BatchConfig, FileStatus};
    use jquereact_core::{PatternRegistry, Transpiler};
    use tempfile::tempdir;

    fn session(root: &Path, out: &Path) -> WatchSession {
        let runner = BatchRunner::new(
            BatchConfig {
                output_dir: out.to_path_buf(),
                ..Default::default()
            },
            Arc::new(Transpiler::new(PatternRegistry::standard())),
        );
        let config = WatchConfig {
            roots: vec![root.to_path_buf()],
            ..Default::default()
        };
        WatchSession::new(config, runner).unwrap()
    }

    #[test]
    fn converts_matching_changes() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("src");
        let out = temp.path().join("out");
        fs::create_dir_all(root.join("widgets")).unwrap();
        let file = root.join("widgets/menu.jquery.js");
        fs::write(&file, "$('#menu').addClass('open');").unwrap();

        let session = session(&root, &out);
        let canonical = fs::canonicalize(&file).unwrap();
        let report = session.handle(&WatchEvent::Changed(canonical)).unwrap();

        assert_eq!(report.status, FileStatus::Transformed);
        assert!(out.join("widgets/Menu.tsx").exists());
    }

    #[test]
    fn ignores_unmatched_and_removed_files() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("src");
        let out = temp.path().join("out");
        fs::create_dir_all(root.join("node_modules")).unwrap();
        fs::write(root.join("plain.js"), "$('#a').hide();").unwrap();
        fs::write(root.join("node_modules/lib.jquery.js"), "$('#a').hide();").unwrap();

        let session = session(&root, &out);
        let root = fs::canonicalize(&root).unwrap();

        assert!(session.handle(&WatchEvent::Changed(root.join("plain.js"))).is_none());
        assert!(session
            .handle(&WatchEvent::Changed(root.join("node_modules/lib.jquery.js")))
            .is_none());
        assert!(session
            .handle(&WatchEvent::Removed(root.join("gone.jquery.js")))
            .is_none());
        assert!(!out.exists());
    }
}
