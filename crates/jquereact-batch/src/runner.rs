//! Batch conversion runner.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use jquereact_core::{Diagnostic, Outcome, TransformOptions, TransformRequest, Transpiler};

use crate::discover::{discover, SourceFile};
use crate::naming::component_name;
use crate::BatchError;

/// Extension of generated component files.
pub const OUTPUT_EXTENSION: &str = "tsx";

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directories, files or glob patterns to convert
    pub inputs: Vec<String>,

    /// Directory names skipped during discovery
    pub exclude: Vec<String>,

    /// Output directory
    pub output_dir: PathBuf,

    /// Options passed to every transformation
    pub options: TransformOptions,

    /// Convert without writing files
    pub dry_run: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            inputs: vec!["src".to_string()],
            exclude: vec!["node_modules".to_string(), "dist".to_string()],
            output_dir: PathBuf::from("src/components"),
            options: TransformOptions::default(),
            dry_run: false,
        }
    }
}

/// How one file ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Script converted from recognized patterns
    Transformed,

    /// Markup converted, with any recognized script
    Markup,

    /// Fallback scaffold written
    Fallback,

    /// Nothing written
    Failed,
}

/// Result for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub source: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    pub component: String,
    pub status: FileStatus,

    /// Generated fragments, and how many of them are approximate
    pub fragments: usize,
    pub approximate: usize,

    /// Fallback reason or failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    fn failed(file: &SourceFile, component: String, message: String) -> Self {
        Self {
            source: file.path.clone(),
            output: None,
            component,
            status: FileStatus::Failed,
            fragments: 0,
            approximate: 0,
            message: Some(message),
            diagnostics: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status != FileStatus::Failed
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Per-file results, in path order
    pub files: Vec<FileReport>,

    pub succeeded: usize,
    pub failed: usize,

    /// Successful files that used the fallback scaffold
    pub fallbacks: usize,

    /// Total run time in milliseconds
    pub duration_ms: u64,
}

impl BatchReport {
    fn from_files(files: Vec<FileReport>, duration_ms: u64) -> Self {
        let succeeded = files.iter().filter(|f| f.succeeded()).count();
        let fallbacks = files
            .iter()
            .filter(|f| f.status == FileStatus::Fallback)
            .count();
        Self {
            failed: files.len() - succeeded,
            succeeded,
            fallbacks,
            files,
            duration_ms,
        }
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// One-line success/failure tally.
    pub fn tally(&self) -> String {
        format!(
            "Converted {}/{} files ({} failed, {} used the fallback scaffold)",
            self.succeeded,
            self.total(),
            self.failed,
            self.fallbacks
        )
    }

    pub fn to_json(&self) -> Result<String, BatchError> {
        serde_json::to_string_pretty(self).map_err(|e| BatchError::Report(e.to_string()))
    }
}

/// Converts many files with one transpiler.
pub struct BatchRunner {
    config: BatchConfig,
    transpiler: Arc<Transpiler>,
}

impl BatchRunner {
    /// Create a new batch runner.
    pub fn new(config: BatchConfig, transpiler: Arc<Transpiler>) -> Self {
        Self { config, transpiler }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Discover and convert every input file.
    ///
    /// Fails only when discovery fails; per-file problems are recorded in the report.
    pub fn run(&self) -> Result<BatchReport, BatchError> {
        let files = discover(&self.config.inputs, &self.config.exclude)?;
        if files.is_empty() {
            tracing::warn!("No source files found");
        } else {
            tracing::info!("Converting {} files...", files.len());
        }
        Ok(self.run_files(&files))
    }

    /// Convert a known set of files in parallel.
    pub fn run_files(&self, files: &[SourceFile]) -> BatchReport {
        let start = Instant::now();
        let claims = self.claim_outputs(files);

        let reports: Vec<FileReport> = files
            .par_iter()
            .zip(claims.par_iter())
            .map(|(file, claim)| match claim {
                Ok(output) => self.convert(file, output),
                Err(message) => FileReport::failed(file, component_name(&file.path), message.clone()),
            })
            .collect();

        let report = BatchReport::from_files(reports, start.elapsed().as_millis() as u64);
        tracing::info!("{}", report.tally());
        report
    }

    /// Convert a single file, e.g. after a change.
    pub fn run_file(&self, file: &SourceFile) -> FileReport {
        self.convert(file, &self.output_path(file))
    }

    /// Output path for a source file.
    pub fn output_path(&self, file: &SourceFile) -> PathBuf {
        self.config
            .output_dir
            .join(file.relative_dir())
            .join(format!("{}.{}", component_name(&file.path), OUTPUT_EXTENSION))
    }

    /// Assign output paths; a path claimed by an earlier file is a failure.
    fn claim_outputs(&self, files: &[SourceFile]) -> Vec<Result<PathBuf, String>> {
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
        files
            .iter()
            .map(|file| {
                let output = self.output_path(file);
                match claimed.get(&output) {
                    Some(owner) => Err(format!(
                        "output {} is already produced by {}",
                        output.display(),
                        owner.display()
                    )),
                    None => {
                        claimed.insert(output.clone(), &file.path);
                        Ok(output)
                    }
                }
            })
            .collect()
    }

    fn convert(&self, file: &SourceFile, output: &Path) -> FileReport {
        let component = component_name(&file.path);

        let content = match fs::read_to_string(&file.path) {
            Ok(content) => content,
            Err(e) => {
                let message = format!("failed to read: {}", e);
                tracing::warn!("{}: {}", file.path.display(), message);
                return FileReport::failed(file, component, message);
            }
        };

        let path = file.path.to_string_lossy();
        let request = TransformRequest::new(&content, &path, &component);
        let result = self.transpiler.transform(&request, &self.config.options);

        if !self.config.dry_run {
            if let Err(e) = write_output(output, &result.code) {
                let message = format!("failed to write {}: {}", output.display(), e);
                tracing::warn!("{}: {}", file.path.display(), message);
                return FileReport::failed(file, component, message);
            }
        }

        let (status, fragments, approximate, message) = match result.outcome {
            Outcome::Transformed {
                fragments,
                approximate,
            } => (FileStatus::Transformed, fragments, approximate, None),
            Outcome::Markup {
                fragments,
                approximate,
            } => (FileStatus::Markup, fragments, approximate, None),
            Outcome::Fallback(reason) => (FileStatus::Fallback, 0, 0, Some(reason.to_string())),
        };

        match &message {
            Some(reason) => tracing::info!(
                "{} -> {} (fallback: {})",
                file.path.display(),
                output.display(),
                reason
            ),
            None => tracing::info!("{} -> {}", file.path.display(), output.display()),
        }
        for diagnostic in &result.diagnostics {
            tracing::debug!("{}: {}", file.path.display(), diagnostic);
        }

        FileReport {
            source: file.path.clone(),
            output: Some(output.to_path_buf()),
            component,
            status,
            fragments,
            approximate,
            message,
            diagnostics: result.diagnostics,
        }
    }
}

fn write_output(path: &Path, code: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jquereact_core::PatternRegistry;
    use tempfile::tempdir;

    fn runner(output_dir: PathBuf) -> BatchRunner {
        let config = BatchConfig {
            output_dir,
            ..Default::default()
        };
        BatchRunner::new(config, Arc::new(Transpiler::new(PatternRegistry::standard())))
    }

    #[test]
    fn output_paths_keep_relative_directories() {
        let runner = runner(PathBuf::from("out"));
        let file = SourceFile {
            path: PathBuf::from("src/widgets/date-picker.jquery.js"),
            root: PathBuf::from("src"),
        };

        assert_eq!(runner.output_path(&file), PathBuf::from("out/widgets/DatePicker.tsx"));
    }

    #[test]
    fn colliding_outputs_fail_the_later_file() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("menu.js"), "$('#m').hide();").unwrap();
        fs::write(temp.path().join("menu.html"), "<p>menu</p>").unwrap();

        let runner = runner(temp.path().join("out"));
        let files = vec![
            SourceFile::locate(&temp.path().join("menu.html"), &[temp.path().to_path_buf()]),
            SourceFile::locate(&temp.path().join("menu.js"), &[temp.path().to_path_buf()]),
        ];
        let report = runner.run_files(&files);

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.files[1].status, FileStatus::Failed);
        assert!(report.files[1].message.as_deref().unwrap().contains("already produced"));
    }

    #[test]
    fn tally_counts_fallbacks_as_successes() {
        let file = SourceFile {
            path: PathBuf::from("a.js"),
            root: PathBuf::new(),
        };
        let mut fallback = FileReport::failed(&file, "A".to_string(), String::new());
        fallback.status = FileStatus::Fallback;
        let failed = FileReport::failed(&file, "A".to_string(), "failed to read".to_string());

        let report = BatchReport::from_files(vec![fallback, failed], 0);

        assert_eq!(
            report.tally(),
            "Converted 1/2 files (1 failed, 1 used the fallback scaffold)"
        );
    }
}
