//! Formatter seam for assembled output.

/// Errors raised by a formatter.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Formatter rejected the input: {0}")]
    Rejected(String),

    #[error("Formatter failed: {0}")]
    Failed(String),
}

/// Text-to-text post-processing of generated source.
pub trait Formatter: Send + Sync {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Normalizes whitespace.
///
/// Line endings become `\n`, trailing whitespace is removed, runs of blank
/// lines collapse to one, and the text ends with exactly one newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceFormatter;

impl Formatter for WhitespaceFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let normalized = source.replace("\r\n", "\n").replace('\r', "\n");

        let mut out = String::with_capacity(normalized.len());
        let mut blank_run = false;
        for line in normalized.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                if blank_run || out.is_empty() {
                    continue;
                }
                blank_run = true;
            } else {
                blank_run = false;
            }
            out.push_str(line);
            out.push('\n');
        }

        while out.ends_with("\n\n") {
            out.pop();
        }
        if out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }
}
