//! The in-process transformation backend.
//!
//! A [`Transpiler`] owns a pattern registry and an optional formatter and turns
//! one file's content into component source. It never fails: anything that
//! goes wrong inside a call ends in the fallback scaffold plus diagnostics.

use std::panic::{catch_unwind, AssertUnwindSafe};

use jquereact_markup::{convert_document, MarkupDocument, MarkupError, DEFAULT_MAX_LINES};

use crate::assembly::{apply_name, markup_component, script_component, StructureEmbedding};
use crate::diagnostics::Diagnostic;
use crate::dispatch::{dispatch, has_jquery_signature, Dispatched, SourceUnit};
use crate::engine::{panic_message, Engine};
use crate::format::Formatter;
use crate::options::TransformOptions;
use crate::registry::PatternRegistry;
use crate::scaffold::{fallback, FallbackReason};
use crate::traits::{CodeFragment, Confidence};
use crate::validate::check_syntax;

/// One file to transform.
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    /// Raw file content
    pub content: &'a str,

    /// Logical path; its extension selects the script or markup path
    pub path: &'a str,

    /// Name substituted into the generated function and export
    pub component_name: &'a str,
}

impl<'a> TransformRequest<'a> {
    pub fn new(content: &'a str, path: &'a str, component_name: &'a str) -> Self {
        Self {
            content,
            path,
            component_name,
        }
    }
}

/// What kind of component was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Script input with generated fragments
    Transformed { fragments: usize, approximate: usize },

    /// Markup input: converted structure plus any script fragments
    Markup { fragments: usize, approximate: usize },

    /// The fallback scaffold
    Fallback(FallbackReason),
}

/// Result of one transformation call.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Final component source
    pub code: String,

    pub outcome: Outcome,
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformOutput {
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, Outcome::Fallback(_))
    }
}

/// Pattern-based jQuery-to-React transformer.
pub struct Transpiler {
    registry: PatternRegistry,
    formatter: Option<Box<dyn Formatter>>,
}

impl Transpiler {
    /// Create a new transpiler without a formatter.
    pub fn new(registry: PatternRegistry) -> Self {
        Self {
            registry,
            formatter: None,
        }
    }

    /// Post-process every output with `formatter`.
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Transform one file.
    pub fn transform(&self, request: &TransformRequest<'_>, options: &TransformOptions) -> TransformOutput {
        self.guarded(request, |diagnostics| {
            let dispatched = dispatch(request.content, request.path);
            self.assemble(request, dispatched, options, diagnostics)
        })
    }

    /// Run `assemble`, turning a panic into the exception fallback, then format.
    fn guarded<F>(&self, request: &TransformRequest<'_>, assemble: F) -> TransformOutput
    where
        F: FnOnce(&mut Vec<Diagnostic>) -> (String, Outcome),
    {
        let mut diagnostics = Vec::new();

        let result = catch_unwind(AssertUnwindSafe(|| assemble(&mut diagnostics)));
        let (code, outcome) = match result {
            Ok(assembled) => assembled,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!("Transformation of {} panicked: {}", request.path, message);
                diagnostics.push(Diagnostic::warning(format!("transformation panicked: {}", message)));
                let reason = FallbackReason::Exception(message);
                (fallback(request.component_name, request.content, &reason), Outcome::Fallback(reason))
            }
        };

        let code = self.format(code, &mut diagnostics);
        TransformOutput {
            code,
            outcome,
            diagnostics,
        }
    }

    fn assemble(
        &self,
        request: &TransformRequest<'_>,
        dispatched: Result<Dispatched, MarkupError>,
        options: &TransformOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (String, Outcome) {
        let dispatched = match dispatched {
            Ok(dispatched) => dispatched,
            Err(e) => {
                tracing::warn!("Failed to parse markup in {}: {}", request.path, e);
                diagnostics.push(Diagnostic::warning(e.to_string()));
                return self.fallback(request, FallbackReason::Exception(e.to_string()));
            }
        };

        match dispatched {
            Dispatched::Script(unit) => self.assemble_script(request, &unit, options, diagnostics),
            Dispatched::Markup {
                document,
                unit: Some(unit),
            } => self.assemble_markup(request, &document, &unit, options, diagnostics),
            Dispatched::Markup { unit: None, .. } => self.fallback(request, FallbackReason::NoJQueryUsage),
        }
    }

    fn assemble_script(
        &self,
        request: &TransformRequest<'_>,
        unit: &SourceUnit,
        options: &TransformOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (String, Outcome) {
        if !has_jquery_signature(&unit.code) {
            return self.fallback(request, FallbackReason::NoJQueryUsage);
        }

        let fragments = self.run_engine(unit, options, diagnostics);
        if fragments.is_empty() {
            return self.fallback(request, FallbackReason::NoUsableOutput);
        }

        let code = apply_name(&script_component(&fragments, request.content), request.component_name);
        if let Err(errors) = check_syntax(&code) {
            report_invalid(request.path, &errors, diagnostics);
            return self.fallback(request, FallbackReason::NoUsableOutput);
        }

        let (fragments, approximate) = tally(&fragments);
        (code, Outcome::Transformed { fragments, approximate })
    }

    fn assemble_markup(
        &self,
        request: &TransformRequest<'_>,
        document: &MarkupDocument,
        unit: &SourceUnit,
        options: &TransformOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (String, Outcome) {
        let fragments = self.run_engine(unit, options, diagnostics);
        let structure = convert_document(document, DEFAULT_MAX_LINES);
        let (count, approximate) = tally(&fragments);
        let outcome = Outcome::Markup {
            fragments: count,
            approximate,
        };

        let rendered = apply_name(
            &markup_component(&fragments, &structure, request.content, StructureEmbedding::Rendered),
            request.component_name,
        );
        let Err(errors) = check_syntax(&rendered) else {
            return (rendered, outcome);
        };
        tracing::debug!(
            "Converted markup of {} is not valid JSX, embedding it as a comment",
            request.path
        );
        diagnostics.push(Diagnostic::info(format!(
            "converted markup kept as a comment: {}",
            errors.join("; ")
        )));

        let commented = apply_name(
            &markup_component(&fragments, &structure, request.content, StructureEmbedding::Commented),
            request.component_name,
        );
        match check_syntax(&commented) {
            Ok(()) => (commented, outcome),
            Err(errors) => {
                report_invalid(request.path, &errors, diagnostics);
                self.fallback(request, FallbackReason::NoUsableOutput)
            }
        }
    }

    /// Run the engine and keep the fragments that produced code.
    fn run_engine(
        &self,
        unit: &SourceUnit,
        options: &TransformOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<CodeFragment> {
        let output = Engine::new(&self.registry).run(unit, options);
        diagnostics.extend(output.diagnostics);
        output.fragments.into_iter().filter(|f| !f.is_empty()).collect()
    }

    fn fallback(&self, request: &TransformRequest<'_>, reason: FallbackReason) -> (String, Outcome) {
        tracing::debug!("Using fallback scaffold for {}: {}", request.path, reason);
        let code = fallback(request.component_name, request.content, &reason);
        (code, Outcome::Fallback(reason))
    }

    /// Apply the formatter, keeping the unformatted text if it fails.
    fn format(&self, code: String, diagnostics: &mut Vec<Diagnostic>) -> String {
        let Some(formatter) = &self.formatter else {
            return code;
        };

        match formatter.format(&code) {
            Ok(formatted) => formatted,
            Err(e) => {
                tracing::warn!("Formatting failed, keeping unformatted output: {}", e);
                diagnostics.push(Diagnostic::warning(format!("formatting skipped: {}", e)));
                code
            }
        }
    }
}

fn tally(fragments: &[CodeFragment]) -> (usize, usize) {
    let approximate = fragments
        .iter()
        .filter(|f| f.confidence == Confidence::Approximate)
        .count();
    (fragments.len(), approximate)
}

fn report_invalid(path: &str, errors: &[String], diagnostics: &mut Vec<Diagnostic>) {
    tracing::warn!("Generated component for {} does not parse: {}", path, errors.join("; "));
    diagnostics.push(Diagnostic::warning(format!(
        "generated component is not valid JSX: {}",
        errors.join("; ")
    )));
}
