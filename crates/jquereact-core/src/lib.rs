//! Pattern-based transformation of jQuery code into React function components.
//!
//! This crate provides the transformation pipeline: dispatch of script and
//! markup input, a registry of pattern rules for common jQuery idioms, the
//! engine that resolves overlapping matches, and assembly of the generated
//! fragments into a named component, with a scaffold fallback when nothing
//! usable was recognized.

pub mod assembly;
pub mod backend;
pub mod chain;
pub mod diagnostics;
pub mod dispatch;
pub mod engine;
pub mod events;
pub mod format;
pub mod handler;
pub mod layout;
pub mod naming;
pub mod options;
pub mod registry;
pub mod rules;
pub mod scaffold;
pub mod scan;
pub mod selector;
pub mod session;
pub mod traits;
pub mod transpiler;
pub mod validate;

pub use backend::{BackendCell, BackendError, BackendStatus};
pub use diagnostics::{Diagnostic, Severity};
pub use dispatch::{dispatch, has_jquery_signature, is_markup_path, Dispatched, SourceUnit, UnitKind};
pub use engine::{Engine, EngineOutput};
pub use format::{FormatError, Formatter, WhitespaceFormatter};
pub use options::{AjaxTarget, OptionsError, TransformOptions};
pub use registry::{PatternRegistry, RegistryError};
pub use scaffold::{fallback, FallbackReason};
pub use session::{BackendLoader, Session, StandardLoader};
pub use traits::{CodeFragment, Confidence, DetectContext, GenerateContext, Match, PatternRule, RuleError};
pub use transpiler::{Outcome, TransformOutput, TransformRequest, Transpiler};
