//! Lazily loaded transformation sessions.

use std::future::Future;
use std::sync::Arc;

use crate::backend::{BackendCell, BackendError, BackendStatus};
use crate::format::WhitespaceFormatter;
use crate::options::TransformOptions;
use crate::registry::PatternRegistry;
use crate::transpiler::{TransformOutput, TransformRequest, Transpiler};

/// Builds the transformation backend.
pub trait BackendLoader: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Transpiler, BackendError>> + Send;
}

/// Loads the standard registry with whitespace formatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLoader {
    /// Skip the formatter
    pub raw: bool,
}

impl BackendLoader for StandardLoader {
    async fn load(&self) -> Result<Transpiler, BackendError> {
        jquereact_markup::check_grammar().map_err(|e| BackendError::Grammar(e.to_string()))?;

        let transpiler = Transpiler::new(PatternRegistry::standard());
        tracing::debug!("Loaded transpiler with rules: {}", transpiler.registry().ids().join(", "));

        if self.raw {
            Ok(transpiler)
        } else {
            Ok(transpiler.with_formatter(WhitespaceFormatter))
        }
    }
}

/// Transforms files through a backend loaded on first use.
pub struct Session<L = StandardLoader> {
    loader: L,
    backend: BackendCell<Transpiler>,
}

impl Session<StandardLoader> {
    /// Create a new session over the standard backend.
    pub fn new() -> Self {
        Self::with_loader(StandardLoader::default())
    }
}

impl Default for Session<StandardLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: BackendLoader> Session<L> {
    /// Create a new session with a custom loader.
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            backend: BackendCell::new(),
        }
    }

    /// The backend, loading it if needed.
    pub async fn transpiler(&self) -> Result<Arc<Transpiler>, BackendError> {
        self.backend.get_or_init(|| self.loader.load()).await
    }

    /// Transform one file. Fails only when the backend cannot be loaded.
    pub async fn transform(
        &self,
        request: &TransformRequest<'_>,
        options: &TransformOptions,
    ) -> Result<TransformOutput, BackendError> {
        let transpiler = self.transpiler().await?;
        Ok(transpiler.transform(request, options))
    }

    pub fn status(&self) -> BackendStatus {
        self.backend.status()
    }
}
