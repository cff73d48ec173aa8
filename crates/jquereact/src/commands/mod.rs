pub mod convert;
pub mod init;
pub mod transform;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use jquereact_core::{Session, StandardLoader, Transpiler};

/// Initialize the conversion backend.
pub async fn transpiler(format: bool) -> Result<Arc<Transpiler>> {
    let session = Session::with_loader(StandardLoader { raw: !format });
    session
        .transpiler()
        .await
        .context("Failed to initialize the conversion backend")
}
