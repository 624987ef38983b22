//! Hibernation state machine: artifact model, failure taxonomy, orchestrators.

pub mod artifacts;
pub mod cleanup;
pub mod power_button;
pub mod prepare;
pub mod resume;
pub mod sleep;
pub mod status;
pub mod swap;
pub mod trigger;
pub mod workarounds;

use async_trait::async_trait;
use thiserror::Error;

/// A fatal provisioning failure. Names the step that died so the dispatcher
/// can surface it verbatim to the front-end.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to allocate swapfile: {0}")]
    Allocate(String),

    #[error("failed to replace the existing swapfile: {0}")]
    Replace(String),

    #[error("failed to format swapfile: {0}")]
    Format(String),

    #[error("failed to activate swapfile: {0}")]
    Activate(String),

    #[error("failed to resolve the filesystem UUID for the swapfile: {0}")]
    ResolveUuid(String),

    #[error("failed to resolve the swapfile extent offset: {0}")]
    ResolveOffset(String),

    #[error("failed to persist the resume boot fragment: {0}")]
    PersistResume(String),

    #[error("swapfile IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A persisted OS artifact this agent owns: probe it, converge it, reverse it.
///
/// Everything the agent writes to the system implements this, so prepare and
/// cleanup compose lists of artifacts instead of hard-coding shell calls.
#[async_trait]
pub trait Artifact: Send + Sync {
    fn name(&self) -> &'static str;

    async fn exists(&self) -> bool;

    async fn ensure(&self) -> anyhow::Result<()>;

    /// Ok(true) if something was removed, Ok(false) if already absent.
    async fn remove(&self) -> anyhow::Result<bool>;
}
