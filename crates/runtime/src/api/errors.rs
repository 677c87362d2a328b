//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories and construction so
//! clients can bubble them up with consistent context. Nothing the director
//! decides at runtime produces an error; these only cover plumbing.
use thiserror::Error;
use tokio::sync::oneshot;

use director_core::ConfigError;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("director worker command channel closed")]
    CommandChannelClosed,

    #[error("director worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("director worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("invalid director configuration")]
    Config(#[from] ConfigError),

    #[error("failed to load director content: {0}")]
    Content(String),
}
