//! Service-level errors for learning-cycle operations.

use crate::task::{
    domain::{PlanError, TaskDomainError, TaskId},
    ports::{StudentDirectoryError, TaskStoreError},
};
use thiserror::Error;

/// Errors surfaced by the learning-cycle services.
#[derive(Debug, Error)]
pub enum LearningCycleError {
    /// Pacing or date inputs were rejected before any write.
    #[error(transparent)]
    InvalidPlan(#[from] PlanError),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// A referenced task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Task store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
    /// Student directory lookup failed.
    #[error(transparent)]
    Directory(#[from] StudentDirectoryError),
}

/// Result type for learning-cycle service operations.
pub type LearningCycleResult<T> = Result<T, LearningCycleError>;
