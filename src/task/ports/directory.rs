//! Directory port for resolving the learners of a grade.

use crate::task::domain::{GradeId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Learner identity as needed for distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StudentSummary {
    /// Learner identifier.
    pub id: UserId,
    /// Name shown to the coordinator.
    pub display_name: String,
}

impl StudentSummary {
    /// Creates a learner summary.
    #[must_use]
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// Result type for student directory operations.
pub type StudentDirectoryResult<T> = Result<T, StudentDirectoryError>;

/// Read-only view of grade membership owned by the host application.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Lists the learners in a grade.
    async fn list_students_for_grade(
        &self,
        grade_id: GradeId,
    ) -> StudentDirectoryResult<Vec<StudentSummary>>;
}

/// Errors returned by student directory implementations.
#[derive(Debug, Clone, Error)]
pub enum StudentDirectoryError {
    /// Persistence-layer failure.
    #[error("student directory error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StudentDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
