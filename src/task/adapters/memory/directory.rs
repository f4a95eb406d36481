//! In-memory student directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::GradeId,
    ports::{StudentDirectory, StudentDirectoryError, StudentDirectoryResult, StudentSummary},
};

/// Thread-safe in-memory grade roster.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStudentDirectory {
    grades: Arc<RwLock<HashMap<GradeId, Vec<StudentSummary>>>>,
}

impl InMemoryStudentDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a learner to a grade, keeping insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StudentDirectoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn enroll(&self, grade_id: GradeId, student: StudentSummary) -> StudentDirectoryResult<()> {
        let mut grades = self.grades.write().map_err(|err| {
            StudentDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        grades.entry(grade_id).or_default().push(student);
        Ok(())
    }
}

#[async_trait]
impl StudentDirectory for InMemoryStudentDirectory {
    async fn list_students_for_grade(
        &self,
        grade_id: GradeId,
    ) -> StudentDirectoryResult<Vec<StudentSummary>> {
        let grades = self.grades.read().map_err(|err| {
            StudentDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(grades.get(&grade_id).cloned().unwrap_or_default())
    }
}
