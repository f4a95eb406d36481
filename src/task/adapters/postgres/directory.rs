//! `PostgreSQL` student directory backed by the `grade_students` table.

use super::{models::GradeStudentRow, repository::TaskPgPool, schema::grade_students};
use crate::task::{
    domain::{GradeId, UserId},
    ports::{StudentDirectory, StudentDirectoryError, StudentDirectoryResult, StudentSummary},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed student directory.
#[derive(Debug, Clone)]
pub struct PostgresStudentDirectory {
    pool: TaskPgPool,
}

impl PostgresStudentDirectory {
    /// Creates a new directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentDirectory for PostgresStudentDirectory {
    async fn list_students_for_grade(
        &self,
        grade_id: GradeId,
    ) -> StudentDirectoryResult<Vec<StudentSummary>> {
        let pool = self.pool.clone();
        let rows = tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StudentDirectoryError::persistence)?;
            grade_students::table
                .filter(grade_students::grade_id.eq(grade_id.into_inner()))
                .select(GradeStudentRow::as_select())
                .order((grade_students::enrolled_at.asc(), grade_students::student_id.asc()))
                .load::<GradeStudentRow>(&mut connection)
                .map_err(StudentDirectoryError::persistence)
        })
        .await
        .map_err(StudentDirectoryError::persistence)??;

        Ok(rows
            .into_iter()
            .map(|row| StudentSummary::new(UserId::from_uuid(row.student_id), row.display_name))
            .collect())
    }
}
