//! `PostgreSQL` adapters for learning-cycle persistence.
//!
//! The schema is created by the SQL migrations under `migrations/`. The
//! partial unique index `idx_tasks_finalization_unique` guarantees a single
//! cycle-3 finalization task per parent, even when completions race.

mod directory;
mod models;
mod repository;
mod schema;

pub use directory::PostgresStudentDirectory;
pub use repository::{PostgresTaskStore, TaskPgPool};
