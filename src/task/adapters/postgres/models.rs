//! Diesel row models for learning-cycle persistence.

use super::schema::{grade_students, task_mistakes, task_relationships, tasks};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Tree position tag.
    pub task_type: String,
    /// Parent reference.
    pub parent_task_id: Option<uuid::Uuid>,
    /// Learning cycle number.
    pub cycle_number: i16,
    /// Learning stage label.
    pub learning_stage: String,
    /// Workload unit type.
    pub unit_type: String,
    /// Workload size.
    pub total_units: i32,
    /// Completed units.
    pub completed_units: i32,
    /// First numbered unit.
    pub unit_range_start: Option<i32>,
    /// Last numbered unit.
    pub unit_range_end: Option<i32>,
    /// Effort estimate.
    pub estimated_minutes: Option<i32>,
    /// Reported effort.
    pub actual_minutes: Option<i32>,
    /// Planned start date.
    pub start_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: NaiveDate,
    /// Progress status.
    pub status: String,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Assignee.
    pub assigned_to: uuid::Uuid,
    /// Creator.
    pub created_by: uuid::Uuid,
    /// Test period.
    pub test_period_id: Option<uuid::Uuid>,
    /// Distribution marker.
    pub is_shared: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Immutable columns written once.
    #[diesel(embed)]
    pub identity: TaskIdentityColumns,
    /// Columns that change over the task's life.
    #[diesel(embed)]
    pub state: TaskChangeset,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Columns fixed at creation time.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct TaskIdentityColumns {
    /// Tree position tag.
    pub task_type: String,
    /// Parent reference.
    pub parent_task_id: Option<uuid::Uuid>,
    /// Learning cycle number.
    pub cycle_number: i16,
    /// Learning stage label.
    pub learning_stage: String,
    /// Workload unit type.
    pub unit_type: String,
    /// Creator.
    pub created_by: uuid::Uuid,
    /// Distribution marker.
    pub is_shared: bool,
}

/// Mutable task columns written on every update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Workload size.
    pub total_units: i32,
    /// Completed units.
    pub completed_units: i32,
    /// First numbered unit.
    pub unit_range_start: Option<i32>,
    /// Last numbered unit.
    pub unit_range_end: Option<i32>,
    /// Effort estimate.
    pub estimated_minutes: Option<i32>,
    /// Reported effort.
    pub actual_minutes: Option<i32>,
    /// Planned start date.
    pub start_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: NaiveDate,
    /// Progress status.
    pub status: String,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Assignee.
    pub assigned_to: uuid::Uuid,
    /// Test period.
    pub test_period_id: Option<uuid::Uuid>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for mistake records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_mistakes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MistakeRow {
    /// Mistake identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Mistaken unit.
    pub unit: i32,
    /// Cycle number.
    pub cycle_number: i16,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Row model for relationship edges.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_relationships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RelationshipRow {
    /// Edge identifier.
    pub id: uuid::Uuid,
    /// Workload parent.
    pub parent_task_id: uuid::Uuid,
    /// Generated child.
    pub child_task_id: uuid::Uuid,
    /// Cycle number.
    pub cycle_number: i16,
    /// Original unit.
    pub unit: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query row for grade membership.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = grade_students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GradeStudentRow {
    /// Learner identifier.
    pub student_id: uuid::Uuid,
    /// Name shown to coordinators.
    pub display_name: String,
}
