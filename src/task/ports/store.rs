//! Store port for tasks, mistakes and review relationships.

use crate::task::domain::{
    CycleNumber, LearningStage, Mistake, Task, TaskId, TaskRelationship, TaskStatus, TestPeriodId,
    UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Filter for listing tasks. Unset criteria match every task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    parent_task_id: Option<TaskId>,
    assigned_to: Option<UserId>,
    test_period_id: Option<TestPeriodId>,
    statuses: Vec<TaskStatus>,
    learning_stage: Option<LearningStage>,
    cycle_number: Option<CycleNumber>,
}

impl TaskFilter {
    /// Creates a filter that matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the filter to children of `parent_task_id`.
    #[must_use]
    pub const fn with_parent(mut self, parent_task_id: TaskId) -> Self {
        self.parent_task_id = Some(parent_task_id);
        self
    }

    /// Restricts the filter to tasks assigned to `user`.
    #[must_use]
    pub const fn with_assignee(mut self, user: UserId) -> Self {
        self.assigned_to = Some(user);
        self
    }

    /// Restricts the filter to a test period.
    #[must_use]
    pub const fn with_test_period(mut self, test_period_id: Option<TestPeriodId>) -> Self {
        self.test_period_id = test_period_id;
        self
    }

    /// Restricts the filter to any of the given statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Restricts the filter to a learning stage.
    #[must_use]
    pub const fn with_learning_stage(mut self, stage: LearningStage) -> Self {
        self.learning_stage = Some(stage);
        self
    }

    /// Restricts the filter to a cycle number.
    #[must_use]
    pub const fn with_cycle(mut self, cycle_number: CycleNumber) -> Self {
        self.cycle_number = Some(cycle_number);
        self
    }

    /// Returns the parent criterion.
    #[must_use]
    pub const fn parent_task_id(&self) -> Option<TaskId> {
        self.parent_task_id
    }

    /// Returns the assignee criterion.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Returns the test period criterion.
    #[must_use]
    pub const fn test_period_id(&self) -> Option<TestPeriodId> {
        self.test_period_id
    }

    /// Returns the accepted statuses; empty accepts all.
    #[must_use]
    pub fn statuses(&self) -> &[TaskStatus] {
        &self.statuses
    }

    /// Returns the learning stage criterion.
    #[must_use]
    pub const fn learning_stage(&self) -> Option<LearningStage> {
        self.learning_stage
    }

    /// Returns the cycle criterion.
    #[must_use]
    pub const fn cycle_number(&self) -> Option<CycleNumber> {
        self.cycle_number
    }

    /// Returns `true` when `task` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.parent_task_id
            .is_none_or(|parent| task.parent_id() == Some(parent))
            && self.assigned_to.is_none_or(|user| task.assigned_to() == user)
            && self
                .test_period_id
                .is_none_or(|period| task.test_period_id() == Some(period))
            && (self.statuses.is_empty() || self.statuses.contains(&task.status()))
            && self
                .learning_stage
                .is_none_or(|stage| task.learning_stage() == stage)
            && self
                .cycle_number
                .is_none_or(|cycle| task.cycle_number() == cycle)
    }
}

/// Persistence contract for learning-cycle records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the identifier exists,
    /// or [`TaskStoreError::DuplicateFinalization`] when the task is a
    /// finalization task and its parent already has one.
    async fn store_task(&self, task: &Task) -> TaskStoreResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn update_task(&self, task: &Task) -> TaskStoreResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Lists tasks matching `filter`, ordered by due date then creation
    /// time.
    async fn list_tasks(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>>;

    /// Deletes a task together with its mistakes and relationship edges.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn delete_task(&self, id: TaskId) -> TaskStoreResult<()>;

    /// Stores mistake records.
    async fn record_mistakes(&self, mistakes: &[Mistake]) -> TaskStoreResult<()>;

    /// Lists mistakes recorded against a task, optionally for one cycle.
    async fn list_mistakes(
        &self,
        task_id: TaskId,
        cycle_number: Option<CycleNumber>,
    ) -> TaskStoreResult<Vec<Mistake>>;

    /// Appends a relationship edge.
    async fn store_relationship(&self, relationship: &TaskRelationship) -> TaskStoreResult<()>;

    /// Lists relationship edges recorded under a parent task.
    async fn list_relationships(&self, parent_task_id: TaskId)
    -> TaskStoreResult<Vec<TaskRelationship>>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The parent already has a finalization task.
    #[error("parent task {parent_id} already has a finalization task")]
    DuplicateFinalization {
        /// Parent whose finalization already exists.
        parent_id: TaskId,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
