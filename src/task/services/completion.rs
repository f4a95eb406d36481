//! Task completion and progress tracking.

use super::{
    error::{LearningCycleError, LearningCycleResult},
    finalization::{FinalizationOutcome, FinalizationWatcher},
};
use crate::task::{
    domain::{Task, TaskDomainError, TaskId, TaskStatus},
    ports::TaskStore,
};
use mockable::Clock;
use std::sync::Arc;

/// A completed task and what the finalization check made of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTask {
    /// The task as stored after completion.
    pub task: Task,
    /// Finalization result; `None` when the check failed and was logged.
    pub finalization: Option<FinalizationOutcome>,
}

/// Marks tasks complete and triggers the finalization watcher.
#[derive(Clone)]
pub struct TaskCompletionService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    watcher: FinalizationWatcher<S, C>,
}

impl<S, C> TaskCompletionService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new completion service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, watcher: FinalizationWatcher<S, C>) -> Self {
        Self {
            store,
            clock,
            watcher,
        }
    }

    /// Marks a task complete, then runs the finalization check.
    ///
    /// Completing the mastery check itself skips the check. Finalization
    /// failures are logged and do not fail the completion.
    ///
    /// # Errors
    ///
    /// Returns [`LearningCycleError::NotFound`] for unknown tasks,
    /// [`LearningCycleError::Domain`] when the task is already completed, or
    /// [`LearningCycleError::Store`] when the update fails.
    pub async fn complete_task(
        &self,
        task_id: TaskId,
        actual_minutes: Option<u32>,
    ) -> LearningCycleResult<CompletedTask> {
        let task = self.mark_complete(task_id, actual_minutes).await?;
        Ok(self.finalize_after(task).await)
    }

    /// Marks a task complete without running the finalization check.
    ///
    /// # Errors
    ///
    /// See [`Self::complete_task`].
    async fn mark_complete(
        &self,
        task_id: TaskId,
        actual_minutes: Option<u32>,
    ) -> LearningCycleResult<Task> {
        let mut task = self.load(task_id).await?;
        task.complete(actual_minutes, &*self.clock)?;
        self.store.update_task(&task).await?;
        tracing::debug!(%task_id, "task completed");
        Ok(task)
    }

    /// Loads a task that can still be completed.
    ///
    /// # Errors
    ///
    /// Returns [`LearningCycleError::NotFound`] for unknown tasks or
    /// [`LearningCycleError::Domain`] when the task is already completed.
    pub async fn open_task(&self, task_id: TaskId) -> LearningCycleResult<Task> {
        let task = self.load(task_id).await?;
        if task.status() == TaskStatus::Completed {
            return Err(TaskDomainError::TaskAlreadyCompleted(task_id).into());
        }
        Ok(task)
    }

    /// Runs the finalization check for a task that was just completed.
    async fn finalize_after(&self, task: Task) -> CompletedTask {
        let finalization = if task.is_finalization() {
            Some(FinalizationOutcome::NotApplicable)
        } else {
            self.watcher.observe(&task).await
        };
        CompletedTask { task, finalization }
    }

    /// Records partial progress; reaching the full workload completes the
    /// task through [`Self::complete_task`].
    ///
    /// Returns `None` for the finalization result while the task is still
    /// in progress.
    ///
    /// # Errors
    ///
    /// Returns [`LearningCycleError::Domain`] when the progress exceeds the
    /// workload or the task is already completed, plus the errors of
    /// [`Self::complete_task`].
    pub async fn record_progress(
        &self,
        task_id: TaskId,
        completed_units: u32,
    ) -> LearningCycleResult<CompletedTask> {
        let mut task = self.load(task_id).await?;
        if completed_units == task.total_units() {
            return self.complete_task(task_id, None).await;
        }
        task.record_progress(completed_units, &*self.clock)?;
        self.store.update_task(&task).await?;
        Ok(CompletedTask {
            task,
            finalization: None,
        })
    }

    async fn load(&self, task_id: TaskId) -> LearningCycleResult<Task> {
        self.store
            .find_by_id(task_id)
            .await?
            .ok_or(LearningCycleError::NotFound(task_id))
    }
}
