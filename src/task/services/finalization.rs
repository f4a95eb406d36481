//! Finalization watcher: creates the single mastery check once a workload
//! is fully complete.

use super::{
    config::CycleConfig,
    error::{LearningCycleError, LearningCycleResult},
};
use crate::task::{
    domain::{
        CycleNumber, LearningStage, Task, TaskKind, TaskStatus, WorkloadProgress,
        build_finalization_task,
    },
    ports::{TaskFilter, TaskStore, TaskStoreError},
};
use mockable::Clock;
use std::sync::Arc;

/// Result of evaluating a completion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizationOutcome {
    /// The completed task is standalone and has no workload to finalize.
    NotApplicable,
    /// The workload still has open subtasks.
    Incomplete {
        /// Number of open subtasks.
        open_subtasks: usize,
    },
    /// A mastery check already exists; nothing was written.
    AlreadyFinalized,
    /// The mastery check was created.
    Finalized(Task),
}

/// Watches completion events and finalizes complete workloads.
#[derive(Clone)]
pub struct FinalizationWatcher<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: CycleConfig,
}

impl<S, C> FinalizationWatcher<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new watcher.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, config: CycleConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Evaluates a completed task and finalizes its workload when every
    /// subtask is done.
    ///
    /// A store-level duplicate rejection is treated as already finalized.
    ///
    /// # Errors
    ///
    /// Returns [`LearningCycleError::NotFound`] when the subtask's parent is
    /// missing, or [`LearningCycleError::Store`] when persistence fails.
    pub async fn evaluate(&self, completed: &Task) -> LearningCycleResult<FinalizationOutcome> {
        let parent = match completed.kind() {
            TaskKind::Single => return Ok(FinalizationOutcome::NotApplicable),
            TaskKind::Parent => completed.clone(),
            TaskKind::Subtask { parent_id } => self
                .store
                .find_by_id(parent_id)
                .await?
                .ok_or(LearningCycleError::NotFound(parent_id))?,
        };

        let open = self
            .store
            .list_tasks(
                &TaskFilter::new()
                    .with_parent(parent.id())
                    .with_statuses(TaskStatus::OPEN),
            )
            .await?;
        let existing = if open.is_empty() {
            self.store
                .list_tasks(
                    &TaskFilter::new()
                        .with_parent(parent.id())
                        .with_cycle(CycleNumber::FINAL)
                        .with_learning_stage(LearningStage::Perfect),
                )
                .await?
                .first()
                .map(Task::id)
        } else {
            None
        };

        match WorkloadProgress::assess(open.len(), existing) {
            WorkloadProgress::Incomplete { open_subtasks } => {
                Ok(FinalizationOutcome::Incomplete { open_subtasks })
            }
            WorkloadProgress::Finalized { .. } => Ok(FinalizationOutcome::AlreadyFinalized),
            WorkloadProgress::AllSubtasksDone => {
                let finalization =
                    build_finalization_task(&parent, self.config.finalization_rules(), &*self.clock)?;
                match self.store.store_task(&finalization).await {
                    Ok(()) => {
                        tracing::info!(
                            parent_id = %parent.id(),
                            finalization_id = %finalization.id(),
                            due_date = %finalization.due_date(),
                            "created finalization task"
                        );
                        Ok(FinalizationOutcome::Finalized(finalization))
                    }
                    Err(TaskStoreError::DuplicateFinalization { .. }) => {
                        Ok(FinalizationOutcome::AlreadyFinalized)
                    }
                    Err(err) => Err(err.into()),
                }
            }
        }
    }

    /// Best-effort variant of [`Self::evaluate`] for completion flows.
    ///
    /// Failures are logged and reported as `None`; they never reach the
    /// learner completing the task.
    pub async fn observe(&self, completed: &Task) -> Option<FinalizationOutcome> {
        match self.evaluate(completed).await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::warn!(
                    task_id = %completed.id(),
                    error = %err,
                    "finalization check failed"
                );
                None
            }
        }
    }
}
