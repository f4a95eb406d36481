//! Distribution service: replicates a template workload to many learners.

use super::{
    config::CycleConfig,
    error::{LearningCycleError, LearningCycleResult},
};
use crate::task::{
    domain::{GradeId, Task, TaskDomainError, TaskId, TaskKind, UserId},
    ports::{StudentDirectory, StudentSummary, TaskFilter, TaskStore, TaskStoreError},
};
use futures::stream::{FuturesUnordered, StreamExt};
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Request payload for distributing a template task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributeTaskRequest {
    /// Task tree to copy. Must be a standalone or parent task.
    pub template_task_id: TaskId,
    /// Grade whose students receive the copy when `targets` is omitted.
    pub grade_id: GradeId,
    /// Explicit recipients, overriding the grade roster.
    pub targets: Option<Vec<StudentSummary>>,
}

impl DistributeTaskRequest {
    /// Distributes to every student of a grade.
    #[must_use]
    pub const fn for_grade(template_task_id: TaskId, grade_id: GradeId) -> Self {
        Self {
            template_task_id,
            grade_id,
            targets: None,
        }
    }

    /// Restricts distribution to explicit recipients.
    #[must_use]
    pub fn with_targets(mut self, targets: Vec<StudentSummary>) -> Self {
        self.targets = Some(targets);
        self
    }
}

/// Aggregate outcome of a distribution run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
    /// Recipients that received a complete copy.
    pub success_count: usize,
    /// Recipients whose copy failed.
    pub error_count: usize,
    /// `"{display_name}: {error}"` per failure, in target order.
    pub errors: Vec<String>,
    /// Failed recipients, in target order.
    pub failed_assignees: Vec<UserId>,
}

impl DistributionReport {
    /// Returns `true` when every recipient succeeded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.error_count == 0
    }
}

/// Copies template task trees to learners with per-learner isolation.
#[derive(Clone)]
pub struct DistributionService<S, D, C>
where
    S: TaskStore,
    D: StudentDirectory,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    directory: Arc<D>,
    clock: Arc<C>,
    config: CycleConfig,
}

impl<S, D, C> DistributionService<S, D, C>
where
    S: TaskStore,
    D: StudentDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new distribution service.
    #[must_use]
    pub const fn new(store: Arc<S>, directory: Arc<D>, clock: Arc<C>, config: CycleConfig) -> Self {
        Self {
            store,
            directory,
            clock,
            config,
        }
    }

    /// Copies the template and its subtasks to each recipient.
    ///
    /// Recipients are processed concurrently, at most
    /// `distribution_parallelism` at a time. A failed recipient is reported
    /// and does not stop the others; rows already written for it are kept.
    ///
    /// # Errors
    ///
    /// Returns [`LearningCycleError::NotFound`] when the template is
    /// missing, [`LearningCycleError::Domain`] when the template is a
    /// subtask, or [`LearningCycleError::Directory`] /
    /// [`LearningCycleError::Store`] when the roster or template tree cannot
    /// be read.
    pub async fn distribute(
        &self,
        request: DistributeTaskRequest,
    ) -> LearningCycleResult<DistributionReport> {
        let template = self
            .store
            .find_by_id(request.template_task_id)
            .await?
            .ok_or(LearningCycleError::NotFound(request.template_task_id))?;
        if matches!(template.kind(), TaskKind::Subtask { .. }) {
            return Err(TaskDomainError::InvalidTemplate(template.id()).into());
        }
        let subtasks = match template.kind() {
            TaskKind::Parent => {
                self.store
                    .list_tasks(&TaskFilter::new().with_parent(template.id()))
                    .await?
            }
            TaskKind::Single | TaskKind::Subtask { .. } => Vec::new(),
        };
        let targets = match request.targets {
            Some(targets) => targets,
            None => {
                self.directory
                    .list_students_for_grade(request.grade_id)
                    .await?
            }
        };

        let limiter = Arc::new(Semaphore::new(self.config.distribution_parallelism.get()));
        let mut pending = FuturesUnordered::new();
        for (index, target) in targets.iter().enumerate() {
            let permits = Arc::clone(&limiter);
            let tree = (&template, subtasks.as_slice());
            pending.push(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => self.copy_tree(tree.0, tree.1, target.id).await,
                    Err(err) => Err(TaskStoreError::persistence(err).into()),
                };
                (index, outcome)
            });
        }

        let mut failures = Vec::new();
        let mut report = DistributionReport::default();
        while let Some((index, outcome)) = pending.next().await {
            match outcome {
                Ok(()) => report.success_count += 1,
                Err(err) => failures.push((index, err)),
            }
        }

        failures.sort_by_key(|(index, _)| *index);
        for (index, err) in failures {
            let Some(target) = targets.get(index) else {
                continue;
            };
            tracing::warn!(
                template_id = %template.id(),
                assignee = %target.id,
                error = %err,
                "distribution to assignee failed"
            );
            report.errors.push(format!("{}: {err}", target.display_name));
            report.failed_assignees.push(target.id);
        }
        report.error_count = report.errors.len();

        tracing::info!(
            template_id = %template.id(),
            targets = targets.len(),
            succeeded = report.success_count,
            failed = report.error_count,
            "distributed task"
        );
        Ok(report)
    }

    async fn copy_tree(
        &self,
        template: &Task,
        subtasks: &[Task],
        assignee: UserId,
    ) -> LearningCycleResult<()> {
        let parent = template.share_copy(assignee, template.kind(), &*self.clock);
        self.store.store_task(&parent).await?;
        for subtask in subtasks {
            let copy = subtask.share_copy(
                assignee,
                TaskKind::Subtask {
                    parent_id: parent.id(),
                },
                &*self.clock,
            );
            self.store.store_task(&copy).await?;
        }
        Ok(())
    }
}
