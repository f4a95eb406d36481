//! Learning-cycle engine: the entry points callers drive.

use super::{
    completion::{CompletedTask, TaskCompletionService},
    config::CycleConfig,
    distribution::{DistributeTaskRequest, DistributionReport, DistributionService},
    error::{LearningCycleError, LearningCycleResult},
    finalization::FinalizationWatcher,
    mistakes::MistakeRecorder,
    planner::{PlannedWorkload, SplitTaskPlanner, SplitWorkloadRequest},
    review::{ReviewRequest, ReviewTaskGenerator},
};
use crate::task::{
    domain::{CycleNumber, Task, TaskDomainError, TaskId, TaskKind, TestPeriodId, UserId},
    ports::{StudentDirectory, TaskStore},
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;

/// Mistakes reported while completing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MistakeReport {
    /// Units the learner got wrong.
    pub units: Vec<u32>,
    /// Cycle during which the mistakes were made.
    pub cycle_number: CycleNumber,
    /// Test period of the resulting review queue.
    pub test_period_id: Option<TestPeriodId>,
}

/// Result of completing a task with mistakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionWithReviews {
    /// Completion and finalization outcome.
    pub completed: CompletedTask,
    /// Review tasks created for the mistakes, after grouping.
    pub reviews: Vec<Task>,
}

/// Composes the planner, recorder, review generator, finalization watcher
/// and distribution service over one store.
#[derive(Clone)]
pub struct LearningCycleEngine<S, D, C>
where
    S: TaskStore,
    D: StudentDirectory,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    planner: SplitTaskPlanner<S, C>,
    recorder: MistakeRecorder<S, C>,
    reviews: ReviewTaskGenerator<S, C>,
    completion: TaskCompletionService<S, C>,
    distribution: DistributionService<S, D, C>,
}

impl<S, D, C> LearningCycleEngine<S, D, C>
where
    S: TaskStore,
    D: StudentDirectory,
    C: Clock + Send + Sync,
{
    /// Wires every service to the given store, directory and clock.
    #[must_use]
    pub fn new(store: Arc<S>, directory: Arc<D>, clock: Arc<C>, config: CycleConfig) -> Self {
        let watcher = FinalizationWatcher::new(Arc::clone(&store), Arc::clone(&clock), config);
        Self {
            planner: SplitTaskPlanner::new(Arc::clone(&store), Arc::clone(&clock)),
            recorder: MistakeRecorder::new(Arc::clone(&store), Arc::clone(&clock)),
            reviews: ReviewTaskGenerator::new(Arc::clone(&store), Arc::clone(&clock), config),
            completion: TaskCompletionService::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                watcher,
            ),
            distribution: DistributionService::new(Arc::clone(&store), directory, clock, config),
            store,
        }
    }

    /// Plans and stores a split workload.
    ///
    /// # Errors
    ///
    /// See [`SplitTaskPlanner::plan_split_workload`].
    pub async fn plan_split_workload(
        &self,
        request: SplitWorkloadRequest,
    ) -> LearningCycleResult<PlannedWorkload> {
        self.planner.plan_split_workload(request).await
    }

    /// Completes a task and runs the finalization check.
    ///
    /// # Errors
    ///
    /// See [`TaskCompletionService::complete_task`].
    pub async fn complete_task(
        &self,
        task_id: TaskId,
        actual_minutes: Option<u32>,
    ) -> LearningCycleResult<CompletedTask> {
        self.completion.complete_task(task_id, actual_minutes).await
    }

    /// Records partial progress on a task.
    ///
    /// # Errors
    ///
    /// See [`TaskCompletionService::record_progress`].
    pub async fn record_progress(
        &self,
        task_id: TaskId,
        completed_units: u32,
    ) -> LearningCycleResult<CompletedTask> {
        self.completion
            .record_progress(task_id, completed_units)
            .await
    }

    /// Records a task's mistakes and queues reviews, then completes it and
    /// runs the finalization check.
    ///
    /// The new review tasks are children of the workload, so a workload with
    /// mistakes is not finalized until they are done too. The task is only
    /// completed once its reviews are stored, so a failed submission leaves
    /// it open and can be retried.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::record_mistakes_and_regenerate`] and
    /// the completion errors of [`Self::complete_task`].
    pub async fn complete_task_with_mistakes(
        &self,
        task_id: TaskId,
        actual_minutes: Option<u32>,
        mistakes: MistakeReport,
    ) -> LearningCycleResult<CompletionWithReviews> {
        let task = self.completion.open_task(task_id).await?;
        let reviews = self
            .record_mistakes_and_regenerate(
                task_id,
                &mistakes.units,
                mistakes.cycle_number,
                task.assigned_to(),
                mistakes.test_period_id,
            )
            .await?;
        let completed = self.completion.complete_task(task_id, actual_minutes).await?;
        Ok(CompletionWithReviews { completed, reviews })
    }

    /// Records mistakes against a task, generates review tasks under its
    /// workload and regroups the assignee's review queue.
    ///
    /// Returns the review tasks created by this call with the due dates
    /// they hold after grouping. Standalone tasks are rejected before any
    /// mistake is written.
    ///
    /// # Errors
    ///
    /// Returns [`LearningCycleError::NotFound`] when the task or its
    /// workload is missing, [`LearningCycleError::Domain`] when the task is
    /// standalone, or [`LearningCycleError::Store`] on persistence failures.
    pub async fn record_mistakes_and_regenerate(
        &self,
        task_id: TaskId,
        units: &[u32],
        cycle_number: CycleNumber,
        assignee: UserId,
        test_period_id: Option<TestPeriodId>,
    ) -> LearningCycleResult<Vec<Task>> {
        if units.is_empty() {
            return Ok(Vec::new());
        }
        let task = self
            .store
            .find_by_id(task_id)
            .await?
            .ok_or(LearningCycleError::NotFound(task_id))?;
        let parent_task_id = match task.kind() {
            TaskKind::Single => return Err(TaskDomainError::NotAParent(task_id).into()),
            TaskKind::Parent => task_id,
            TaskKind::Subtask { parent_id } => parent_id,
        };

        self.recorder.record(task_id, units, cycle_number).await?;
        let request = ReviewRequest {
            parent_task_id,
            units: units.to_vec(),
            assignee,
            test_period_id,
        };
        let created = self.reviews.generate(&request).await?;
        let created_ids: HashSet<TaskId> = created.iter().map(Task::id).collect();

        let queue = self.reviews.group(assignee, test_period_id).await?;
        Ok(queue
            .into_iter()
            .filter(|review| created_ids.contains(&review.id()))
            .collect())
    }

    /// Copies a template workload to a grade or explicit learners.
    ///
    /// # Errors
    ///
    /// See [`DistributionService::distribute`].
    pub async fn distribute_task(
        &self,
        request: DistributeTaskRequest,
    ) -> LearningCycleResult<DistributionReport> {
        self.distribution.distribute(request).await
    }
}
