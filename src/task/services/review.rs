//! Review task generator: turns recorded mistakes into a paced cycle-2
//! queue.

use super::{
    config::CycleConfig,
    error::{LearningCycleError, LearningCycleResult},
};
use crate::task::{
    domain::{
        CycleNumber, LearningStage, ReviewTarget, Task, TaskId, TaskRelationship, TaskStatus,
        TestPeriodId, UserId, add_days, build_review_task, review_due_offset,
        schedule_review_queue,
    },
    ports::{TaskFilter, TaskStore},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;

/// Mistaken units of one workload, to be reviewed by one learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    /// Workload the units belong to.
    pub parent_task_id: TaskId,
    /// Mistaken units, in the order they should be reviewed.
    pub units: Vec<u32>,
    /// Learner doing the review.
    pub assignee: UserId,
    /// Test period of the review queue.
    pub test_period_id: Option<TestPeriodId>,
}

/// Review task generation service.
#[derive(Clone)]
pub struct ReviewTaskGenerator<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: CycleConfig,
}

impl<S, C> ReviewTaskGenerator<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new generator.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, config: CycleConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Creates one cycle-2 review subtask per mistaken unit and links each
    /// back to the workload.
    ///
    /// Unit `i` is due `ceil((i + 1) / review_units_per_day)` days from
    /// today. If any write fails, tasks created by this call are deleted on
    /// a best-effort basis and the original error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`LearningCycleError::NotFound`] when the workload does not
    /// exist, [`LearningCycleError::Domain`] when it is not a parent task,
    /// or [`LearningCycleError::Store`] when persistence fails.
    pub async fn generate(&self, request: &ReviewRequest) -> LearningCycleResult<Vec<Task>> {
        if request.units.is_empty() {
            return Ok(Vec::new());
        }
        let parent = self
            .store
            .find_by_id(request.parent_task_id)
            .await?
            .ok_or(LearningCycleError::NotFound(request.parent_task_id))?;

        let today = self.clock.utc().date_naive();
        let daily = self.config.review_units_per_day;
        let reviews = request
            .units
            .iter()
            .enumerate()
            .map(|(index, unit)| -> LearningCycleResult<Task> {
                let target = ReviewTarget {
                    unit: *unit,
                    due_date: add_days(today, review_due_offset(index, daily))?,
                    assignee: request.assignee,
                    test_period_id: request.test_period_id,
                };
                Ok(build_review_task(&parent, target, &*self.clock)?)
            })
            .collect::<LearningCycleResult<Vec<_>>>()?;

        let mut created = Vec::with_capacity(reviews.len());
        for (review, unit) in reviews.iter().zip(&request.units) {
            if let Err(err) = self.store_review(&parent, review, *unit, &mut created).await {
                self.discard(&created).await;
                return Err(err);
            }
        }

        tracing::debug!(
            parent_id = %parent.id(),
            assignee = %request.assignee,
            count = reviews.len(),
            "generated review tasks"
        );
        Ok(reviews)
    }

    /// Re-paces every not-started review task of an assignee and test
    /// period into one daily queue.
    ///
    /// Tasks are ordered by current due date and bucketed
    /// `review_units_per_day` per day; group `k` is due `today + k + 1`.
    /// Only tasks whose due date changes are written. Returns the queue in
    /// its new order.
    ///
    /// A `test_period_id` of `None` does not narrow the queue: every
    /// not-started review task of the assignee is regrouped, whatever its
    /// test period.
    ///
    /// # Errors
    ///
    /// Returns [`LearningCycleError::Store`] when persistence fails.
    pub async fn group(
        &self,
        assignee: UserId,
        test_period_id: Option<TestPeriodId>,
    ) -> LearningCycleResult<Vec<Task>> {
        let filter = TaskFilter::new()
            .with_assignee(assignee)
            .with_test_period(test_period_id)
            .with_cycle(CycleNumber::REVIEW)
            .with_learning_stage(LearningStage::Review)
            .with_statuses([TaskStatus::NotStarted]);
        let queue = self.store.list_tasks(&filter).await?;

        let today = self.clock.utc().date_naive();
        let schedule = schedule_review_queue(&queue, self.config.review_units_per_day, today)?;
        let mut by_id: HashMap<TaskId, Task> =
            queue.into_iter().map(|task| (task.id(), task)).collect();

        let mut regrouped = Vec::with_capacity(schedule.len());
        let mut moved = 0_usize;
        for entry in schedule {
            let Some(mut task) = by_id.remove(&entry.task_id) else {
                continue;
            };
            if task.due_date() != entry.due_date {
                task.reschedule(entry.due_date, &*self.clock);
                self.store.update_task(&task).await?;
                moved += 1;
            }
            regrouped.push(task);
        }

        tracing::debug!(%assignee, queued = regrouped.len(), moved, "regrouped review queue");
        Ok(regrouped)
    }

    async fn store_review(
        &self,
        parent: &Task,
        review: &Task,
        unit: u32,
        created: &mut Vec<TaskId>,
    ) -> LearningCycleResult<()> {
        self.store.store_task(review).await?;
        created.push(review.id());
        let edge = TaskRelationship::new(
            parent.id(),
            review.id(),
            CycleNumber::REVIEW,
            unit,
            &*self.clock,
        );
        self.store.store_relationship(&edge).await?;
        Ok(())
    }

    async fn discard(&self, created: &[TaskId]) {
        for task_id in created {
            if let Err(err) = self.store.delete_task(*task_id).await {
                tracing::warn!(%task_id, error = %err, "failed to discard review task");
            }
        }
    }
}
