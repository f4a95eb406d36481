//! Split task planner: turns a bulk workload into daily subtasks.

use super::error::LearningCycleResult;
use crate::task::{
    domain::{
        CycleNumber, DailySlice, LearningStage, NewTask, Pacing, SplitPlan, SplitPlanInput, Task,
        TaskKind, TestPeriodId, UnitRange, UnitType, UserId,
    },
    ports::TaskStore,
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;

/// Request payload for planning a split workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitWorkloadRequest {
    title: String,
    description: Option<String>,
    total_units: u32,
    unit_type: UnitType,
    pacing: Pacing,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    cycle_repeats: u32,
    unit_range: Option<(u32, u32)>,
    estimated_minutes: Option<u32>,
    assigned_to: UserId,
    created_by: UserId,
    test_period_id: Option<TestPeriodId>,
}

impl SplitWorkloadRequest {
    /// Creates a request with the required workload fields.
    ///
    /// The workload is assigned to and created by `owner` until overridden
    /// with [`Self::with_creator`].
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        total_units: u32,
        unit_type: UnitType,
        pacing: Pacing,
        start_date: NaiveDate,
        owner: UserId,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            total_units,
            unit_type,
            pacing,
            start_date,
            end_date: None,
            cycle_repeats: 1,
            unit_range: None,
            estimated_minutes: None,
            assigned_to: owner,
            created_by: owner,
            test_period_id: None,
        }
    }

    /// Sets the workload description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the inclusive end of the study window.
    #[must_use]
    pub const fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Sets how many times the workload should fit into the window.
    #[must_use]
    pub const fn with_cycle_repeats(mut self, repeats: u32) -> Self {
        self.cycle_repeats = repeats;
        self
    }

    /// Sets the numbered content range, both ends inclusive.
    #[must_use]
    pub const fn with_unit_range(mut self, start: u32, end: u32) -> Self {
        self.unit_range = Some((start, end));
        self
    }

    /// Sets the effort estimate for the whole workload.
    #[must_use]
    pub const fn with_estimated_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    /// Sets the creator when it differs from the assignee.
    #[must_use]
    pub const fn with_creator(mut self, created_by: UserId) -> Self {
        self.created_by = created_by;
        self
    }

    /// Sets the test period.
    #[must_use]
    pub const fn with_test_period(mut self, test_period_id: TestPeriodId) -> Self {
        self.test_period_id = Some(test_period_id);
        self
    }

    fn plan_input(&self) -> LearningCycleResult<SplitPlanInput> {
        let unit_range = self
            .unit_range
            .map(|(start, end)| UnitRange::new(start, end))
            .transpose()?;
        Ok(SplitPlanInput {
            total_units: self.total_units,
            pacing: self.pacing,
            start_date: self.start_date,
            end_date: self.end_date,
            cycle_repeats: self.cycle_repeats,
            unit_range,
            estimated_minutes: self.estimated_minutes,
        })
    }
}

/// A materialised workload tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWorkload {
    /// The bulk container task.
    pub parent: Task,
    /// Day-sliced subtasks in day order.
    pub subtasks: Vec<Task>,
}

/// Split task planning service.
#[derive(Clone)]
pub struct SplitTaskPlanner<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> SplitTaskPlanner<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new planner.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Computes the daily plan without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`super::LearningCycleError::InvalidPlan`] for invalid pacing
    /// or dates, or [`super::LearningCycleError::Domain`] for an invalid
    /// unit range.
    pub fn preview(&self, request: &SplitWorkloadRequest) -> LearningCycleResult<SplitPlan> {
        Ok(SplitPlan::compute(&request.plan_input()?)?)
    }

    /// Plans a workload and stores the parent followed by each subtask.
    ///
    /// Every task is validated before the first write. Store failures after
    /// the first write leave the already-stored tasks in place.
    ///
    /// # Errors
    ///
    /// Returns [`super::LearningCycleError`] when the plan is invalid or the
    /// store rejects a write.
    pub async fn plan_split_workload(
        &self,
        request: SplitWorkloadRequest,
    ) -> LearningCycleResult<PlannedWorkload> {
        let plan = self.preview(&request)?;
        let due_date = request
            .end_date
            .or_else(|| plan.last_due_date())
            .unwrap_or(request.start_date);

        let parent = Task::new(
            NewTask {
                title: request.title.clone(),
                description: request.description.clone(),
                kind: TaskKind::Parent,
                cycle_number: CycleNumber::INITIAL,
                learning_stage: LearningStage::Overview,
                unit_type: request.unit_type,
                total_units: request.total_units,
                unit_range: request.plan_input()?.unit_range,
                estimated_minutes: request.estimated_minutes,
                start_date: Some(request.start_date),
                due_date,
                assigned_to: request.assigned_to,
                created_by: request.created_by,
                test_period_id: request.test_period_id,
                is_shared: false,
            },
            &*self.clock,
        )?;
        let subtasks = plan
            .slices()
            .iter()
            .map(|slice| self.subtask_for(&parent, slice))
            .collect::<LearningCycleResult<Vec<_>>>()?;

        self.store.store_task(&parent).await?;
        for subtask in &subtasks {
            self.store.store_task(subtask).await?;
        }

        tracing::debug!(
            parent_id = %parent.id(),
            days = plan.day_count(),
            daily_units = plan.daily_units(),
            "planned split workload"
        );
        Ok(PlannedWorkload { parent, subtasks })
    }

    fn subtask_for(&self, parent: &Task, slice: &DailySlice) -> LearningCycleResult<Task> {
        let day = slice.day_index + 1;
        let title = match slice.unit_range {
            Some(range) => format!(
                "{} day {day} ({} {range})",
                parent.title(),
                parent.unit_type().as_str()
            ),
            None => format!("{} day {day}", parent.title()),
        };
        Ok(Task::new(
            NewTask {
                title,
                description: None,
                kind: TaskKind::Subtask {
                    parent_id: parent.id(),
                },
                cycle_number: CycleNumber::INITIAL,
                learning_stage: LearningStage::Overview,
                unit_type: parent.unit_type(),
                total_units: slice.units,
                unit_range: slice.unit_range,
                estimated_minutes: slice.estimated_minutes,
                start_date: Some(slice.due_date),
                due_date: slice.due_date,
                assigned_to: parent.assigned_to(),
                created_by: parent.created_by(),
                test_period_id: parent.test_period_id(),
                is_shared: false,
            },
            &*self.clock,
        )?)
    }
}
