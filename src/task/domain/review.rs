//! Review-cycle task construction and daily pacing.

use super::{
    CycleNumber, LearningStage, NewTask, Task, TaskDomainError, TaskId, TaskKind, TestPeriodId,
    UnitRange, UserId, plan::proportional_minutes,
};
use chrono::{DateTime, Days, NaiveDate, Utc};
use mockable::Clock;
use std::num::NonZeroU32;

/// Days from today until the review task at `index` (zero-based) is due.
///
/// Units are bucketed `daily_pages` per day starting tomorrow.
#[must_use]
pub fn review_due_offset(index: usize, daily_pages: NonZeroU32) -> u64 {
    let position = u64::try_from(index).unwrap_or(u64::MAX - 1) + 1;
    position.div_ceil(u64::from(daily_pages.get()))
}

/// Shifts `base` forward by `days`.
///
/// # Errors
///
/// Returns [`TaskDomainError::DateOutOfRange`] when the result leaves the
/// supported calendar range.
pub fn add_days(base: NaiveDate, days: u64) -> Result<NaiveDate, TaskDomainError> {
    base.checked_add_days(Days::new(days))
        .ok_or(TaskDomainError::DateOutOfRange { base, days })
}

/// Target of a review task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewTarget {
    /// The mistaken unit.
    pub unit: u32,
    /// Day the review is due.
    pub due_date: NaiveDate,
    /// Learner doing the review.
    pub assignee: UserId,
    /// Test period the review belongs to.
    pub test_period_id: Option<TestPeriodId>,
}

/// Builds the cycle-2 review subtask for one mistaken unit of `parent`.
///
/// # Errors
///
/// Returns [`TaskDomainError::NotAParent`] when `parent` is not a bulk
/// workload container.
pub fn build_review_task(
    parent: &Task,
    target: ReviewTarget,
    clock: &impl Clock,
) -> Result<Task, TaskDomainError> {
    if parent.kind() != TaskKind::Parent {
        return Err(TaskDomainError::NotAParent(parent.id()));
    }
    Task::new(
        NewTask {
            title: format!(
                "{} review: {} {}",
                parent.title(),
                parent.unit_type().singular(),
                target.unit
            ),
            description: None,
            kind: TaskKind::Subtask {
                parent_id: parent.id(),
            },
            cycle_number: CycleNumber::REVIEW,
            learning_stage: LearningStage::Review,
            unit_type: parent.unit_type(),
            total_units: 1,
            unit_range: Some(UnitRange::single(target.unit)),
            estimated_minutes: parent
                .estimated_minutes()
                .map(|minutes| proportional_minutes(minutes, 1, parent.total_units())),
            start_date: None,
            due_date: target.due_date,
            assigned_to: target.assignee,
            created_by: parent.created_by(),
            test_period_id: target.test_period_id,
            is_shared: false,
        },
        clock,
    )
}

/// Re-paced position of one review task in the daily queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledReview {
    /// Task being scheduled.
    pub task_id: TaskId,
    /// Zero-based day group.
    pub group_index: usize,
    /// New due date of the group.
    pub due_date: NaiveDate,
}

/// Buckets a queue of review tasks into daily groups of `daily_pages`.
///
/// Tasks are ordered by current due date, then creation time, then first
/// unit, then id.
/// Group `k` is due `today + k + 1` days.
///
/// # Errors
///
/// Returns [`TaskDomainError::DateOutOfRange`] when a group date leaves the
/// calendar range.
pub fn schedule_review_queue(
    queue: &[Task],
    daily_pages: NonZeroU32,
    today: NaiveDate,
) -> Result<Vec<ScheduledReview>, TaskDomainError> {
    let mut ordered: Vec<(NaiveDate, DateTime<Utc>, Option<u32>, TaskId)> = queue
        .iter()
        .map(|task| {
            (
                task.due_date(),
                task.created_at(),
                task.unit_range().map(UnitRange::start),
                task.id(),
            )
        })
        .collect();
    ordered.sort_unstable();

    let group_size = usize::try_from(daily_pages.get()).unwrap_or(usize::MAX);
    let mut schedule = Vec::with_capacity(ordered.len());
    for (group_index, group) in ordered.chunks(group_size).enumerate() {
        let offset = u64::try_from(group_index).unwrap_or(u64::MAX - 1) + 1;
        let due_date = add_days(today, offset)?;
        schedule.extend(group.iter().map(|(_, _, _, task_id)| ScheduledReview {
            task_id: *task_id,
            group_index,
            due_date,
        }));
    }
    Ok(schedule)
}
