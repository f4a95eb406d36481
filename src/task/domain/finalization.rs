//! Aggregate completion of a workload and its cycle-3 mastery check.

use super::{
    CycleNumber, LearningStage, NewTask, Task, TaskDomainError, TaskId, TaskKind, review::add_days,
};
use mockable::Clock;

/// Aggregate completion state of a parent workload.
///
/// Transitions are driven by subtask completion events:
/// `Incomplete -> AllSubtasksDone -> Finalized`. `Finalized` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadProgress {
    /// At least one subtask is still open.
    Incomplete {
        /// Number of open subtasks.
        open_subtasks: usize,
    },
    /// Every subtask is complete and no mastery check exists yet.
    AllSubtasksDone,
    /// The mastery check has been created.
    Finalized {
        /// The existing finalization task.
        finalization_id: TaskId,
    },
}

impl WorkloadProgress {
    /// Derives the state from the open-subtask count and any existing
    /// finalization task.
    ///
    /// Open work takes precedence: a finalization task that is itself still
    /// open counts as open work.
    #[must_use]
    pub const fn assess(open_subtasks: usize, finalization: Option<TaskId>) -> Self {
        if open_subtasks > 0 {
            return Self::Incomplete { open_subtasks };
        }
        match finalization {
            Some(finalization_id) => Self::Finalized { finalization_id },
            None => Self::AllSubtasksDone,
        }
    }

    /// Returns `true` when a finalization task should be created.
    #[must_use]
    pub const fn needs_finalization(self) -> bool {
        matches!(self, Self::AllSubtasksDone)
    }
}

/// Scheduling rules for the mastery check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizationRules {
    /// Days after the parent's due date.
    pub offset_days: u32,
    /// Share of the parent's estimate, in percent.
    pub time_percent: u32,
}

/// Builds the single cycle-3 finalization task for `parent`.
///
/// # Errors
///
/// Returns [`TaskDomainError::NotAParent`] when `parent` is not a bulk
/// workload container, or [`TaskDomainError::DateOutOfRange`] when the due
/// date cannot be computed.
pub fn build_finalization_task(
    parent: &Task,
    rules: FinalizationRules,
    clock: &impl Clock,
) -> Result<Task, TaskDomainError> {
    if parent.kind() != TaskKind::Parent {
        return Err(TaskDomainError::NotAParent(parent.id()));
    }
    let due_date = add_days(parent.due_date(), u64::from(rules.offset_days))?;
    let estimated_minutes = parent.estimated_minutes().map(|minutes| {
        let share = (u64::from(minutes) * u64::from(rules.time_percent)).div_ceil(100);
        u32::try_from(share).unwrap_or(minutes)
    });

    Task::new(
        NewTask {
            title: format!("{} mastery check", parent.title()),
            description: parent.description().map(str::to_owned),
            kind: TaskKind::Subtask {
                parent_id: parent.id(),
            },
            cycle_number: CycleNumber::FINAL,
            learning_stage: LearningStage::Perfect,
            unit_type: parent.unit_type(),
            total_units: parent.total_units(),
            unit_range: parent.unit_range(),
            estimated_minutes,
            start_date: None,
            due_date,
            assigned_to: parent.assigned_to(),
            created_by: parent.created_by(),
            test_period_id: parent.test_period_id(),
            is_shared: parent.is_shared(),
        },
        clock,
    )
}
