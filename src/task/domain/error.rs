//! Error types for learning-cycle domain validation and parsing.

use super::TaskId;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// A task must carry at least one unit of work.
    #[error("task workload must contain at least one unit")]
    ZeroTotalUnits,

    /// Cycle numbers start at one.
    #[error("invalid cycle number {0}, expected a positive integer")]
    InvalidCycleNumber(u8),

    /// The unit range ends before it starts.
    #[error("invalid unit range {start}-{end}")]
    InvalidUnitRange {
        /// First unit of the rejected range.
        start: u32,
        /// Last unit of the rejected range.
        end: u32,
    },

    /// The unit range does not cover the task's workload.
    #[error("unit range covers {range_len} units but the task has {total_units}")]
    UnitRangeMismatch {
        /// Declared workload size.
        total_units: u32,
        /// Number of units in the range.
        range_len: u64,
    },

    /// The `perfect` stage is reserved for finalization subtasks.
    #[error("the perfect learning stage is only valid on a subtask")]
    PerfectStageRequiresSubtask,

    /// Reported progress is larger than the workload.
    #[error("task {task_id} cannot record {completed} of {total} units")]
    ProgressExceedsTotal {
        /// Task being updated.
        task_id: TaskId,
        /// Rejected completed-unit count.
        completed: u32,
        /// Workload size.
        total: u32,
    },

    /// The task has already been completed.
    #[error("task {0} is already completed")]
    TaskAlreadyCompleted(TaskId),

    /// The operation requires a parent (bulk workload) task.
    #[error("task {0} is not a parent task")]
    NotAParent(TaskId),

    /// Subtasks cannot be used as distribution templates.
    #[error("task {0} is a subtask and cannot be distributed on its own")]
    InvalidTemplate(TaskId),

    /// Date arithmetic left the supported calendar range.
    #[error("date {base} shifted by {days} days is out of range")]
    DateOutOfRange {
        /// Date being shifted.
        base: NaiveDate,
        /// Requested shift in days.
        days: u64,
    },
}

/// Error returned while parsing task enumerations from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseTaskFieldError {
    /// Name of the field being parsed.
    pub kind: &'static str,
    /// Raw value that could not be parsed.
    pub value: String,
}

impl ParseTaskFieldError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Errors returned while computing a split workload plan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The workload has no units.
    #[error("total units must be greater than zero")]
    ZeroTotalUnits,

    /// The daily pace is zero.
    #[error("daily units must be greater than zero")]
    ZeroDailyUnits,

    /// The workload must be covered at least once.
    #[error("cycle repeats must be greater than zero")]
    ZeroCycleRepeats,

    /// Automatic pacing needs an end date to size the window.
    #[error("automatic pacing requires an end date")]
    MissingEndDate,

    /// The date window contains no days.
    #[error("end date {end} precedes start date {start}")]
    EmptyWindow {
        /// Window start.
        start: NaiveDate,
        /// Window end.
        end: NaiveDate,
    },

    /// The unit range does not match the workload size.
    #[error("unit range covers {range_len} units but the workload has {total_units}")]
    UnitRangeMismatch {
        /// Declared workload size.
        total_units: u32,
        /// Number of units in the range.
        range_len: u64,
    },

    /// The derived daily pace does not fit the unit counter.
    #[error("derived daily pace is too large")]
    PaceOverflow,

    /// A due date fell outside the supported calendar range.
    #[error("due date for day {day} is out of range")]
    DateOutOfRange {
        /// Zero-based day index that overflowed.
        day: u32,
    },
}
