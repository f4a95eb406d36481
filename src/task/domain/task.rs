//! Task aggregate root and the enumerations that classify it.

use super::{
    CycleNumber, ParseTaskFieldError, TaskDomainError, TaskId, TestPeriodId, UnitRange, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Implements `as_str` and `TryFrom<&str>` for a storage-backed enum.
macro_rules! storage_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Returns the canonical storage representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ParseTaskFieldError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                let normalized = value.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseTaskFieldError::new($label, value)),
                }
            }
        }
    };
}

/// Position of a task in its workload tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// A standalone task with no children.
    Single,
    /// A bulk workload container whose children are subtasks.
    Parent,
    /// A day-sliced, mistake-sliced or finalization child of a parent.
    Subtask {
        /// The owning parent task.
        parent_id: TaskId,
    },
}

impl TaskKind {
    /// Returns the storage tag for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Parent => "parent",
            Self::Subtask { .. } => "subtask",
        }
    }

    /// Rebuilds a kind from its storage tag and optional parent reference.
    ///
    /// # Errors
    ///
    /// Returns [`ParseTaskFieldError`] when the tag is unknown or when the
    /// parent reference does not agree with the tag.
    pub fn from_parts(tag: &str, parent_id: Option<TaskId>) -> Result<Self, ParseTaskFieldError> {
        match (tag.trim().to_ascii_lowercase().as_str(), parent_id) {
            ("single", None) => Ok(Self::Single),
            ("parent", None) => Ok(Self::Parent),
            ("subtask", Some(parent)) => Ok(Self::Subtask { parent_id: parent }),
            _ => Err(ParseTaskFieldError::new("task type", tag)),
        }
    }

    /// Returns the parent reference of a subtask.
    #[must_use]
    pub const fn parent_id(self) -> Option<TaskId> {
        match self {
            Self::Subtask { parent_id } => Some(parent_id),
            Self::Single | Self::Parent => None,
        }
    }
}

/// Semantic label of a learning cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStage {
    /// First pass through the material.
    Overview,
    /// Review of mistaken units.
    Review,
    /// Consolidation pass.
    Mastery,
    /// Final mastery check.
    Perfect,
}

storage_enum!(LearningStage, "learning stage", {
    Overview => "overview",
    Review => "review",
    Mastery => "mastery",
    Perfect => "perfect",
});

/// Unit in which a workload is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    /// Textbook or workbook pages.
    Pages,
    /// Numbered problems.
    Problems,
    /// Hours of study.
    Hours,
    /// Chapter sections.
    Sections,
}

storage_enum!(UnitType, "unit type", {
    Pages => "pages",
    Problems => "problems",
    Hours => "hours",
    Sections => "sections",
});

impl UnitType {
    /// Returns the singular label used in generated titles.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Pages => "page",
            Self::Problems => "problem",
            Self::Hours => "hour",
            Self::Sections => "section",
        }
    }
}

/// Task progress status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// No work recorded yet.
    NotStarted,
    /// Some units are done.
    InProgress,
    /// All work is done.
    Completed,
}

storage_enum!(TaskStatus, "task status", {
    NotStarted => "not_started",
    InProgress => "in_progress",
    Completed => "completed",
});

impl TaskStatus {
    /// Statuses that keep a workload from being considered complete.
    pub const OPEN: [Self; 2] = [Self::NotStarted, Self::InProgress];

    /// Returns `true` when the task still has outstanding work.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// Parameter object for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Human-readable title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Position in the workload tree.
    pub kind: TaskKind,
    /// Learning cycle the task belongs to.
    pub cycle_number: CycleNumber,
    /// Semantic label of the cycle.
    pub learning_stage: LearningStage,
    /// Unit the workload is measured in.
    pub unit_type: UnitType,
    /// Number of units in the workload.
    pub total_units: u32,
    /// Numbered units covered, when the content is numbered.
    pub unit_range: Option<UnitRange>,
    /// Expected effort in minutes.
    pub estimated_minutes: Option<u32>,
    /// First day the task is meant to be worked on.
    pub start_date: Option<NaiveDate>,
    /// Day the task is due.
    pub due_date: NaiveDate,
    /// Learner who owns the task.
    pub assigned_to: UserId,
    /// User who created the task.
    pub created_by: UserId,
    /// Test period the task belongs to.
    pub test_period_id: Option<TestPeriodId>,
    /// Whether the task was produced by distribution.
    pub is_shared: bool,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    kind: TaskKind,
    cycle_number: CycleNumber,
    learning_stage: LearningStage,
    unit_type: UnitType,
    total_units: u32,
    completed_units: u32,
    unit_range: Option<UnitRange>,
    estimated_minutes: Option<u32>,
    actual_minutes: Option<u32>,
    start_date: Option<NaiveDate>,
    due_date: NaiveDate,
    status: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
    assigned_to: UserId,
    created_by: UserId,
    test_period_id: Option<TestPeriodId>,
    is_shared: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted tree position.
    pub kind: TaskKind,
    /// Persisted cycle number.
    pub cycle_number: CycleNumber,
    /// Persisted learning stage.
    pub learning_stage: LearningStage,
    /// Persisted unit type.
    pub unit_type: UnitType,
    /// Persisted workload size.
    pub total_units: u32,
    /// Persisted progress.
    pub completed_units: u32,
    /// Persisted unit range.
    pub unit_range: Option<UnitRange>,
    /// Persisted effort estimate.
    pub estimated_minutes: Option<u32>,
    /// Persisted actual effort.
    pub actual_minutes: Option<u32>,
    /// Persisted start date.
    pub start_date: Option<NaiveDate>,
    /// Persisted due date.
    pub due_date: NaiveDate,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted assignee.
    pub assigned_to: UserId,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted test period.
    pub test_period_id: Option<TestPeriodId>,
    /// Persisted distribution marker.
    pub is_shared: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new, not-yet-started task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the title is blank, the workload is
    /// empty, the unit range disagrees with the workload, or the learning
    /// stage is not allowed for the task kind.
    pub fn new(fields: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = fields.title.trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        validate_workload(fields.total_units, fields.unit_range)?;
        if fields.learning_stage == LearningStage::Perfect
            && !matches!(fields.kind, TaskKind::Subtask { .. })
        {
            return Err(TaskDomainError::PerfectStageRequiresSubtask);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            title: title.to_owned(),
            description: fields.description,
            kind: fields.kind,
            cycle_number: fields.cycle_number,
            learning_stage: fields.learning_stage,
            unit_type: fields.unit_type,
            total_units: fields.total_units,
            completed_units: 0,
            unit_range: fields.unit_range,
            estimated_minutes: fields.estimated_minutes,
            actual_minutes: None,
            start_date: fields.start_date,
            due_date: fields.due_date,
            status: TaskStatus::NotStarted,
            completed_at: None,
            assigned_to: fields.assigned_to,
            created_by: fields.created_by,
            test_period_id: fields.test_period_id,
            is_shared: fields.is_shared,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            kind: data.kind,
            cycle_number: data.cycle_number,
            learning_stage: data.learning_stage,
            unit_type: data.unit_type,
            total_units: data.total_units,
            completed_units: data.completed_units,
            unit_range: data.unit_range,
            estimated_minutes: data.estimated_minutes,
            actual_minutes: data.actual_minutes,
            start_date: data.start_date,
            due_date: data.due_date,
            status: data.status,
            completed_at: data.completed_at,
            assigned_to: data.assigned_to,
            created_by: data.created_by,
            test_period_id: data.test_period_id,
            is_shared: data.is_shared,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Copies this task for another assignee as a fresh, shared task.
    ///
    /// Progress, completion data and actual effort are reset; `kind`
    /// re-parents the copy when it is a subtask.
    #[must_use]
    pub fn share_copy(&self, assignee: UserId, kind: TaskKind, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: self.title.clone(),
            description: self.description.clone(),
            kind,
            cycle_number: self.cycle_number,
            learning_stage: self.learning_stage,
            unit_type: self.unit_type,
            total_units: self.total_units,
            completed_units: 0,
            unit_range: self.unit_range,
            estimated_minutes: self.estimated_minutes,
            actual_minutes: None,
            start_date: self.start_date,
            due_date: self.due_date,
            status: TaskStatus::NotStarted,
            completed_at: None,
            assigned_to: assignee,
            created_by: self.created_by,
            test_period_id: self.test_period_id,
            is_shared: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task's position in its workload tree.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the parent task for subtasks.
    #[must_use]
    pub const fn parent_id(&self) -> Option<TaskId> {
        self.kind.parent_id()
    }

    /// Returns the learning cycle number.
    #[must_use]
    pub const fn cycle_number(&self) -> CycleNumber {
        self.cycle_number
    }

    /// Returns the learning stage.
    #[must_use]
    pub const fn learning_stage(&self) -> LearningStage {
        self.learning_stage
    }

    /// Returns the workload unit type.
    #[must_use]
    pub const fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    /// Returns the workload size.
    #[must_use]
    pub const fn total_units(&self) -> u32 {
        self.total_units
    }

    /// Returns the number of completed units.
    #[must_use]
    pub const fn completed_units(&self) -> u32 {
        self.completed_units
    }

    /// Returns the numbered units covered, if any.
    #[must_use]
    pub const fn unit_range(&self) -> Option<UnitRange> {
        self.unit_range
    }

    /// Returns the effort estimate in minutes.
    #[must_use]
    pub const fn estimated_minutes(&self) -> Option<u32> {
        self.estimated_minutes
    }

    /// Returns the reported effort in minutes.
    #[must_use]
    pub const fn actual_minutes(&self) -> Option<u32> {
        self.actual_minutes
    }

    /// Returns the planned start date.
    #[must_use]
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Returns the progress status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the completion timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the assignee.
    #[must_use]
    pub const fn assigned_to(&self) -> UserId {
        self.assigned_to
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the test period.
    #[must_use]
    pub const fn test_period_id(&self) -> Option<TestPeriodId> {
        self.test_period_id
    }

    /// Returns `true` when the task was created by distribution.
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        self.is_shared
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` for the cycle-3 mastery check of a workload.
    #[must_use]
    pub fn is_finalization(&self) -> bool {
        matches!(self.kind, TaskKind::Subtask { .. })
            && self.cycle_number == CycleNumber::FINAL
            && self.learning_stage == LearningStage::Perfect
    }

    /// Records partial progress.
    ///
    /// Progress moves a not-started task to `in_progress`. Reaching the full
    /// workload does not complete the task; completion is an explicit step.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskAlreadyCompleted`] for completed tasks
    /// and [`TaskDomainError::ProgressExceedsTotal`] when `completed_units`
    /// exceeds the workload.
    pub fn record_progress(
        &mut self,
        completed_units: u32,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_open()?;
        if completed_units > self.total_units {
            return Err(TaskDomainError::ProgressExceedsTotal {
                task_id: self.id,
                completed: completed_units,
                total: self.total_units,
            });
        }
        self.completed_units = completed_units;
        if completed_units > 0 {
            self.status = TaskStatus::InProgress;
        }
        self.touch(clock);
        Ok(())
    }

    /// Marks the task as completed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskAlreadyCompleted`] when the task was
    /// already completed.
    pub fn complete(
        &mut self,
        actual_minutes: Option<u32>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_open()?;
        let timestamp = clock.utc();
        self.status = TaskStatus::Completed;
        self.completed_units = self.total_units;
        self.completed_at = Some(timestamp);
        if actual_minutes.is_some() {
            self.actual_minutes = actual_minutes;
        }
        self.updated_at = timestamp;
        Ok(())
    }

    /// Moves the due date.
    pub fn reschedule(&mut self, due_date: NaiveDate, clock: &impl Clock) {
        self.due_date = due_date;
        self.touch(clock);
    }

    const fn ensure_open(&self) -> Result<(), TaskDomainError> {
        if self.status.is_open() {
            Ok(())
        } else {
            Err(TaskDomainError::TaskAlreadyCompleted(self.id))
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn validate_workload(total_units: u32, unit_range: Option<UnitRange>) -> Result<(), TaskDomainError> {
    if total_units == 0 {
        return Err(TaskDomainError::ZeroTotalUnits);
    }
    if let Some(range) = unit_range {
        if range.len() != u64::from(total_units) {
            return Err(TaskDomainError::UnitRangeMismatch {
                total_units,
                range_len: range.len(),
            });
        }
    }
    Ok(())
}
