//! Mistake records and review relationship edges.

use super::{CycleNumber, MistakeId, RelationshipId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A unit answered incorrectly during a learning cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mistake {
    id: MistakeId,
    task_id: TaskId,
    unit: u32,
    cycle_number: CycleNumber,
    recorded_at: DateTime<Utc>,
}

impl Mistake {
    /// Creates a mistake record for a unit of a task.
    #[must_use]
    pub fn new(task_id: TaskId, unit: u32, cycle_number: CycleNumber, clock: &impl Clock) -> Self {
        Self {
            id: MistakeId::new(),
            task_id,
            unit,
            cycle_number,
            recorded_at: clock.utc(),
        }
    }

    /// Reconstructs a mistake from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: MistakeId,
        task_id: TaskId,
        unit: u32,
        cycle_number: CycleNumber,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            unit,
            cycle_number,
            recorded_at,
        }
    }

    /// Returns the mistake identifier.
    #[must_use]
    pub const fn id(&self) -> MistakeId {
        self.id
    }

    /// Returns the task the mistake was recorded against.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the mistaken unit.
    #[must_use]
    pub const fn unit(&self) -> u32 {
        self.unit
    }

    /// Returns the cycle during which the mistake was made.
    #[must_use]
    pub const fn cycle_number(&self) -> CycleNumber {
        self.cycle_number
    }

    /// Returns when the mistake was recorded.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Append-only edge linking a generated review task to its workload unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRelationship {
    id: RelationshipId,
    parent_task_id: TaskId,
    child_task_id: TaskId,
    cycle_number: CycleNumber,
    unit: u32,
    created_at: DateTime<Utc>,
}

impl TaskRelationship {
    /// Creates a relationship edge.
    #[must_use]
    pub fn new(
        parent_task_id: TaskId,
        child_task_id: TaskId,
        cycle_number: CycleNumber,
        unit: u32,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: RelationshipId::new(),
            parent_task_id,
            child_task_id,
            cycle_number,
            unit,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a relationship from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: RelationshipId,
        parent_task_id: TaskId,
        child_task_id: TaskId,
        cycle_number: CycleNumber,
        unit: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            parent_task_id,
            child_task_id,
            cycle_number,
            unit,
            created_at,
        }
    }

    /// Returns the relationship identifier.
    #[must_use]
    pub const fn id(&self) -> RelationshipId {
        self.id
    }

    /// Returns the originating workload task.
    #[must_use]
    pub const fn parent_task_id(&self) -> TaskId {
        self.parent_task_id
    }

    /// Returns the generated review task.
    #[must_use]
    pub const fn child_task_id(&self) -> TaskId {
        self.child_task_id
    }

    /// Returns the cycle of the generated task.
    #[must_use]
    pub const fn cycle_number(&self) -> CycleNumber {
        self.cycle_number
    }

    /// Returns the original unit the review task covers.
    #[must_use]
    pub const fn unit(&self) -> u32 {
        self.unit
    }

    /// Returns when the edge was recorded.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
