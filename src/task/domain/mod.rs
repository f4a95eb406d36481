//! Domain model for learning-cycle task management.
//!
//! The domain models workload trees (parent tasks with day-sliced,
//! review and finalization subtasks), the pacing rules that generate them,
//! and mistake tracking, while keeping all infrastructure concerns outside
//! of the domain boundary.

mod error;
mod finalization;
mod ids;
mod mistake;
mod plan;
mod review;
mod task;

pub use error::{ParseTaskFieldError, PlanError, TaskDomainError};
pub use finalization::{FinalizationRules, WorkloadProgress, build_finalization_task};
pub use ids::{CycleNumber, GradeId, MistakeId, RelationshipId, TaskId, TestPeriodId, UnitRange, UserId};
pub use mistake::{Mistake, TaskRelationship};
pub use plan::{DailySlice, Pacing, SplitPlan, SplitPlanInput};
pub use review::{
    ReviewTarget, ScheduledReview, add_days, build_review_task, review_due_offset,
    schedule_review_queue,
};
pub use task::{
    LearningStage, NewTask, PersistedTaskData, Task, TaskKind, TaskStatus, UnitType,
};
