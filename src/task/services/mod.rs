//! Application services for the learning cycle.

mod completion;
mod config;
mod distribution;
mod engine;
mod error;
mod finalization;
mod mistakes;
mod planner;
mod review;

pub use completion::{CompletedTask, TaskCompletionService};
pub use config::CycleConfig;
pub use distribution::{DistributeTaskRequest, DistributionReport, DistributionService};
pub use engine::{CompletionWithReviews, LearningCycleEngine, MistakeReport};
pub use error::{LearningCycleError, LearningCycleResult};
pub use finalization::{FinalizationOutcome, FinalizationWatcher};
pub use mistakes::MistakeRecorder;
pub use planner::{PlannedWorkload, SplitTaskPlanner, SplitWorkloadRequest};
pub use review::{ReviewRequest, ReviewTaskGenerator};
