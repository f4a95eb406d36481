//! Mistake recorder.

use super::error::{LearningCycleError, LearningCycleResult};
use crate::task::{
    domain::{CycleNumber, Mistake, TaskId},
    ports::TaskStore,
};
use mockable::Clock;
use std::sync::Arc;

/// Persists missed-unit marks against a task.
///
/// Repeated calls for the same unit create repeated records; callers record
/// once per completion.
#[derive(Clone)]
pub struct MistakeRecorder<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> MistakeRecorder<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new recorder.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Records one mistake per unit for `task_id` during `cycle_number`.
    ///
    /// An empty unit list writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LearningCycleError::NotFound`] when the task does not exist,
    /// or [`LearningCycleError::Store`] when persistence fails.
    pub async fn record(
        &self,
        task_id: TaskId,
        units: &[u32],
        cycle_number: CycleNumber,
    ) -> LearningCycleResult<Vec<Mistake>> {
        if units.is_empty() {
            return Ok(Vec::new());
        }
        if self.store.find_by_id(task_id).await?.is_none() {
            return Err(LearningCycleError::NotFound(task_id));
        }

        let mistakes: Vec<Mistake> = units
            .iter()
            .map(|unit| Mistake::new(task_id, *unit, cycle_number, &*self.clock))
            .collect();
        self.store.record_mistakes(&mistakes).await?;
        tracing::debug!(%task_id, %cycle_number, count = mistakes.len(), "recorded mistakes");
        Ok(mistakes)
    }
}
