//! Shared world state for learning-cycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use studycycle::task::{
    adapters::memory::{InMemoryStudentDirectory, InMemoryTaskStore},
    domain::{Task, UserId},
    services::{CycleConfig, LearningCycleEngine, PlannedWorkload},
};

/// Engine type used by the BDD world.
pub type TestEngine = LearningCycleEngine<InMemoryTaskStore, InMemoryStudentDirectory, DefaultClock>;

/// Scenario world for learning-cycle behaviour tests.
pub struct LearningCycleWorld {
    pub store: Arc<InMemoryTaskStore>,
    pub engine: TestEngine,
    pub learner: Option<UserId>,
    pub planned: Option<PlannedWorkload>,
    pub reviews: Vec<Task>,
}

impl LearningCycleWorld {
    /// Creates a world with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTaskStore::new());
        let engine = LearningCycleEngine::new(
            Arc::clone(&store),
            Arc::new(InMemoryStudentDirectory::new()),
            Arc::new(DefaultClock),
            CycleConfig::default(),
        );

        Self {
            store,
            engine,
            learner: None,
            planned: None,
            reviews: Vec::new(),
        }
    }

    /// Returns the planned workload or a scenario error.
    pub fn planned(&self) -> Result<&PlannedWorkload, eyre::Report> {
        self.planned
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing planned workload in scenario world"))
    }
}

impl Default for LearningCycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LearningCycleWorld {
    LearningCycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a comma-separated list of unit numbers.
pub fn parse_units(list: &str) -> Result<Vec<u32>, eyre::Report> {
    list.split(',')
        .map(|unit| {
            unit.trim()
                .parse::<u32>()
                .map_err(|err| eyre::eyre!("invalid unit {unit:?}: {err}"))
        })
        .collect()
}
