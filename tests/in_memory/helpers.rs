//! Shared test helpers for in-memory integration tests.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use std::sync::Arc;
use studycycle::task::{
    adapters::memory::{InMemoryStudentDirectory, InMemoryTaskStore},
    services::{CycleConfig, LearningCycleEngine},
};

/// Engine type wired to the in-memory adapters.
pub type TestEngine = LearningCycleEngine<InMemoryTaskStore, InMemoryStudentDirectory, FixedClock>;

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Engine plus direct handles on its adapters.
pub struct Harness {
    pub store: Arc<InMemoryTaskStore>,
    pub directory: Arc<InMemoryStudentDirectory>,
    pub engine: TestEngine,
}

/// Builds a date, panicking on invalid input.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Provides an engine whose clock reads 2024-05-01 09:00 UTC.
#[fixture]
pub fn harness() -> Harness {
    let store = Arc::new(InMemoryTaskStore::new());
    let directory = Arc::new(InMemoryStudentDirectory::new());
    let now = Utc
        .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    let engine = LearningCycleEngine::new(
        Arc::clone(&store),
        Arc::clone(&directory),
        Arc::new(FixedClock(now)),
        CycleConfig::default(),
    );
    Harness {
        store,
        directory,
        engine,
    }
}
