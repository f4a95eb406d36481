//! Shared fixtures for service tests.

use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{
        CycleNumber, LearningStage, Mistake, NewTask, Task, TaskId, TaskKind, TaskRelationship,
        UnitType, UserId,
    },
    ports::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Freezes the clock at 09:00 UTC on the given day.
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        )
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Builds an unsaved cycle-1 task of the given kind.
pub fn task(kind: TaskKind, total_units: u32, due_date: NaiveDate, owner: UserId) -> Task {
    Task::new(
        NewTask {
            title: "Algebra workbook".to_owned(),
            description: None,
            kind,
            cycle_number: CycleNumber::INITIAL,
            learning_stage: LearningStage::Overview,
            unit_type: UnitType::Pages,
            total_units,
            unit_range: None,
            estimated_minutes: Some(60),
            start_date: None,
            due_date,
            assigned_to: owner,
            created_by: owner,
            test_period_id: None,
            is_shared: false,
        },
        &FixedClock::on(2024, 5, 1),
    )
    .expect("valid task")
}

/// Stores a parent with `subtasks` one-unit children and returns both.
pub async fn seed_workload(
    store: &InMemoryTaskStore,
    subtasks: usize,
    owner: UserId,
) -> (Task, Vec<Task>) {
    let parent = task(TaskKind::Parent, 10, date(2024, 5, 10), owner);
    store.store_task(&parent).await.expect("store parent");
    let mut children = Vec::with_capacity(subtasks);
    for _ in 0..subtasks {
        let child = task(
            TaskKind::Subtask {
                parent_id: parent.id(),
            },
            1,
            date(2024, 5, 5),
            owner,
        );
        store.store_task(&child).await.expect("store subtask");
        children.push(child);
    }
    (parent, children)
}

/// In-memory store whose relationship writes fail until [`Self::recover`].
pub struct EdgeFailingStore {
    pub inner: InMemoryTaskStore,
    failing: AtomicBool,
}

impl EdgeFailingStore {
    pub fn failing() -> Self {
        Self {
            inner: InMemoryTaskStore::new(),
            failing: AtomicBool::new(true),
        }
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskStore for EdgeFailingStore {
    async fn store_task(&self, task: &Task) -> TaskStoreResult<()> {
        self.inner.store_task(task).await
    }

    async fn update_task(&self, task: &Task) -> TaskStoreResult<()> {
        self.inner.update_task(task).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.inner.find_by_id(id).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>> {
        self.inner.list_tasks(filter).await
    }

    async fn delete_task(&self, id: TaskId) -> TaskStoreResult<()> {
        self.inner.delete_task(id).await
    }

    async fn record_mistakes(&self, mistakes: &[Mistake]) -> TaskStoreResult<()> {
        self.inner.record_mistakes(mistakes).await
    }

    async fn list_mistakes(
        &self,
        task_id: TaskId,
        cycle_number: Option<CycleNumber>,
    ) -> TaskStoreResult<Vec<Mistake>> {
        self.inner.list_mistakes(task_id, cycle_number).await
    }

    async fn store_relationship(&self, relationship: &TaskRelationship) -> TaskStoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TaskStoreError::persistence(std::io::Error::other(
                "edge write failed",
            )));
        }
        self.inner.store_relationship(relationship).await
    }

    async fn list_relationships(
        &self,
        parent_task_id: TaskId,
    ) -> TaskStoreResult<Vec<TaskRelationship>> {
        self.inner.list_relationships(parent_task_id).await
    }
}
