//! `PostgreSQL` task store implementation.

use super::{
    models::{MistakeRow, NewTaskRow, RelationshipRow, TaskChangeset, TaskIdentityColumns, TaskRow},
    schema::{task_mistakes, task_relationships, tasks},
};
use crate::task::{
    domain::{
        CycleNumber, LearningStage, Mistake, MistakeId, PersistedTaskData, RelationshipId, Task,
        TaskId, TaskKind, TaskRelationship, TaskStatus, TestPeriodId, UnitRange, UnitType, UserId,
    },
    ports::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the learning-cycle adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Partial unique index allowing one finalization task per parent.
const FINALIZATION_UNIQUE_INDEX: &str = "idx_tasks_finalization_unique";

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn store_task(&self, task: &Task) -> TaskStoreResult<()> {
        let task_id = task.id();
        let parent_id = task.parent_id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match (err, parent_id) {
                    (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info), Some(parent))
                        if is_finalization_violation(info.as_ref()) =>
                    {
                        TaskStoreError::DuplicateFinalization { parent_id: parent }
                    }
                    (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _), _) => {
                        TaskStoreError::DuplicateTask(task_id)
                    }
                    (other, _) => TaskStoreError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> TaskStoreResult<()> {
        let task_id = task.id();
        let changeset = to_changeset(task)?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&changeset)
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            if updated == 0 {
                return Err(TaskStoreError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskStoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>> {
        let criteria = filter.clone();
        self.run_blocking(move |connection| {
            let mut query = tasks::table.select(TaskRow::as_select()).into_boxed();
            if let Some(parent) = criteria.parent_task_id() {
                query = query.filter(tasks::parent_task_id.eq(parent.into_inner()));
            }
            if let Some(user) = criteria.assigned_to() {
                query = query.filter(tasks::assigned_to.eq(user.into_inner()));
            }
            if let Some(period) = criteria.test_period_id() {
                query = query.filter(tasks::test_period_id.eq(period.into_inner()));
            }
            if !criteria.statuses().is_empty() {
                let statuses: Vec<&'static str> =
                    criteria.statuses().iter().map(|status| status.as_str()).collect();
                query = query.filter(tasks::status.eq_any(statuses));
            }
            if let Some(stage) = criteria.learning_stage() {
                query = query.filter(tasks::learning_stage.eq(stage.as_str()));
            }
            if let Some(cycle) = criteria.cycle_number() {
                query = query.filter(tasks::cycle_number.eq(i16::from(cycle.value())));
            }

            let rows = query
                .order((tasks::due_date.asc(), tasks::created_at.asc(), tasks::id.asc()))
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> TaskStoreResult<()> {
        // Mistakes and relationship edges cascade through foreign keys.
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            if deleted == 0 {
                return Err(TaskStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn record_mistakes(&self, mistakes: &[Mistake]) -> TaskStoreResult<()> {
        let Some(first_task) = mistakes.first().map(Mistake::task_id) else {
            return Ok(());
        };
        let rows = mistakes
            .iter()
            .map(|mistake| {
                Ok(MistakeRow {
                    id: mistake.id().into_inner(),
                    task_id: mistake.task_id().into_inner(),
                    unit: to_i32(mistake.unit())?,
                    cycle_number: i16::from(mistake.cycle_number().value()),
                    recorded_at: mistake.recorded_at(),
                })
            })
            .collect::<TaskStoreResult<Vec<_>>>()?;

        self.run_blocking(move |connection| {
            diesel::insert_into(task_mistakes::table)
                .values(&rows)
                .execute(connection)
                .map_err(|err| foreign_key_as_not_found(err, first_task))?;
            Ok(())
        })
        .await
    }

    async fn list_mistakes(
        &self,
        task_id: TaskId,
        cycle_number: Option<CycleNumber>,
    ) -> TaskStoreResult<Vec<Mistake>> {
        self.run_blocking(move |connection| {
            let mut query = task_mistakes::table
                .filter(task_mistakes::task_id.eq(task_id.into_inner()))
                .select(MistakeRow::as_select())
                .into_boxed();
            if let Some(cycle) = cycle_number {
                query = query.filter(task_mistakes::cycle_number.eq(i16::from(cycle.value())));
            }
            let rows = query
                .order(task_mistakes::recorded_at.asc())
                .load::<MistakeRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter().map(row_to_mistake).collect()
        })
        .await
    }

    async fn store_relationship(&self, relationship: &TaskRelationship) -> TaskStoreResult<()> {
        let parent = relationship.parent_task_id();
        let row = RelationshipRow {
            id: relationship.id().into_inner(),
            parent_task_id: parent.into_inner(),
            child_task_id: relationship.child_task_id().into_inner(),
            cycle_number: i16::from(relationship.cycle_number().value()),
            unit: to_i32(relationship.unit())?,
            created_at: relationship.created_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(task_relationships::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| foreign_key_as_not_found(err, parent))?;
            Ok(())
        })
        .await
    }

    async fn list_relationships(
        &self,
        parent_task_id: TaskId,
    ) -> TaskStoreResult<Vec<TaskRelationship>> {
        self.run_blocking(move |connection| {
            let rows = task_relationships::table
                .filter(task_relationships::parent_task_id.eq(parent_task_id.into_inner()))
                .select(RelationshipRow::as_select())
                .order(task_relationships::created_at.asc())
                .load::<RelationshipRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter().map(row_to_relationship).collect()
        })
        .await
    }
}

pub(super) fn to_new_row(task: &Task) -> TaskStoreResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        identity: TaskIdentityColumns {
            task_type: task.kind().as_str().to_owned(),
            parent_task_id: task.parent_id().map(TaskId::into_inner),
            cycle_number: i16::from(task.cycle_number().value()),
            learning_stage: task.learning_stage().as_str().to_owned(),
            unit_type: task.unit_type().as_str().to_owned(),
            created_by: task.created_by().into_inner(),
            is_shared: task.is_shared(),
        },
        state: to_changeset(task)?,
        created_at: task.created_at(),
    })
}

pub(super) fn to_changeset(task: &Task) -> TaskStoreResult<TaskChangeset> {
    Ok(TaskChangeset {
        title: task.title().to_owned(),
        description: task.description().map(str::to_owned),
        total_units: to_i32(task.total_units())?,
        completed_units: to_i32(task.completed_units())?,
        unit_range_start: task.unit_range().map(|range| to_i32(range.start())).transpose()?,
        unit_range_end: task.unit_range().map(|range| to_i32(range.end())).transpose()?,
        estimated_minutes: task.estimated_minutes().map(to_i32).transpose()?,
        actual_minutes: task.actual_minutes().map(to_i32).transpose()?,
        start_date: task.start_date(),
        due_date: task.due_date(),
        status: task.status().as_str().to_owned(),
        completed_at: task.completed_at(),
        assigned_to: task.assigned_to().into_inner(),
        test_period_id: task.test_period_id().map(TestPeriodId::into_inner),
        updated_at: task.updated_at(),
    })
}

pub(super) fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        task_type,
        parent_task_id,
        cycle_number,
        learning_stage,
        unit_type,
        total_units,
        completed_units,
        unit_range_start,
        unit_range_end,
        estimated_minutes,
        actual_minutes,
        start_date,
        due_date,
        status,
        completed_at,
        assigned_to,
        created_by,
        test_period_id,
        is_shared,
        created_at,
        updated_at,
    } = row;

    let kind = TaskKind::from_parts(&task_type, parent_task_id.map(TaskId::from_uuid))
        .map_err(TaskStoreError::persistence)?;
    let unit_range = match (unit_range_start, unit_range_end) {
        (Some(start), Some(end)) => Some(
            UnitRange::new(from_i32(start)?, from_i32(end)?).map_err(TaskStoreError::persistence)?,
        ),
        _ => None,
    };

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        kind,
        cycle_number: to_cycle(cycle_number)?,
        learning_stage: LearningStage::try_from(learning_stage.as_str())
            .map_err(TaskStoreError::persistence)?,
        unit_type: UnitType::try_from(unit_type.as_str()).map_err(TaskStoreError::persistence)?,
        total_units: from_i32(total_units)?,
        completed_units: from_i32(completed_units)?,
        unit_range,
        estimated_minutes: estimated_minutes.map(from_i32).transpose()?,
        actual_minutes: actual_minutes.map(from_i32).transpose()?,
        start_date,
        due_date,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskStoreError::persistence)?,
        completed_at,
        assigned_to: UserId::from_uuid(assigned_to),
        created_by: UserId::from_uuid(created_by),
        test_period_id: test_period_id.map(TestPeriodId::from_uuid),
        is_shared,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn row_to_mistake(row: MistakeRow) -> TaskStoreResult<Mistake> {
    Ok(Mistake::from_persisted(
        MistakeId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        from_i32(row.unit)?,
        to_cycle(row.cycle_number)?,
        row.recorded_at,
    ))
}

fn row_to_relationship(row: RelationshipRow) -> TaskStoreResult<TaskRelationship> {
    Ok(TaskRelationship::from_persisted(
        RelationshipId::from_uuid(row.id),
        TaskId::from_uuid(row.parent_task_id),
        TaskId::from_uuid(row.child_task_id),
        to_cycle(row.cycle_number)?,
        from_i32(row.unit)?,
        row.created_at,
    ))
}

fn to_i32(value: u32) -> TaskStoreResult<i32> {
    i32::try_from(value).map_err(TaskStoreError::persistence)
}

fn from_i32(value: i32) -> TaskStoreResult<u32> {
    u32::try_from(value).map_err(TaskStoreError::persistence)
}

fn to_cycle(value: i16) -> TaskStoreResult<CycleNumber> {
    let raw = u8::try_from(value).map_err(TaskStoreError::persistence)?;
    CycleNumber::new(raw).map_err(TaskStoreError::persistence)
}

fn is_finalization_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == FINALIZATION_UNIQUE_INDEX)
}

fn foreign_key_as_not_found(err: DieselError, task_id: TaskId) -> TaskStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            TaskStoreError::NotFound(task_id)
        }
        other => TaskStoreError::persistence(other),
    }
}
