//! In-memory task store for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{CycleNumber, Mistake, Task, TaskId, TaskRelationship},
    ports::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store.
///
/// Enforces the same uniqueness rules as the `PostgreSQL` schema,
/// including one finalization task per parent.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    tasks: HashMap<TaskId, Task>,
    children: HashMap<TaskId, Vec<TaskId>>,
    finalizations: HashMap<TaskId, TaskId>,
    mistakes: Vec<Mistake>,
    relationships: Vec<TaskRelationship>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn task_count(&self) -> TaskStoreResult<usize> {
        Ok(self.read()?.tasks.len())
    }

    fn read(&self) -> TaskStoreResult<RwLockReadGuard<'_, InMemoryStoreState>> {
        self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskStoreResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Sort key shared by every listing: due date, then creation time, then id.
fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| (task.due_date(), task.created_at(), task.id()));
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn store_task(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }

        let parent_id = task.parent_id();
        if task.is_finalization() {
            if let Some(parent) = parent_id {
                if state.finalizations.contains_key(&parent) {
                    return Err(TaskStoreError::DuplicateFinalization { parent_id: parent });
                }
                state.finalizations.insert(parent, task.id());
            }
        }
        if let Some(parent) = parent_id {
            state.children.entry(parent).or_default().push(task.id());
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        let existing = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskStoreError::NotFound(task.id()))?;
        *existing = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut found: Vec<Task> = match filter.parent_task_id() {
            Some(parent) => state
                .children
                .get(&parent)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| state.tasks.get(id))
                        .filter(|task| filter.matches(task))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
            None => state
                .tasks
                .values()
                .filter(|task| filter.matches(task))
                .cloned()
                .collect(),
        };
        sort_tasks(&mut found);
        Ok(found)
    }

    async fn delete_task(&self, id: TaskId) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&id) {
            return Err(TaskStoreError::NotFound(id));
        }

        // Subtasks go with their parent, matching the schema's cascade.
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(removed) = state.tasks.remove(&current) else {
                continue;
            };
            if let Some(children) = state.children.remove(&current) {
                pending.extend(children);
            }
            if let Some(parent) = removed.parent_id() {
                if let Some(siblings) = state.children.get_mut(&parent) {
                    siblings.retain(|child| *child != current);
                }
                if state.finalizations.get(&parent) == Some(&current) {
                    state.finalizations.remove(&parent);
                }
            }
            state.finalizations.remove(&current);
            state.mistakes.retain(|mistake| mistake.task_id() != current);
            state
                .relationships
                .retain(|edge| edge.parent_task_id() != current && edge.child_task_id() != current);
        }
        Ok(())
    }

    async fn record_mistakes(&self, mistakes: &[Mistake]) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        if let Some(orphan) = mistakes
            .iter()
            .find(|mistake| !state.tasks.contains_key(&mistake.task_id()))
        {
            return Err(TaskStoreError::NotFound(orphan.task_id()));
        }
        state.mistakes.extend_from_slice(mistakes);
        Ok(())
    }

    async fn list_mistakes(
        &self,
        task_id: TaskId,
        cycle_number: Option<CycleNumber>,
    ) -> TaskStoreResult<Vec<Mistake>> {
        let state = self.read()?;
        Ok(state
            .mistakes
            .iter()
            .filter(|mistake| mistake.task_id() == task_id)
            .filter(|mistake| cycle_number.is_none_or(|cycle| mistake.cycle_number() == cycle))
            .cloned()
            .collect())
    }

    async fn store_relationship(&self, relationship: &TaskRelationship) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        for endpoint in [relationship.parent_task_id(), relationship.child_task_id()] {
            if !state.tasks.contains_key(&endpoint) {
                return Err(TaskStoreError::NotFound(endpoint));
            }
        }
        state.relationships.push(relationship.clone());
        Ok(())
    }

    async fn list_relationships(
        &self,
        parent_task_id: TaskId,
    ) -> TaskStoreResult<Vec<TaskRelationship>> {
        let state = self.read()?;
        Ok(state
            .relationships
            .iter()
            .filter(|edge| edge.parent_task_id() == parent_task_id)
            .cloned()
            .collect())
    }
}
