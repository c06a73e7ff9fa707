//! In-memory task store.
//!
//! Mirrors the directory layout closely enough for service and runner tests:
//! every task has exactly one stage, listing order is creation order, and a
//! move is a single update under the lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Owner, ResultRows, Stage, TaskId, TaskLocation, TaskRecord};
use crate::error::{Result, ShuttleError};
use crate::ports::TaskStore;

/// Virtual root used for the locations handed out by the in-memory store.
const VIRTUAL_ROOT: &str = "/inmem";

/// One stored task.
#[derive(Debug, Clone)]
struct StoredTask {
    stage: Stage,
    owner: Owner,
    record: Option<TaskRecord>,
    payload: Vec<u8>,
    result: Option<ResultRows>,
}

/// In-memory store state.
#[derive(Default)]
struct InMemoryStoreState {
    /// Task ids in creation order (listing order).
    order: Vec<TaskId>,

    /// All tasks (single source of truth).
    tasks: HashMap<TaskId, StoredTask>,
}

impl InMemoryStoreState {
    fn get(&self, task: &TaskLocation) -> Result<&StoredTask> {
        self.tasks
            .get(task.id())
            .filter(|stored| stored.stage == task.stage())
            .ok_or_else(|| ShuttleError::NotFound(task.id().clone()))
    }

    fn get_mut(&mut self, task: &TaskLocation) -> Result<&mut StoredTask> {
        self.tasks
            .get_mut(task.id())
            .filter(|stored| stored.stage == task.stage())
            .ok_or_else(|| ShuttleError::NotFound(task.id().clone()))
    }
}

/// In-memory task store for tests and local experiments.
#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<Mutex<InMemoryStoreState>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn location(stage: Stage, owner: &Owner, id: &TaskId) -> TaskLocation {
        TaskLocation::new(VIRTUAL_ROOT, stage, owner.clone(), id.clone())
    }

    /// Stored payload of a task, wherever it currently is.
    pub async fn payload(&self, id: &TaskId) -> Option<Vec<u8>> {
        let state = self.state.lock().await;
        state.tasks.get(id).map(|stored| stored.payload.clone())
    }

    /// Places a task directly in `stage`, bypassing submission.
    ///
    /// `record` may be `None` to model a task whose record was never written.
    pub async fn insert(
        &self,
        stage: Stage,
        owner: &Owner,
        id: &TaskId,
        record: Option<TaskRecord>,
        result: Option<ResultRows>,
    ) -> TaskLocation {
        let mut state = self.state.lock().await;
        if !state.tasks.contains_key(id) {
            state.order.push(id.clone());
        }
        state.tasks.insert(
            id.clone(),
            StoredTask {
                stage,
                owner: owner.clone(),
                record,
                payload: Vec::new(),
                result,
            },
        );
        Self::location(stage, owner, id)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn locate(&self, id: &TaskId, stage: Stage) -> Result<Option<TaskLocation>> {
        let state = self.state.lock().await;
        Ok(state
            .tasks
            .get(id)
            .filter(|stored| stored.stage == stage)
            .map(|stored| Self::location(stage, &stored.owner, id)))
    }

    async fn create(
        &self,
        owner: &Owner,
        id: &TaskId,
        record: &TaskRecord,
        payload: &[u8],
    ) -> Result<TaskLocation> {
        let mut state = self.state.lock().await;
        let location = Self::location(Stage::Submitted, owner, id);
        if state.tasks.contains_key(id) {
            return Err(ShuttleError::io(
                location.path(),
                std::io::Error::new(std::io::ErrorKind::AlreadyExists, "task already exists"),
            ));
        }
        state.order.push(id.clone());
        state.tasks.insert(
            id.clone(),
            StoredTask {
                stage: Stage::Submitted,
                owner: owner.clone(),
                record: Some(record.clone()),
                payload: payload.to_vec(),
                result: None,
            },
        );
        Ok(location)
    }

    async fn move_to(&self, task: &TaskLocation, stage: Stage) -> Result<TaskLocation> {
        if task.stage() == stage {
            return Ok(task.clone());
        }
        let mut state = self.state.lock().await;
        let stored = state.get_mut(task).map_err(|_| {
            ShuttleError::io(
                task.path(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such task"),
            )
        })?;
        stored.stage = stage;
        Ok(task.with_stage(stage))
    }

    async fn delete(&self, task: &TaskLocation) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.get(task).is_err() {
            return Err(ShuttleError::Delete {
                path: task.path(),
                reason: "no such task".to_string(),
            });
        }
        state.tasks.remove(task.id());
        state.order.retain(|id| id != task.id());
        Ok(())
    }

    async fn list(&self, stage: Stage) -> Result<Vec<TaskLocation>> {
        let state = self.state.lock().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| {
                state
                    .tasks
                    .get(id)
                    .filter(|stored| stored.stage == stage)
                    .map(|stored| Self::location(stage, &stored.owner, id))
            })
            .collect())
    }

    async fn read_record(&self, task: &TaskLocation) -> Result<Option<TaskRecord>> {
        let state = self.state.lock().await;
        Ok(state.get(task).ok().and_then(|stored| stored.record.clone()))
    }

    async fn write_record(&self, task: &TaskLocation, record: &TaskRecord) -> Result<()> {
        let mut state = self.state.lock().await;
        state.get_mut(task)?.record = Some(record.clone());
        Ok(())
    }

    async fn read_result(&self, task: &TaskLocation) -> Result<Option<ResultRows>> {
        let state = self.state.lock().await;
        Ok(state.get(task).ok().and_then(|stored| stored.result.clone()))
    }

    async fn write_result(&self, task: &TaskLocation, rows: &ResultRows) -> Result<()> {
        let mut state = self.state.lock().await;
        state.get_mut(task)?.result = Some(rows.clone());
        Ok(())
    }
}
