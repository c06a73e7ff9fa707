//! StatusService - ステータスクエリと完了待ち
//!
//! 状態はメモリに持たず、毎回 TaskStore から読み直します。
//! 確認順は Submitted → Processing → Done です。移動中のタスクは一瞬どこにも
//! 見えないことがあり、その場合は NotFound になります（呼び出し側で再試行）。

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Parameters, Stage, TaskId, TaskLocation, TaskRecord, TaskStatus};
use crate::error::{Result, ShuttleError};
use crate::ports::TaskStore;

pub struct StatusService {
    store: Arc<dyn TaskStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Reports where `id` is and what it holds.
    ///
    /// A `Done` task with neither a result nor an error annotation is
    /// reported as [`ShuttleError::ResultMissing`], not as not-found.
    pub async fn query(&self, id: &TaskId) -> Result<TaskStatus> {
        if let Some(loc) = self.store.locate(id, Stage::Submitted).await? {
            return Ok(TaskStatus::Submitted {
                parameters: self.public_parameters(&loc).await,
            });
        }
        if let Some(loc) = self.store.locate(id, Stage::Processing).await? {
            return Ok(TaskStatus::Processing {
                parameters: self.public_parameters(&loc).await,
            });
        }
        let Some(loc) = self.store.locate(id, Stage::Done).await? else {
            return Ok(TaskStatus::NotFound);
        };

        let record = self.readable_record(&loc).await;
        let error = record
            .as_ref()
            .and_then(|r| r.error())
            .map(str::to_string);
        let parameters = record.map(|r| r.public_parameters());

        match self.store.read_result(&loc).await? {
            Some(result) => {
                tracing::info!(task_id = %id, rows = result.len(), "returning result");
                Ok(TaskStatus::Done {
                    result: Some(result),
                    error,
                    parameters,
                })
            }
            None if error.is_some() => Ok(TaskStatus::Done {
                result: None,
                error,
                parameters,
            }),
            None => {
                tracing::error!(task_id = %id, path = %loc, "no result found for completed task");
                Err(ShuttleError::ResultMissing(id.clone()))
            }
        }
    }

    /// Polls `Done` for `id` up to `ticks` times, sleeping `tick` between
    /// attempts. Other stages are never consulted.
    pub async fn wait(&self, id: &TaskId, ticks: u32, tick: Duration) -> Result<Option<TaskLocation>> {
        for attempt in 0..ticks {
            if attempt > 0 {
                tokio::time::sleep(tick).await;
            }
            if let Some(loc) = self.store.locate(id, Stage::Done).await? {
                return Ok(Some(loc));
            }
            tracing::debug!(task_id = %id, attempt, "waiting for task");
        }
        tracing::info!(task_id = %id, ticks, "wait time exceeded");
        Ok(None)
    }

    async fn readable_record(&self, loc: &TaskLocation) -> Option<TaskRecord> {
        match self.store.read_record(loc).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(path = %loc, error = %err, "unable to read task parameters");
                None
            }
        }
    }

    async fn public_parameters(&self, loc: &TaskLocation) -> Option<Parameters> {
        self.readable_record(loc)
            .await
            .map(|record| record.public_parameters())
    }
}
