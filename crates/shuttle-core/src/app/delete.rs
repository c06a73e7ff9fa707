//! DeleteChannel - 削除リクエストの受付と取り出し
//!
//! producer 側は `request_delete` でマーカーを置くだけで、タスク本体には触れません。
//! runner 側は `drain_one` でマーカーを 1 つずつ取り出し、該当タスクを探します。
//! 破壊的な操作（TaskStore::delete）は runner のループだけが行います。

use std::sync::Arc;

use crate::domain::{Stage, TaskId, TaskLocation};
use crate::error::Result;
use crate::ports::{DeleteRequestQueue, TaskStore};

pub struct DeleteChannel {
    store: Arc<dyn TaskStore>,
    requests: Arc<dyn DeleteRequestQueue>,
}

impl DeleteChannel {
    pub fn new(store: Arc<dyn TaskStore>, requests: Arc<dyn DeleteRequestQueue>) -> Self {
        Self { store, requests }
    }

    /// Validates `raw_id` and leaves a delete request for the runner.
    ///
    /// Malformed ids (empty after trimming, longer than 40 characters, or not
    /// a single path component) are rejected before anything is written.
    pub async fn request_delete(&self, raw_id: &str, requester: &str) -> Result<TaskId> {
        let id = TaskId::parse(raw_id)?;
        self.requests.push(&id, requester).await?;
        tracing::info!(task_id = %id, requester, "delete requested");
        Ok(id)
    }

    /// Takes delete requests until one matches a live task.
    ///
    /// Requests are removed as they are taken, so each is handled at most
    /// once; a request whose task no longer exists is dropped. `None` means
    /// there are no pending requests left.
    pub async fn drain_one(&self) -> Result<Option<TaskLocation>> {
        while let Some(id) = self.requests.pop().await? {
            if let Some(task) = self.find(&id).await? {
                return Ok(Some(task));
            }
            tracing::warn!(task_id = %id, "delete requested for unknown task, dropping request");
        }
        Ok(None)
    }

    async fn find(&self, id: &TaskId) -> Result<Option<TaskLocation>> {
        for stage in Stage::DELETE_SEARCH_ORDER {
            if let Some(task) = self.store.locate(id, stage).await? {
                return Ok(Some(task));
            }
        }
        Ok(None)
    }
}
