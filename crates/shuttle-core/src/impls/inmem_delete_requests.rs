//! InMemoryDeleteRequests - テスト用の削除リクエストキュー
//!
//! # 実装詳細
//! - VecDeque で依頼順を保持
//! - 同じ id の依頼は 1 件にまとめ、依頼元だけ上書きする（マーカーファイルと同じ挙動）

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::TaskId;
use crate::error::Result;
use crate::ports::DeleteRequestQueue;

#[derive(Clone, Default)]
pub struct InMemoryDeleteRequests {
    /// (task_id, requester)
    pending: Arc<Mutex<VecDeque<(TaskId, String)>>>,
}

impl InMemoryDeleteRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requester recorded for `id`, if a request is pending.
    pub async fn requester(&self, id: &TaskId) -> Option<String> {
        let pending = self.pending.lock().await;
        pending
            .iter()
            .find(|(pending_id, _)| pending_id == id)
            .map(|(_, requester)| requester.clone())
    }
}

#[async_trait]
impl DeleteRequestQueue for InMemoryDeleteRequests {
    async fn push(&self, id: &TaskId, requester: &str) -> Result<()> {
        let mut pending = self.pending.lock().await;
        match pending.iter_mut().find(|(pending_id, _)| pending_id == id) {
            Some((_, existing)) => *existing = requester.to_string(),
            None => pending.push_back((id.clone(), requester.to_string())),
        }
        Ok(())
    }

    async fn pop(&self) -> Result<Option<TaskId>> {
        let mut pending = self.pending.lock().await;
        Ok(pending.pop_front().map(|(id, _)| id))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.pending.lock().await.len())
    }
}
