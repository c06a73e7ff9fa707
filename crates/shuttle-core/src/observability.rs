//! Observability - キューの状態を数える
//!
//! stage ごとのタスク数と未処理の削除リクエスト数を返します。
//! CLI の `counts` サブコマンドがそのまま JSON で出力します。

use serde::{Deserialize, Serialize};

use crate::domain::Stage;
use crate::error::Result;
use crate::ports::{DeleteRequestQueue, TaskStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub submitted: usize,
    pub processing: usize,
    pub done: usize,
    pub delete_requests: usize,
}

impl QueueCounts {
    /// Counts tasks per stage plus pending delete requests.
    ///
    /// Each stage is listed separately, so a task moving during the scan may
    /// be counted twice or not at all.
    pub async fn collect(
        store: &dyn TaskStore,
        delete_requests: &dyn DeleteRequestQueue,
    ) -> Result<Self> {
        Ok(Self {
            submitted: store.list(Stage::Submitted).await?.len(),
            processing: store.list(Stage::Processing).await?.len(),
            done: store.list(Stage::Done).await?.len(),
            delete_requests: delete_requests.len().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Owner, TaskId, TaskRecord};
    use crate::impls::{InMemoryDeleteRequests, InMemoryTaskStore};

    #[tokio::test]
    async fn counts_every_stage_and_pending_deletes() {
        let store = InMemoryTaskStore::new();
        let deletes = InMemoryDeleteRequests::new();
        let owner = Owner::parse("1.2.3.4").unwrap();
        for (name, stage) in [
            ("a", Stage::Submitted),
            ("b", Stage::Submitted),
            ("c", Stage::Processing),
            ("d", Stage::Done),
        ] {
            store
                .insert(stage, &owner, &TaskId::parse(name).unwrap(), Some(TaskRecord::default()), None)
                .await;
        }
        deletes.push(&TaskId::parse("d").unwrap(), "1.2.3.4").await.unwrap();

        let counts = QueueCounts::collect(&store, &deletes).await.unwrap();

        assert_eq!(
            counts,
            QueueCounts {
                submitted: 2,
                processing: 1,
                done: 1,
                delete_requests: 1,
            }
        );
    }
}
