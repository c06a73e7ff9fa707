//! DeleteRequestQueue port - 削除リクエストの受け渡し
//!
//! DeleteRequestQueue は task_id（と依頼元アドレス）のみを流します。
//! タスク本体には一切触れません。実際の削除は runner が TaskStore 経由で行います。
//!
//! # 実装
//! - **FsDeleteRequests**: `root/delete_requests/<id>` のマーカーファイル（本番用）
//! - **InMemoryDeleteRequests**: テスト用

use async_trait::async_trait;

use crate::domain::TaskId;
use crate::error::Result;

/// DeleteRequestQueue は削除依頼のマーカーを保持するキュー
///
/// # 設計原則
/// - 同じ id への依頼は 1 つのマーカーにまとまる
/// - `pop` はマーカーを取り除いてから返す（高々 1 回の処理）
#[async_trait]
pub trait DeleteRequestQueue: Send + Sync {
    /// Records a request to delete `id`, noting who asked.
    async fn push(&self, id: &TaskId, requester: &str) -> Result<()>;

    /// Removes and returns the first pending request, if any.
    async fn pop(&self) -> Result<Option<TaskId>>;

    /// Number of pending requests.
    async fn len(&self) -> Result<usize>;
}
