//! TaskStore port - タスクの正本（source of truth）
//!
//! TaskStore は以下を管理します：
//! - 状態（Stage）: 置き場所そのものが状態
//! - 記録（TaskRecord）: パラメータとエラー注記
//! - 入力（payload）と結果（ResultRows）
//!
//! # 実装
//! - **FsTaskStore**: ディレクトリツリー（本番用）
//! - **InMemoryTaskStore**: テスト用

use async_trait::async_trait;

use crate::domain::{Owner, ResultRows, Stage, TaskId, TaskLocation, TaskRecord};
use crate::error::Result;

/// TaskStore は状態・記録・入力・結果の正本
///
/// # 設計原則
/// - 状態遷移は `move_to` の 1 回の atomic な操作だけで行う
///   （読み手は 1 つのタスクを常にちょうど 1 つの stage に見る）
/// - どのコンポーネントも状態をメモリに保持しない。毎回ここから読み直す
/// - ロックは取らない。runner が 1 プロセスであることは運用側の前提
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Finds `id` under `stage`, scanning owner partitions in listing order.
    async fn locate(&self, id: &TaskId, stage: Stage) -> Result<Option<TaskLocation>>;

    /// Creates a new task in `Submitted`.
    ///
    /// The payload is fully written before the record becomes visible, so a
    /// reader that sees the record always finds a complete payload.
    async fn create(
        &self,
        owner: &Owner,
        id: &TaskId,
        record: &TaskRecord,
        payload: &[u8],
    ) -> Result<TaskLocation>;

    /// Moves the whole task to `stage` in one all-or-nothing step.
    ///
    /// Moving to the current stage is a no-op that returns the same location.
    async fn move_to(&self, task: &TaskLocation, stage: Stage) -> Result<TaskLocation>;

    /// Removes the task's known files and then the task itself.
    ///
    /// Unknown content is left in place and reported as a failure.
    async fn delete(&self, task: &TaskLocation) -> Result<()>;

    /// Every task currently in `stage`, in listing order.
    async fn list(&self, stage: Stage) -> Result<Vec<TaskLocation>>;

    /// Reads the record. `Ok(None)` when no record has been written yet.
    async fn read_record(&self, task: &TaskLocation) -> Result<Option<TaskRecord>>;

    /// Replaces the record atomically.
    async fn write_record(&self, task: &TaskLocation, record: &TaskRecord) -> Result<()>;

    /// Reads the result. `Ok(None)` when there is no result.
    async fn read_result(&self, task: &TaskLocation) -> Result<Option<ResultRows>>;

    /// Writes and flushes the result.
    async fn write_result(&self, task: &TaskLocation, rows: &ResultRows) -> Result<()>;
}
