//! TaskRunner - タスク実行ループ
//!
//! # フロー（1 イテレーション）
//! 1. 削除リクエストを全て処理（新しいタスクより優先）
//! 2. Submitted から最初のタスクを見つける（列挙順、優先度なし）
//! 3. なければ wait_interval だけ待つ（shutdown と競合させる）
//! 4. あれば Processing へ移動 → Executor 実行 → 結果を書く → Done へ移動
//! 5. 4 で失敗したら記録に error を書いて Done へ移動
//!
//! # 前提
//! 同じツリーに対して runner は 1 プロセスだけ動かすこと（ロックは取らない）。
//! 実行中のツールはキャンセルしない。shutdown は次のタスクを取らなくなるだけ。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::app::delete::DeleteChannel;
use crate::app::submission::{DEFAULT_ALPHA, DEFAULT_BETA};
use crate::domain::{ResultRows, Stage, Task, TaskId, TaskLocation, TaskRecord, parse_table};
use crate::error::{Result, ShuttleError};
use crate::ports::{ExecutionRequest, Executor, TaskStore};

/// Error annotation for tasks found in `Processing` at startup.
pub const RESTARTED_MESSAGE: &str = "runner restarted while task was processing";

/// What one iteration of the loop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iteration {
    /// No pending task was found.
    Idle,
    /// A task was taken; this is where it ended up.
    Processed(TaskLocation),
}

pub struct TaskRunner {
    store: Arc<dyn TaskStore>,
    executor: Arc<dyn Executor>,
    deletes: Option<DeleteChannel>,
    wait_interval: Duration,
    recover_on_start: bool,
    /// Tasks that are skipped from then on.
    problems: HashSet<TaskLocation>,
}

impl TaskRunner {
    pub fn new(store: Arc<dyn TaskStore>, executor: Arc<dyn Executor>, wait_interval: Duration) -> Self {
        Self {
            store,
            executor,
            deletes: None,
            wait_interval,
            recover_on_start: false,
            problems: HashSet::new(),
        }
    }

    /// Drain this channel at the start of every iteration.
    pub fn with_delete_channel(mut self, deletes: DeleteChannel) -> Self {
        self.deletes = Some(deletes);
        self
    }

    pub fn recover_on_start(mut self, enabled: bool) -> Self {
        self.recover_on_start = enabled;
        self
    }

    /// Tasks skipped because their record is unreadable or they could not
    /// be moved out of `Submitted`.
    pub fn problem_list(&self) -> impl Iterator<Item = &TaskLocation> {
        self.problems.iter()
    }

    /// Runs until `shutdown` turns true (or its sender goes away).
    ///
    /// A failing task never stops the loop.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(wait_interval = ?self.wait_interval, deletes = self.deletes.is_some(), "runner started");

        if self.recover_on_start
            && let Err(err) = self.recover().await
        {
            tracing::error!(error = %err, "startup recovery failed");
        }

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Iteration::Processed(_) = self.run_once().await {
                continue;
            }

            // 何もなければ待つ。shutdown が来たら即座に抜ける
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.wait_interval) => {}
            }
        }

        tracing::info!("runner stopped");
    }

    /// One pass: drain deletes, then take and process at most one task.
    pub async fn run_once(&mut self) -> Iteration {
        if self.deletes.is_some() {
            self.drain_deletes().await;
        }

        let Some(task) = self.next_task().await else {
            return Iteration::Idle;
        };
        tracing::info!(task_id = %task.id(), path = %task.location, "found a task");
        let submitted = task.location.clone();
        let finished = self.process(task).await;
        if !finished.stage().is_terminal() {
            // moves are not retried; leave it where it is and move on
            tracing::error!(task_id = %finished.id(), path = %finished, "task could not be filed, adding to problem list");
            self.problems.insert(submitted);
            return Iteration::Idle;
        }
        Iteration::Processed(finished)
    }

    /// Deletes every requested task. Returns how many were removed.
    pub async fn drain_deletes(&self) -> usize {
        let Some(deletes) = &self.deletes else {
            return 0;
        };
        let mut removed = 0;
        loop {
            let task = match deletes.drain_one().await {
                Ok(Some(task)) => task,
                Ok(None) => break,
                Err(err) => {
                    tracing::error!(error = %err, "unable to read delete requests");
                    break;
                }
            };
            tracing::info!(task_id = %task.id(), path = %task, "deleting task");
            match self.store.delete(&task).await {
                Ok(()) => removed += 1,
                Err(err) => tracing::error!(task_id = %task.id(), error = %err, "error deleting task"),
            }
        }
        removed
    }

    /// First task in `Submitted` with a readable record, in listing order.
    async fn next_task(&mut self) -> Option<Task> {
        let candidates = match self.store.list(Stage::Submitted).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::error!(error = %err, "unable to list submitted tasks");
                return None;
            }
        };

        for location in candidates {
            if self.problems.contains(&location) {
                continue;
            }
            match self.store.read_record(&location).await {
                Ok(Some(record)) => return Some(Task::new(location, record)),
                // still being created
                Ok(None) => {
                    tracing::debug!(path = %location, "no record yet, skipping");
                }
                Err(err @ ShuttleError::RecordParse { .. }) => {
                    tracing::error!(path = %location, error = %err, "unable to parse task record, adding to problem list");
                    self.problems.insert(location);
                }
                Err(err) => {
                    tracing::warn!(path = %location, error = %err, "unable to read task record");
                }
            }
        }
        None
    }

    /// Claims, executes and files one task. Returns its final location.
    async fn process(&self, task: Task) -> TaskLocation {
        let Task { location, record } = task;

        let processing = match self.store.move_to(&location, Stage::Processing).await {
            Ok(processing) => processing,
            Err(err) => {
                let message = format!("unable to claim task: {err}");
                return self.fail(&location, record, &message).await;
            }
        };

        let result = match self.execute(&processing, &record).await {
            Ok(result) => result,
            Err(err) => return self.fail(&processing, record, &err.to_string()).await,
        };

        if let Err(err) = self.store.write_result(&processing, &result).await {
            return self.fail(&processing, record, &err.to_string()).await;
        }

        tracing::info!(task_id = %processing.id(), rows = result.len(), "task processing completed");
        self.finish(&processing).await
    }

    /// Runs the tool and turns its output into result rows.
    ///
    /// Output with at least one row counts as success whatever the exit
    /// status; empty output with a nonzero status is a failure.
    async fn execute(&self, task: &TaskLocation, record: &TaskRecord) -> Result<ResultRows> {
        let request = ExecutionRequest {
            workdir: task.path(),
            input: task.payload_path(),
            alpha: record.alpha().unwrap_or(DEFAULT_ALPHA),
            beta: record.beta().unwrap_or(DEFAULT_BETA),
        };
        let output = self.executor.run(&request).await?;
        let rows = parse_table(&output.stdout);

        if !output.exited_cleanly() {
            if rows.is_empty() {
                return Err(ShuttleError::Executor(format!(
                    "tool exited with status {:?} and no output: {}",
                    output.exit_code,
                    output.stderr.trim()
                )));
            }
            tracing::debug!(task_id = %task.id(), exit_code = ?output.exit_code, "tool reported failure but produced output");
        }
        Ok(rows)
    }

    /// Annotates the record with `message` and files the task in `Done`.
    async fn fail(&self, task: &TaskLocation, mut record: TaskRecord, message: &str) -> TaskLocation {
        tracing::warn!(task_id = %task.id(), error = message, "task set to error state");
        record.set_error(message);
        if let Err(err) = self.store.write_record(task, &record).await {
            tracing::error!(task_id = %task.id(), error = %err, "unable to save error annotation");
        }
        self.finish(task).await
    }

    /// Moves to `Done`. A failed move is logged and left as is.
    async fn finish(&self, task: &TaskLocation) -> TaskLocation {
        match self.store.move_to(task, Stage::Done).await {
            Ok(done) => done,
            Err(err) => {
                tracing::error!(task_id = %task.id(), path = %task, error = %err, "unable to move task to done");
                task.clone()
            }
        }
    }

    /// Repairs what an interrupted runner may have left behind.
    ///
    /// - an id present in more than one stage keeps only its furthest copy
    /// - tasks still in `Processing` with a result are moved to `Done`
    /// - the other tasks still in `Processing` are finished as failed
    pub async fn recover(&self) -> Result<()> {
        let mut seen: HashMap<TaskId, Vec<TaskLocation>> = HashMap::new();
        for stage in Stage::ALL {
            for location in self.store.list(stage).await? {
                seen.entry(location.id().clone()).or_default().push(location);
            }
        }

        let mut orphaned = Vec::new();
        for (id, mut copies) in seen {
            copies.sort_by_key(|location| location.stage());
            let Some(keep) = copies.pop() else {
                continue;
            };
            for stale in copies {
                tracing::warn!(task_id = %id, stale = %stale, kept = %keep, "removing duplicate task");
                if let Err(err) = self.store.delete(&stale).await {
                    tracing::error!(task_id = %id, error = %err, "unable to remove duplicate task");
                }
            }
            if keep.stage() == Stage::Processing {
                orphaned.push(keep);
            }
        }

        for task in orphaned {
            match self.store.read_result(&task).await {
                Ok(Some(_)) => {
                    tracing::info!(task_id = %task.id(), path = %task, "result already written, completing task");
                    self.finish(&task).await;
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(path = %task, error = %err, "unable to read result of orphaned task");
                }
            }
            let record = match self.store.read_record(&task).await {
                Ok(record) => record.unwrap_or_default(),
                Err(err) => {
                    tracing::warn!(path = %task, error = %err, "unable to read record of orphaned task");
                    TaskRecord::default()
                }
            };
            self.fail(&task, record, RESTARTED_MESSAGE).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::status::StatusService;
    use crate::domain::{Owner, TaskStatus};
    use crate::impls::{FsTaskStore, InMemoryDeleteRequests, InMemoryTaskStore};
    use crate::ports::{DeleteRequestQueue, ExecutionOutput};
    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    /// Replays a canned output and remembers what it was asked to run.
    #[derive(Default)]
    struct FakeExecutor {
        output: Option<ExecutionOutput>,
        calls: Mutex<Vec<ExecutionRequest>>,
    }

    impl FakeExecutor {
        fn replying(stdout: &str, exit_code: i32) -> Self {
            Self {
                output: Some(ExecutionOutput {
                    stdout: stdout.to_string(),
                    stderr: "clixo: something went wrong\n".to_string(),
                    exit_code: Some(exit_code),
                }),
                calls: Mutex::default(),
            }
        }

        fn unavailable() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl Executor for FakeExecutor {
        async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionOutput> {
            self.calls.lock().await.push(request.clone());
            self.output
                .clone()
                .ok_or_else(|| ShuttleError::Executor("container runtime missing".to_string()))
        }
    }

    fn owner() -> Owner {
        Owner::parse("1.2.3.4").unwrap()
    }

    fn id(s: &str) -> TaskId {
        TaskId::parse(s).unwrap()
    }

    fn record() -> TaskRecord {
        serde_json::from_value(json!({ "alpha": 0.01, "beta": 0.7 })).unwrap()
    }

    fn runner(store: &InMemoryTaskStore, executor: Arc<FakeExecutor>) -> TaskRunner {
        TaskRunner::new(Arc::new(store.clone()), executor, Duration::ZERO)
    }

    #[tokio::test]
    async fn idle_when_nothing_is_submitted() {
        let store = InMemoryTaskStore::new();
        let mut runner = runner(&store, Arc::new(FakeExecutor::replying("", 0)));
        assert_eq!(runner.run_once().await, Iteration::Idle);
    }

    #[tokio::test]
    async fn successful_task_ends_in_done_with_result() {
        let store = InMemoryTaskStore::new();
        store
            .insert(Stage::Submitted, &owner(), &id("abc"), Some(record()), None)
            .await;
        let executor = Arc::new(FakeExecutor::replying("# header\na\tb\tc\td\n", 0));
        let mut runner = runner(&store, executor.clone());

        let Iteration::Processed(done) = runner.run_once().await else {
            panic!("expected a task to be processed");
        };

        assert_eq!(done.stage(), Stage::Done);
        let rows = store.read_result(&done).await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(store.read_record(&done).await.unwrap().unwrap().error(), None);

        let calls = executor.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].alpha, 0.01);
        assert_eq!(calls[0].beta, 0.7);
        assert_eq!(calls[0].workdir, done.with_stage(Stage::Processing).path());
    }

    #[tokio::test]
    async fn nonzero_exit_with_output_is_success() {
        let store = InMemoryTaskStore::new();
        store
            .insert(Stage::Submitted, &owner(), &id("abc"), Some(record()), None)
            .await;
        let mut runner = runner(&store, Arc::new(FakeExecutor::replying("a\tb\tc\td\ne\tf\n", 1)));

        let Iteration::Processed(done) = runner.run_once().await else {
            panic!("expected a task to be processed");
        };

        assert_eq!(store.read_result(&done).await.unwrap().unwrap().len(), 2);
        assert_eq!(store.read_record(&done).await.unwrap().unwrap().error(), None);
    }

    #[tokio::test]
    async fn nonzero_exit_without_output_is_annotated() {
        let store = InMemoryTaskStore::new();
        store
            .insert(Stage::Submitted, &owner(), &id("abc"), Some(record()), None)
            .await;
        let mut runner = runner(&store, Arc::new(FakeExecutor::replying("# only a comment\n", 2)));

        let Iteration::Processed(done) = runner.run_once().await else {
            panic!("expected a task to be processed");
        };

        assert_eq!(done.stage(), Stage::Done);
        assert_eq!(store.read_result(&done).await.unwrap(), None);
        let error = store.read_record(&done).await.unwrap().unwrap();
        assert!(error.error().unwrap().contains("something went wrong"));
    }

    #[tokio::test]
    async fn clean_exit_without_output_is_an_empty_result() {
        let store = InMemoryTaskStore::new();
        store
            .insert(Stage::Submitted, &owner(), &id("abc"), Some(record()), None)
            .await;
        let mut runner = runner(&store, Arc::new(FakeExecutor::replying("", 0)));

        let Iteration::Processed(done) = runner.run_once().await else {
            panic!("expected a task to be processed");
        };

        assert_eq!(store.read_result(&done).await.unwrap(), Some(ResultRows::new()));
    }

    #[tokio::test]
    async fn executor_failure_still_reaches_done() {
        let store = InMemoryTaskStore::new();
        store
            .insert(Stage::Submitted, &owner(), &id("abc"), Some(record()), None)
            .await;
        let mut runner = runner(&store, Arc::new(FakeExecutor::unavailable()));

        let Iteration::Processed(done) = runner.run_once().await else {
            panic!("expected a task to be processed");
        };

        assert_eq!(done.stage(), Stage::Done);
        let annotated = store.read_record(&done).await.unwrap().unwrap();
        assert!(annotated.error().unwrap().contains("container runtime missing"));
        assert_eq!(annotated.alpha(), Some(0.01));
        assert!(store.list(Stage::Processing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tasks_without_record_are_not_taken() {
        let store = InMemoryTaskStore::new();
        store
            .insert(Stage::Submitted, &owner(), &id("half"), None, None)
            .await;
        let mut runner = runner(&store, Arc::new(FakeExecutor::replying("a\n", 0)));

        assert_eq!(runner.run_once().await, Iteration::Idle);
        assert_eq!(runner.problem_list().count(), 0);
        assert_eq!(store.list(Stage::Submitted).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pending_deletes_run_before_new_work() {
        let store = InMemoryTaskStore::new();
        let requests = InMemoryDeleteRequests::new();
        store
            .insert(Stage::Submitted, &owner(), &id("doomed"), Some(record()), None)
            .await;
        store
            .insert(Stage::Done, &owner(), &id("old"), Some(record()), None)
            .await;
        requests.push(&id("doomed"), "1.2.3.4").await.unwrap();
        requests.push(&id("old"), "1.2.3.4").await.unwrap();
        let deletes = DeleteChannel::new(Arc::new(store.clone()), Arc::new(requests.clone()));
        let executor = Arc::new(FakeExecutor::replying("a\n", 0));
        let mut runner = runner(&store, executor.clone()).with_delete_channel(deletes);

        assert_eq!(runner.run_once().await, Iteration::Idle);

        assert!(executor.calls.lock().await.is_empty());
        assert_eq!(requests.len().await.unwrap(), 0);
        for stage in Stage::ALL {
            assert!(store.list(stage).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn recovery_keeps_furthest_copy_and_fails_orphans() {
        let store = InMemoryTaskStore::new();
        store
            .insert(Stage::Processing, &owner(), &id("orphan"), Some(record()), None)
            .await;
        let runner = runner(&store, Arc::new(FakeExecutor::replying("a\n", 0)));

        runner.recover().await.unwrap();

        let done = store.locate(&id("orphan"), Stage::Done).await.unwrap().unwrap();
        let annotated = store.read_record(&done).await.unwrap().unwrap();
        assert_eq!(annotated.error(), Some(RESTARTED_MESSAGE));
    }

    #[tokio::test]
    async fn recovery_removes_stale_copies_on_disk() {
        let tmp = TempDir::new().unwrap();
        let store = FsTaskStore::new(tmp.path());
        let submitted = store
            .create(&owner(), &id("dup"), &record(), b"x")
            .await
            .unwrap();
        // a copy that already made it to done, as after an interrupted move
        let done = submitted.with_stage(Stage::Done);
        std::fs::create_dir_all(done.path()).unwrap();
        std::fs::write(done.record_path(), b"{}").unwrap();
        std::fs::write(done.result_path(), b"{}").unwrap();

        let runner = TaskRunner::new(
            Arc::new(store.clone()),
            Arc::new(FakeExecutor::replying("a\n", 0)),
            Duration::ZERO,
        );
        runner.recover().await.unwrap();

        assert!(!submitted.path().exists());
        assert!(done.path().is_dir());
    }

    #[tokio::test]
    async fn corrupt_record_is_remembered_and_skipped() {
        let tmp = TempDir::new().unwrap();
        let store = FsTaskStore::new(tmp.path());
        let broken = store
            .create(&owner(), &id("broken"), &record(), b"x")
            .await
            .unwrap();
        std::fs::write(broken.record_path(), b"{oops").unwrap();
        let executor = Arc::new(FakeExecutor::replying("a\n", 0));
        let mut runner = TaskRunner::new(Arc::new(store.clone()), executor.clone(), Duration::ZERO);

        assert_eq!(runner.run_once().await, Iteration::Idle);
        assert_eq!(runner.run_once().await, Iteration::Idle);

        assert_eq!(runner.problem_list().collect::<Vec<_>>(), vec![&broken]);
        assert!(broken.path().is_dir());
        assert!(executor.calls.lock().await.is_empty());

        // healthy tasks behind it are still picked up
        store.create(&owner(), &id("fine"), &record(), b"x").await.unwrap();
        assert!(matches!(runner.run_once().await, Iteration::Processed(_)));
    }

    /// Delegates to an in-memory store but refuses to move one task.
    struct StuckStore {
        inner: InMemoryTaskStore,
        stuck: TaskId,
    }

    #[async_trait]
    impl TaskStore for StuckStore {
        async fn locate(&self, id: &TaskId, stage: Stage) -> Result<Option<TaskLocation>> {
            self.inner.locate(id, stage).await
        }

        async fn create(
            &self,
            owner: &Owner,
            id: &TaskId,
            record: &TaskRecord,
            payload: &[u8],
        ) -> Result<TaskLocation> {
            self.inner.create(owner, id, record, payload).await
        }

        async fn move_to(&self, task: &TaskLocation, stage: Stage) -> Result<TaskLocation> {
            if task.id() == &self.stuck {
                return Err(ShuttleError::io(
                    task.path(),
                    std::io::Error::other("read-only file system"),
                ));
            }
            self.inner.move_to(task, stage).await
        }

        async fn delete(&self, task: &TaskLocation) -> Result<()> {
            self.inner.delete(task).await
        }

        async fn list(&self, stage: Stage) -> Result<Vec<TaskLocation>> {
            self.inner.list(stage).await
        }

        async fn read_record(&self, task: &TaskLocation) -> Result<Option<TaskRecord>> {
            self.inner.read_record(task).await
        }

        async fn write_record(&self, task: &TaskLocation, record: &TaskRecord) -> Result<()> {
            self.inner.write_record(task, record).await
        }

        async fn read_result(&self, task: &TaskLocation) -> Result<Option<ResultRows>> {
            self.inner.read_result(task).await
        }

        async fn write_result(&self, task: &TaskLocation, rows: &ResultRows) -> Result<()> {
            self.inner.write_result(task, rows).await
        }
    }

    #[tokio::test]
    async fn unmovable_task_is_set_aside_and_later_tasks_still_run() {
        let store = InMemoryTaskStore::new();
        let stuck = store
            .insert(Stage::Submitted, &owner(), &id("stuck"), Some(record()), None)
            .await;
        store
            .insert(Stage::Submitted, &owner(), &id("healthy"), Some(record()), None)
            .await;
        let executor = Arc::new(FakeExecutor::replying("a\tb\tc\td\n", 0));
        let mut runner = TaskRunner::new(
            Arc::new(StuckStore {
                inner: store.clone(),
                stuck: id("stuck"),
            }),
            executor.clone(),
            Duration::ZERO,
        );

        assert_eq!(runner.run_once().await, Iteration::Idle);
        assert_eq!(runner.problem_list().collect::<Vec<_>>(), vec![&stuck]);

        let Iteration::Processed(done) = runner.run_once().await else {
            panic!("expected the healthy task to be processed");
        };
        assert_eq!(done.id(), &id("healthy"));
        assert_eq!(done.stage(), Stage::Done);
        assert_eq!(runner.run_once().await, Iteration::Idle);

        // the stuck task was never executed and is still where it was
        assert_eq!(executor.calls.lock().await.len(), 1);
        assert!(store.locate(&id("stuck"), Stage::Submitted).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn recovery_completes_processing_task_that_has_a_result() {
        let store = InMemoryTaskStore::new();
        store
            .insert(
                Stage::Processing,
                &owner(),
                &id("written"),
                Some(record()),
                Some(parse_table("a\tb\tc\td\n")),
            )
            .await;
        let runner = runner(&store, Arc::new(FakeExecutor::replying("a\n", 0)));

        runner.recover().await.unwrap();

        let done = store.locate(&id("written"), Stage::Done).await.unwrap().unwrap();
        assert_eq!(store.read_record(&done).await.unwrap().unwrap().error(), None);
        let status = StatusService::new(Arc::new(store.clone()))
            .query(&id("written"))
            .await
            .unwrap();
        let TaskStatus::Done { result, error, .. } = status else {
            panic!("expected done");
        };
        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(error, None);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let store = InMemoryTaskStore::new();
        store
            .insert(Stage::Submitted, &owner(), &id("abc"), Some(record()), None)
            .await;
        let mut runner = TaskRunner::new(
            Arc::new(store.clone()),
            Arc::new(FakeExecutor::replying("a\tb\tc\td\n", 0)),
            Duration::from_millis(10),
        );
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            runner.run(rx).await;
        });
        // give the loop time to pick up the task and go idle
        for _ in 0..100 {
            if !store.list(Stage::Done).await.unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(store.locate(&id("abc"), Stage::Done).await.unwrap().is_some());
    }
}
