//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! Settings から本番用の実装（FsTaskStore / FsDeleteRequests / ContainerExecutor）を
//! 組み立てます。テストでは `with_executor` で Executor だけ差し替えられます。
//!
//! # Fail-fast 設計
//! runner は既存のツリーに対してしか動かないので、`build_runner()` の時点で
//! task_dir がディレクトリであることを確認します。

use std::path::Path;
use std::sync::Arc;

use crate::app::delete::DeleteChannel;
use crate::app::runner::TaskRunner;
use crate::app::status::StatusService;
use crate::app::submission::SubmissionService;
use crate::config::Settings;
use crate::error::{Result, ShuttleError};
use crate::impls::{ContainerExecutor, FsDeleteRequests, FsTaskStore};
use crate::observability::QueueCounts;
use crate::ports::{DeleteRequestQueue, Executor, SystemClock, TaskStore, UlidGenerator};

/// AppBuilder は producer 側（App）と runner 側（TaskRunner）を構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(Settings::from_env()?).build();
/// let receipt = app.submission.submit(&owner, request).await?;
///
/// let mut runner = AppBuilder::new(settings).build_runner()?;
/// runner.run(shutdown_rx).await;
/// ```
pub struct AppBuilder {
    settings: Settings,
    executor: Option<Arc<dyn Executor>>,
}

impl AppBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            executor: None,
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Producer side over `service.job_path`.
    pub fn build(self) -> App {
        let root = &self.settings.service.job_path;
        let store: Arc<dyn TaskStore> = Arc::new(FsTaskStore::new(root));
        let delete_requests: Arc<dyn DeleteRequestQueue> = Arc::new(FsDeleteRequests::new(root));
        let ids = Arc::new(UlidGenerator::new(SystemClock));

        App {
            submission: SubmissionService::new(store.clone(), ids, self.settings.service.clone()),
            status: StatusService::new(store.clone()),
            deletes: DeleteChannel::new(store.clone(), delete_requests.clone()),
            store,
            delete_requests,
            settings: self.settings,
        }
    }

    /// Runner over `runner.task_dir`.
    pub fn build_runner(self) -> Result<TaskRunner> {
        let config = &self.settings.runner;
        ensure_dir(&config.task_dir)?;
        let store: Arc<dyn TaskStore> = Arc::new(FsTaskStore::new(&config.task_dir));
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(ContainerExecutor::new(config.executor.clone())));

        let mut runner = TaskRunner::new(store.clone(), executor, config.wait_interval())
            .recover_on_start(config.recover_on_start);
        if config.delete_enabled {
            let requests = Arc::new(FsDeleteRequests::new(&config.task_dir));
            runner = runner.with_delete_channel(DeleteChannel::new(store, requests));
        }
        Ok(runner)
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ShuttleError::Config(format!(
            "{} is not a directory",
            path.display()
        )))
    }
}

/// App は producer 側のサービス一式
pub struct App {
    pub submission: SubmissionService,
    pub status: StatusService,
    pub deletes: DeleteChannel,
    store: Arc<dyn TaskStore>,
    delete_requests: Arc<dyn DeleteRequestQueue>,
    settings: Settings,
}

impl App {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn counts(&self) -> Result<QueueCounts> {
        QueueCounts::collect(self.store.as_ref(), self.delete_requests.as_ref()).await
    }
}
