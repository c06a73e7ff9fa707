//! Executor port - 外部の計算ツール
//!
//! 実際の計算はコンテナ内の外部ツールが行います。ここではその境界だけを定義します。
//!
//! # 実装
//! - **ContainerExecutor**: `docker run` でツールを起動（本番用）

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;

/// Everything the tool needs for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    /// Task directory; mounted into the container and used as working dir.
    pub workdir: PathBuf,
    /// Input payload inside `workdir`.
    pub input: PathBuf,
    pub alpha: f64,
    pub beta: f64,
}

/// Captured output of one run.
///
/// `exit_code` is informational only: the tool is known to report a nonzero
/// status on successful runs, so callers judge success by `stdout`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ExecutionOutput {
    pub fn exited_cleanly(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executor runs the external tool and captures its output.
///
/// `Err` means the tool could not be run at all (e.g. the container runtime is
/// missing); a run that produced output, whatever its exit status, is `Ok`.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionOutput>;
}
