//! ContainerExecutor - `docker run` でツールを起動する Executor（本番用）
//!
//! タスクディレクトリをそのままのパスでコンテナにマウントし、
//! 作業ディレクトリにしてからツールを実行します。
//!
//! ```text
//! docker run --rm -v <dir>:<dir> -w <dir> <image> <tool> <input> <alpha> <beta>
//! ```

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::ExecutorConfig;
use crate::error::{Result, ShuttleError};
use crate::ports::{ExecutionOutput, ExecutionRequest, Executor};

#[derive(Debug, Clone)]
pub struct ContainerExecutor {
    config: ExecutorConfig,
}

impl ContainerExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Arguments passed to the container runtime for `request`.
    pub fn build_args(&self, request: &ExecutionRequest) -> Vec<String> {
        let workdir = request.workdir.display().to_string();
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{workdir}:{workdir}"),
            "-w".to_string(),
            workdir,
            self.config.image.clone(),
            self.config.tool_path.clone(),
            request.input.display().to_string(),
            request.alpha.to_string(),
            request.beta.to_string(),
        ]
    }
}

#[async_trait]
impl Executor for ContainerExecutor {
    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionOutput> {
        let args = self.build_args(request);
        tracing::info!(
            program = %self.config.program,
            image = %self.config.image,
            workdir = %request.workdir.display(),
            "running tool"
        );
        tracing::debug!(args = ?args, "container command");

        let output = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                ShuttleError::Executor(format!("unable to start {}: {e}", self.config.program))
            })?;

        let output = ExecutionOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        tracing::info!(
            exit_code = ?output.exit_code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "tool finished"
        );
        Ok(output)
    }
}
