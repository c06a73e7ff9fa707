//! Settings for the producer side, the runner and the executor.
//!
//! Everything has a default; a TOML file named by `SHUTTLE_SETTINGS` may
//! override any subset:
//!
//! ```toml
//! [service]
//! job_path = "/var/lib/shuttle"
//! wait_count = 60
//! sleep_time = 10
//!
//! [runner]
//! task_dir = "/var/lib/shuttle"
//! wait_time = 30
//!
//! [runner.executor]
//! image = "michaelkyu/ddot-anaconda3"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, ShuttleError};

/// Environment variable naming the settings file.
pub const SETTINGS_ENV: &str = "SHUTTLE_SETTINGS";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub service: ServiceConfig,
    pub runner: RunnerConfig,
}

impl Settings {
    /// Reads the file named by `SHUTTLE_SETTINGS`, or returns defaults when
    /// the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ShuttleError::io(path, e))?;
        Self::from_toml_str(&text)
            .map_err(|e| ShuttleError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ShuttleError::Config(e.to_string()))
    }
}

/// Producer side: where tasks are created and how long a waiting caller polls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Root of the task tree.
    pub job_path: PathBuf,
    /// Attempts made by a bounded wait.
    pub wait_count: u32,
    /// Seconds between bounded wait attempts.
    pub sleep_time: u64,
    /// Prefix of the resource locator returned by a submission.
    pub namespace: String,
    /// Recorded as `tasktype` in every new record.
    pub task_type: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            job_path: PathBuf::from("/tmp"),
            wait_count: 60,
            sleep_time: 10,
            namespace: "ddot".to_string(),
            task_type: "ddot_ontology".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_time)
    }
}

/// Worker side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Root of the task tree; must be the producer's `job_path`.
    pub task_dir: PathBuf,
    /// Seconds to sleep when there is no work.
    pub wait_time: u64,
    /// Drain delete requests each iteration.
    pub delete_enabled: bool,
    /// Reconcile duplicated tasks and finish orphaned `Processing` tasks at startup.
    pub recover_on_start: bool,
    pub executor: ExecutorConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            task_dir: PathBuf::from("/tmp"),
            wait_time: 30,
            delete_enabled: true,
            recover_on_start: true,
            executor: ExecutorConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn wait_interval(&self) -> Duration {
        Duration::from_secs(self.wait_time)
    }
}

/// How the external tool is started.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Container runtime binary.
    pub program: String,
    pub image: String,
    /// Path of the tool inside the image.
    pub tool_path: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
            image: "michaelkyu/ddot-anaconda3".to_string(),
            tool_path: "/opt/conda/lib/python3.7/site-packages/ddot/clixo_0.3/clixo".to_string(),
        }
    }
}
