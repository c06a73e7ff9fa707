//! Task location and task record.
//!
//! A task lives at `root/<stage>/<owner>/<id>`. The location is the task's
//! identity *and* its lifecycle state; the record only holds parameters and
//! annotations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

use super::{Owner, Stage, TaskId};
use crate::error::{Result, ShuttleError};

/// Canonical record file inside a task directory.
pub const RECORD_FILE: &str = "task.json";

/// Temporary name the record is written to before it is renamed into place.
pub const RECORD_TMP_FILE: &str = "task.json.tmp";

/// Input payload supplied at submission.
pub const PAYLOAD_FILE: &str = "interactionfile";

/// Parsed executor output, written before the move to `Done`.
pub const RESULT_FILE: &str = "result.json";

/// Every file the lifecycle is known to produce. Deletion only removes these.
pub const TASK_FILES: [&str; 4] = [RESULT_FILE, RECORD_FILE, RECORD_TMP_FILE, PAYLOAD_FILE];

/// Where a task currently lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskLocation {
    root: PathBuf,
    stage: Stage,
    owner: Owner,
    id: TaskId,
}

impl TaskLocation {
    pub fn new(root: impl Into<PathBuf>, stage: Stage, owner: Owner, id: TaskId) -> Self {
        Self {
            root: root.into(),
            stage,
            owner,
            id,
        }
    }

    /// Decomposes `root/<stage>/<owner>/<id>` back into its parts.
    pub fn from_path(path: &Path) -> Result<Self> {
        let uninitialized = || ShuttleError::Uninitialized(path.to_path_buf());

        let id = path.file_name().and_then(|n| n.to_str()).ok_or_else(uninitialized)?;
        let owner_dir = path.parent().ok_or_else(uninitialized)?;
        let owner = owner_dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(uninitialized)?;
        let stage_dir = owner_dir.parent().ok_or_else(uninitialized)?;
        let stage = stage_dir
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(Stage::from_dir_name)
            .ok_or_else(uninitialized)?;
        let root = stage_dir.parent().ok_or_else(uninitialized)?;

        Ok(Self {
            root: root.to_path_buf(),
            stage,
            owner: Owner::parse(owner).map_err(|_| uninitialized())?,
            id: TaskId::parse(id).map_err(|_| uninitialized())?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Same task, different stage. Only the stage segment of the path changes.
    pub fn with_stage(&self, stage: Stage) -> Self {
        Self {
            stage,
            ..self.clone()
        }
    }

    /// Directory holding the owner partitions of this task's stage.
    pub fn owner_dir(&self) -> PathBuf {
        self.root.join(self.stage.dir_name()).join(self.owner.as_str())
    }

    pub fn path(&self) -> PathBuf {
        self.owner_dir().join(self.id.as_str())
    }

    pub fn record_path(&self) -> PathBuf {
        self.path().join(RECORD_FILE)
    }

    pub fn payload_path(&self) -> PathBuf {
        self.path().join(PAYLOAD_FILE)
    }

    pub fn result_path(&self) -> PathBuf {
        self.path().join(RESULT_FILE)
    }
}

impl fmt::Display for TaskLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

/// Open parameter mapping persisted in the record file.
pub type Parameters = serde_json::Map<String, Value>;

/// The persisted record of a task: its parameters plus bookkeeping fields.
///
/// The mapping stays open so that fields written by other tools survive a
/// read-modify-write cycle untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRecord(Parameters);

impl TaskRecord {
    pub const ALPHA: &'static str = "alpha";
    pub const BETA: &'static str = "beta";
    pub const UUID: &'static str = "uuid";
    pub const TASK_TYPE: &'static str = "tasktype";
    pub const REMOTE_IP: &'static str = "remoteip";
    pub const INPUT_FILE: &'static str = "interactionfile";
    pub const ERROR: &'static str = "error";

    pub fn new(parameters: Parameters) -> Self {
        Self(parameters)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn alpha(&self) -> Option<f64> {
        self.0.get(Self::ALPHA).and_then(Value::as_f64)
    }

    pub fn beta(&self) -> Option<f64> {
        self.0.get(Self::BETA).and_then(Value::as_f64)
    }

    pub fn error(&self) -> Option<&str> {
        self.0.get(Self::ERROR).and_then(Value::as_str)
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.insert(Self::ERROR, message.into());
    }

    /// Parameters safe to echo back to clients (the owner address is dropped).
    pub fn public_parameters(&self) -> Parameters {
        let mut params = self.0.clone();
        params.remove(Self::REMOTE_IP);
        params
    }
}

/// A discovered task: where it is plus what its record says.
#[derive(Debug, Clone)]
pub struct Task {
    pub location: TaskLocation,
    pub record: TaskRecord,
}

impl Task {
    pub fn new(location: TaskLocation, record: TaskRecord) -> Self {
        Self { location, record }
    }

    pub fn id(&self) -> &TaskId {
        self.location.id()
    }
}
