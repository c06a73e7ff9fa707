//! FsTaskStore - ディレクトリツリーによる TaskStore 実装（本番用）
//!
//! # レイアウト
//! ```text
//! root/
//!   submitted/<owner>/<id>/{interactionfile, task.json}
//!   processing/<owner>/<id>/...
//!   done/<owner>/<id>/{..., result.json}
//!   delete_requests/<id>        (FsDeleteRequests)
//! ```
//!
//! # 書き込み順序
//! - payload を書いて sync してから、record を tmp に書いて rename
//! - result を書いて sync してから、done への rename
//!
//! stage 間の移動はディレクトリ丸ごとの rename 1 回だけです。

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::task::{RECORD_TMP_FILE, TASK_FILES};
use crate::domain::{Owner, ResultRows, Stage, TaskId, TaskLocation, TaskRecord};
use crate::error::{Result, ShuttleError};
use crate::ports::TaskStore;

/// Task store over a shared root directory.
#[derive(Debug, Clone)]
pub struct FsTaskStore {
    root: PathBuf,
}

impl FsTaskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    /// Writes the record to a temporary file and renames it into place.
    async fn replace_record(&self, task: &TaskLocation, record: &TaskRecord) -> Result<()> {
        let path = task.record_path();
        let bytes = serde_json::to_vec(record).map_err(|source| ShuttleError::Encode {
            path: path.clone(),
            source,
        })?;
        let tmp = task.path().join(RECORD_TMP_FILE);
        write_synced(&tmp, &bytes).await?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| ShuttleError::io(&path, e))
    }

    async fn create_inner(
        &self,
        location: &TaskLocation,
        record: &TaskRecord,
        payload: &[u8],
    ) -> Result<()> {
        write_synced(&location.payload_path(), payload).await?;
        tracing::debug!(
            path = %location.payload_path().display(),
            bytes = payload.len(),
            "payload saved"
        );
        self.replace_record(location, record).await
    }
}

/// Creates (or truncates) `path`, writes `bytes` and flushes them to disk.
pub(crate) async fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path)
        .await
        .map_err(|e| ShuttleError::io(path, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| ShuttleError::io(path, e))?;
    file.sync_all().await.map_err(|e| ShuttleError::io(path, e))
}

/// Names of the subdirectories of `dir`, in listing order.
///
/// A directory that does not exist (or vanished mid-scan because a task was
/// moved) has no subdirectories.
async fn subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ShuttleError::io(dir, e)),
    };

    let mut dirs = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) if e.kind() == ErrorKind::NotFound => break,
            Err(e) => return Err(ShuttleError::io(dir, e)),
        };
        let is_dir = match entry.file_type().await {
            Ok(file_type) => file_type.is_dir(),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(ShuttleError::io(entry.path(), e)),
        };
        if !is_dir {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %entry.path().display(), "skipping non utf-8 directory name");
            continue;
        };
        dirs.push((name, entry.path()));
    }
    Ok(dirs)
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ShuttleError::io(path, e)),
    }
}

#[async_trait]
impl TaskStore for FsTaskStore {
    async fn locate(&self, id: &TaskId, stage: Stage) -> Result<Option<TaskLocation>> {
        for (owner, owner_path) in subdirs(&self.stage_dir(stage)).await? {
            for (name, _) in subdirs(&owner_path).await? {
                if name != id.as_str() {
                    continue;
                }
                let Ok(owner) = Owner::parse(&owner) else {
                    tracing::warn!(path = %owner_path.display(), "invalid owner partition");
                    break;
                };
                return Ok(Some(TaskLocation::new(&self.root, stage, owner, id.clone())));
            }
        }
        Ok(None)
    }

    async fn create(
        &self,
        owner: &Owner,
        id: &TaskId,
        record: &TaskRecord,
        payload: &[u8],
    ) -> Result<TaskLocation> {
        let location = TaskLocation::new(&self.root, Stage::Submitted, owner.clone(), id.clone());
        let owner_dir = location.owner_dir();
        fs::create_dir_all(&owner_dir)
            .await
            .map_err(|e| ShuttleError::io(&owner_dir, e))?;

        let dir = location.path();
        fs::create_dir(&dir)
            .await
            .map_err(|e| ShuttleError::io(&dir, e))?;

        if let Err(err) = self.create_inner(&location, record, payload).await {
            // No record means the runner never sees it, but status lookups
            // would; take the half-written directory away.
            if let Err(cleanup) = fs::remove_dir_all(&dir).await {
                tracing::warn!(path = %dir.display(), error = %cleanup, "unable to clean up partial task");
            }
            return Err(err);
        }

        tracing::debug!(task_id = %id, path = %dir.display(), "task created");
        Ok(location)
    }

    async fn move_to(&self, task: &TaskLocation, stage: Stage) -> Result<TaskLocation> {
        if task.stage() == stage {
            tracing::debug!(path = %task, "attempt to move task to same stage");
            return Ok(task.clone());
        }

        let dest = task.with_stage(stage);
        let parent = dest.owner_dir();
        fs::create_dir_all(&parent)
            .await
            .map_err(|e| ShuttleError::io(&parent, e))?;

        tracing::debug!(task_id = %task.id(), from = %task.stage(), to = %stage, "changing task stage");
        fs::rename(task.path(), dest.path())
            .await
            .map_err(|e| ShuttleError::io(task.path(), e))?;
        Ok(dest)
    }

    async fn delete(&self, task: &TaskLocation) -> Result<()> {
        let dir = task.path();
        let metadata = fs::metadata(&dir).await.map_err(|e| ShuttleError::Delete {
            path: dir.clone(),
            reason: e.to_string(),
        })?;
        if !metadata.is_dir() {
            return Err(ShuttleError::Delete {
                path: dir,
                reason: "not a directory".to_string(),
            });
        }

        // Only files the lifecycle is known to produce are removed. Anything
        // else stays, which makes the final remove_dir fail.
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| ShuttleError::io(&dir, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShuttleError::io(&dir, e))?
        {
            let name = entry.file_name();
            let known = name.to_str().is_some_and(|n| TASK_FILES.contains(&n));
            if !known {
                tracing::warn!(
                    path = %entry.path().display(),
                    "not a file created by the task, leaving it in place"
                );
                continue;
            }
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ShuttleError::io(entry.path(), e))?;
            if file_type.is_file() {
                fs::remove_file(entry.path())
                    .await
                    .map_err(|e| ShuttleError::io(entry.path(), e))?;
            }
        }

        fs::remove_dir(&dir).await.map_err(|e| ShuttleError::Delete {
            path: dir.clone(),
            reason: e.to_string(),
        })
    }

    async fn list(&self, stage: Stage) -> Result<Vec<TaskLocation>> {
        let mut tasks = Vec::new();
        for (owner, owner_path) in subdirs(&self.stage_dir(stage)).await? {
            let Ok(owner) = Owner::parse(&owner) else {
                tracing::warn!(path = %owner_path.display(), "invalid owner partition");
                continue;
            };
            for (name, task_path) in subdirs(&owner_path).await? {
                match TaskId::parse(&name) {
                    Ok(id) => tasks.push(TaskLocation::new(&self.root, stage, owner.clone(), id)),
                    Err(err) => {
                        tracing::warn!(path = %task_path.display(), error = %err, "skipping task directory");
                    }
                }
            }
        }
        Ok(tasks)
    }

    async fn read_record(&self, task: &TaskLocation) -> Result<Option<TaskRecord>> {
        let path = task.record_path();
        let Some(bytes) = read_optional(&path).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ShuttleError::RecordParse { path, source })
    }

    async fn write_record(&self, task: &TaskLocation, record: &TaskRecord) -> Result<()> {
        tracing::debug!(path = %task.record_path().display(), "writing task record");
        self.replace_record(task, record).await
    }

    async fn read_result(&self, task: &TaskLocation) -> Result<Option<ResultRows>> {
        let path = task.result_path();
        let Some(bytes) = read_optional(&path).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ShuttleError::ResultParse { path, source })
    }

    async fn write_result(&self, task: &TaskLocation, rows: &ResultRows) -> Result<()> {
        let path = task.result_path();
        let bytes = serde_json::to_vec(rows).map_err(|source| ShuttleError::Encode {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "writing result");
        write_synced(&path, &bytes).await
    }
}
