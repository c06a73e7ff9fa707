//! FsDeleteRequests - マーカーファイルによる削除リクエスト（本番用）
//!
//! `root/delete_requests/<id>` に依頼元アドレスを書いたファイルを置きます（sync 済み）。
//! 同じ id への依頼は同じファイルを上書きするだけなので、自然にまとまります。
//!
//! # pop の順序
//! ディレクトリの列挙順で最初に見つかったマーカーを取り除きます。
//! 削除（remove_file）に失敗したマーカーは返しません。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::domain::TaskId;
use crate::error::{Result, ShuttleError};
use crate::impls::fs_store::write_synced;
use crate::ports::DeleteRequestQueue;

/// Directory (under the queue root) holding delete request markers.
pub const DELETE_REQUESTS_DIR: &str = "delete_requests";

#[derive(Debug, Clone)]
pub struct FsDeleteRequests {
    dir: PathBuf,
}

impl FsDeleteRequests {
    /// Marker queue under `root/delete_requests`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join(DELETE_REQUESTS_DIR),
        }
    }

    /// Marker file names in listing order. A missing directory has none.
    async fn markers(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ShuttleError::io(&self.dir, e)),
        };
        let mut markers = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShuttleError::io(&self.dir, e))?
        {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                markers.push((name.to_string(), entry.path()));
            }
        }
        Ok(markers)
    }
}

#[async_trait]
impl DeleteRequestQueue for FsDeleteRequests {
    async fn push(&self, id: &TaskId, requester: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ShuttleError::io(&self.dir, e))?;
        let path = self.dir.join(id.as_str());
        write_synced(&path, requester.as_bytes()).await?;
        tracing::debug!(task_id = %id, requester, "delete request saved");
        Ok(())
    }

    async fn pop(&self) -> Result<Option<TaskId>> {
        for (name, path) in self.markers().await? {
            if let Err(e) = fs::remove_file(&path).await {
                // someone else took it, or it cannot be removed; try the next one
                tracing::warn!(path = %path.display(), error = %e, "unable to remove delete request");
                continue;
            }
            match TaskId::parse(&name) {
                Ok(id) => return Ok(Some(id)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "discarding invalid delete request");
                }
            }
        }
        Ok(None)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.markers().await?.len())
    }
}
