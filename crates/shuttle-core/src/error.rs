use std::path::PathBuf;

use thiserror::Error;

use crate::domain::TaskId;

#[derive(Debug, Error)]
pub enum ShuttleError {
    #[error("invalid task id {0:?}: {1}")]
    InvalidTaskId(String, &'static str),

    #[error("invalid owner {0:?}: {1}")]
    InvalidOwner(String, &'static str),

    #[error("input payload is required")]
    MissingPayload,

    #[error("unable to extract stage and root from task path {}", .0.display())]
    Uninitialized(PathBuf),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse task record {}: {source}", .path.display())]
    RecordParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to parse result {}: {source}", .path.display())]
    ResultParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to remove task directory {}: {reason}", .path.display())]
    Delete { path: PathBuf, reason: String },

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("no result found for completed task {0}")]
    ResultMissing(TaskId),

    #[error("executor failed: {0}")]
    Executor(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ShuttleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors caused by the caller's input rather than by storage or execution.
    ///
    /// A front end maps these to a 400-class response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ShuttleError::InvalidTaskId(..)
                | ShuttleError::InvalidOwner(..)
                | ShuttleError::MissingPayload
        )
    }
}

pub type Result<T> = std::result::Result<T, ShuttleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_classified() {
        assert!(ShuttleError::MissingPayload.is_client_error());
        assert!(ShuttleError::InvalidTaskId(String::new(), "empty").is_client_error());
        assert!(!ShuttleError::Executor("boom".to_string()).is_client_error());
        assert!(!ShuttleError::Uninitialized(PathBuf::from("/x")).is_client_error());
    }

    #[test]
    fn io_error_mentions_path() {
        let err = ShuttleError::io(
            "/tmp/does/not/exist",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/does/not/exist"));
        assert!(msg.contains("gone"));
    }
}
