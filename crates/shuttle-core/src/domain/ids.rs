//! Domain identifiers (strongly-typed, path-safe).
//!
//! # ID とパス
//! TaskId と Owner はどちらもディレクトリ名としてそのまま使われます
//! （`root/<stage>/<owner>/<id>`）。そのため生成時に「1 つのパス要素で
//! あること」を検証し、`..` や `/` を含む値は型として存在できないようにしています。
//!
//! 新しい TaskId は ULID から作られます（`ports::IdGenerator`）。
//! ただし既存のディレクトリから読み戻した ID は任意の文字列なので、
//! 内部表現は `String` です。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

use crate::error::{Result, ShuttleError};

/// Longest task id accepted from the outside (delete requests, status lookups).
pub const MAX_TASK_ID_LEN: usize = 40;

/// Checks that `value` can be used as exactly one directory name.
fn check_path_component(value: &str) -> std::result::Result<(), &'static str> {
    if value.is_empty() {
        return Err("is empty");
    }
    if value == "." || value == ".." {
        return Err("is a relative path component");
    }
    if value.contains(['/', '\\', '\0']) {
        return Err("contains a path separator");
    }
    Ok(())
}

/// Identifier of a task; also the name of its directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Parses an id supplied by a caller or read back from storage.
    ///
    /// Surrounding whitespace is trimmed. Empty ids, ids longer than
    /// [`MAX_TASK_ID_LEN`] characters and ids that are not a single path
    /// component are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let clean = raw.trim();
        if clean.chars().count() > MAX_TASK_ID_LEN {
            return Err(ShuttleError::InvalidTaskId(
                raw.to_string(),
                "is longer than 40 characters",
            ));
        }
        check_path_component(clean)
            .map_err(|reason| ShuttleError::InvalidTaskId(raw.to_string(), reason))?;
        Ok(Self(clean.to_string()))
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskId {
    type Error = ShuttleError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl From<Ulid> for TaskId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Network address of the submitting client.
///
/// Used only as a partition directory to keep stage directories small; it is
/// not an access-control boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Owner(String);

impl Owner {
    pub fn parse(raw: &str) -> Result<Self> {
        let clean = raw.trim();
        check_path_component(clean)
            .map_err(|reason| ShuttleError::InvalidOwner(raw.to_string(), reason))?;
        Ok(Self(clean.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Owner {
    type Error = ShuttleError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Owner> for String {
    fn from(owner: Owner) -> Self {
        owner.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
