//! Status view returned to clients.

use serde::Serialize;

use super::{Parameters, ResultRows};

/// What a status lookup reports for one task id.
///
/// Serialized with a `status` tag (`submitted`, `processing`, `done`,
/// `notfound`). `parameters` is `null` when the record file is absent or
/// unreadable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatus {
    Submitted {
        parameters: Option<Parameters>,
    },
    Processing {
        parameters: Option<Parameters>,
    },
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<ResultRows>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        parameters: Option<Parameters>,
    },
    NotFound,
}

impl TaskStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done { .. })
    }

    /// True for a finished task that carries an error annotation.
    pub fn is_failed(&self) -> bool {
        matches!(self, TaskStatus::Done { error: Some(_), .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_found_serializes_as_tag_only() {
        let value = serde_json::to_value(TaskStatus::NotFound).unwrap();
        assert_eq!(value, json!({ "status": "notfound" }));
    }

    #[test]
    fn failed_done_has_error_and_no_result() {
        let status = TaskStatus::Done {
            result: None,
            error: Some("boom".to_string()),
            parameters: None,
        };
        assert!(status.is_done());
        assert!(status.is_failed());
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(
            value,
            json!({ "status": "done", "error": "boom", "parameters": null })
        );
    }
}
