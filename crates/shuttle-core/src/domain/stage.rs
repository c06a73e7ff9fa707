//! Lifecycle stages of a task.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a task, derived from the directory that holds it.
///
/// State transitions:
/// - Submitted -> Processing -> Done
/// - Submitted -> Processing -> Done (with an error annotation)
///
/// There is no separate error stage. A failed task is annotated in its record
/// and then moved to `Done` exactly like a successful one. Nothing leaves
/// `Done` except whole-task deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Created by the submission service, waiting for the runner.
    Submitted,

    /// Claimed by the runner and being executed.
    Processing,

    /// Finished, with either a result or an error annotation.
    Done,
}

impl Stage {
    /// All stages in lifecycle order.
    pub const ALL: [Stage; 3] = [Stage::Submitted, Stage::Processing, Stage::Done];

    /// Search order used when resolving a delete request.
    pub const DELETE_SEARCH_ORDER: [Stage; 3] = [Stage::Processing, Stage::Submitted, Stage::Done];

    /// Directory name of this stage under the queue root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Stage::Submitted => "submitted",
            Stage::Processing => "processing",
            Stage::Done => "done",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Stage::ALL.into_iter().find(|stage| stage.dir_name() == name)
    }

    /// Is this a terminal stage (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::submitted(Stage::Submitted, "submitted")]
    #[case::processing(Stage::Processing, "processing")]
    #[case::done(Stage::Done, "done")]
    fn dir_names_round_trip(#[case] stage: Stage, #[case] name: &str) {
        assert_eq!(stage.dir_name(), name);
        assert_eq!(Stage::from_dir_name(name), Some(stage));
    }

    #[test]
    fn unknown_dir_name_is_not_a_stage() {
        assert_eq!(Stage::from_dir_name("delete_requests"), None);
        assert_eq!(Stage::from_dir_name("error"), None);
    }

    #[test]
    fn lifecycle_order_matches_ord() {
        assert!(Stage::Submitted < Stage::Processing);
        assert!(Stage::Processing < Stage::Done);
        assert!(Stage::Done.is_terminal());
        assert!(!Stage::Processing.is_terminal());
    }
}
