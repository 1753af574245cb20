use serde::{Deserialize, Serialize};

use super::domain::SubjectId;

/// Request for the server-side copy of personalized comments between subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyCommentsRequest {
    pub source_subject_id: SubjectId,
    pub target_subject_id: SubjectId,
    /// Replace the target's comments instead of appending to them.
    #[serde(default)]
    pub overwrite: bool,
}

/// Counts reported by the copy collaborator, consumed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyCommentsResult {
    pub success_count: u32,
    #[serde(default)]
    pub duplicate_count: u32,
    #[serde(default)]
    pub overwrite: bool,
}

impl CopyCommentsResult {
    pub fn summary(&self) -> String {
        if self.overwrite {
            return format!(
                "Replaced the target subject's comments with {}.",
                pluralize(self.success_count, "comment")
            );
        }

        let mut message = format!(
            "Copied {} to the target subject.",
            pluralize(self.success_count, "comment")
        );
        if self.duplicate_count > 0 {
            message.push_str(&format!(
                " Skipped {}.",
                pluralize(self.duplicate_count, "duplicate comment")
            ));
        }
        message
    }
}

/// `"1 comment"`, `"0 comments"`, `"5 comments"`.
pub fn pluralize(count: u32, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
