use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for outcome and personalized comments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

/// Owner scope shared by every comment bank entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PronounId(pub String);

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reusable, rated comment a teacher can pick independently of the grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedComment {
    pub id: CommentId,
    pub text: String,
    /// Sentiment score on the 1..=5 scale; `None` reads as unrated.
    #[serde(default)]
    pub rating: Option<f64>,
    pub subject_id: SubjectId,
}

/// Canned comment attached to an inclusive grade band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeComment {
    pub id: CommentId,
    pub text: String,
    pub lower_range: i32,
    pub upper_range: i32,
    pub subject_id: SubjectId,
}

impl OutcomeComment {
    pub fn covers(&self, grade: f64) -> bool {
        f64::from(self.lower_range) <= grade && grade <= f64::from(self.upper_range)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pronoun {
    pub id: PronounId,
    pub subject_pronoun: String,
    pub possessive_pronoun: String,
}

/// In-progress final comment text held by the editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftComment {
    pub text: String,
    /// Set once the user typed or a candidate was written in; never derived from content.
    pub dirty: bool,
}

impl DraftComment {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Submitted final comment as handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalComment {
    pub id: CommentId,
    pub subject_id: SubjectId,
    pub first_name: String,
    pub last_name: String,
    pub grade: f64,
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
}

/// Student details collected alongside the draft when a final comment is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    pub first_name: String,
    pub last_name: String,
    pub grade: f64,
}

/// Anything that exposes comment text for duplicate scans.
pub trait CommentText {
    fn comment_text(&self) -> &str;
}

impl CommentText for PersonalizedComment {
    fn comment_text(&self) -> &str {
        &self.text
    }
}

impl CommentText for OutcomeComment {
    fn comment_text(&self) -> &str {
        &self.text
    }
}
