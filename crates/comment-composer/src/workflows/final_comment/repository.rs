use super::copy::{CopyCommentsRequest, CopyCommentsResult};
use super::domain::{FinalComment, OutcomeComment, PersonalizedComment, Pronoun, SubjectId};

/// Read/write access to a subject's comment banks and the shared pronoun list.
pub trait CommentCatalog: Send + Sync {
    fn outcome_comments(&self, subject: &SubjectId) -> Result<Vec<OutcomeComment>, RepositoryError>;
    fn personalized_comments(
        &self,
        subject: &SubjectId,
    ) -> Result<Vec<PersonalizedComment>, RepositoryError>;
    fn pronouns(&self) -> Result<Vec<Pronoun>, RepositoryError>;
    fn insert_outcome(&self, comment: OutcomeComment) -> Result<OutcomeComment, RepositoryError>;
    fn insert_personalized(
        &self,
        comment: PersonalizedComment,
    ) -> Result<PersonalizedComment, RepositoryError>;
}

/// Persistence for submitted final comments.
pub trait FinalCommentStore: Send + Sync {
    fn insert(&self, comment: FinalComment) -> Result<FinalComment, RepositoryError>;
    fn list(&self, subject: &SubjectId) -> Result<Vec<FinalComment>, RepositoryError>;
}

/// Server-side copy between subjects. Duplicate and overwrite counts are computed there.
pub trait CommentCopier: Send + Sync {
    fn copy_comments(&self, request: &CopyCommentsRequest) -> Result<CopyCommentsResult, CopyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("subject not found: {0}")]
    UnknownSubject(SubjectId),
    #[error("copy service unavailable: {0}")]
    Unavailable(String),
}
