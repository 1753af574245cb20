//! Final comment composition: comment bank ranking, grade band matching, pronoun
//! placeholders, candidate composition and the confirm-before-overwrite flow.
//!
//! Everything below `service` is pure and synchronous. The service and router layer it
//! over the catalog, store and copy collaborators.

pub mod composition;
pub mod copy;
pub mod domain;
pub mod duplicates;
pub mod grading;
pub mod ordering;
pub mod placeholders;
pub mod populate;
pub mod rating;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use composition::{
    compose, CompositionCandidate, CompositionInputs, CompositionPolicy, EXTENDED_MAX_LENGTH,
    STANDARD_MAX_LENGTH,
};
pub use copy::{pluralize, CopyCommentsRequest, CopyCommentsResult};
pub use domain::{
    CommentId, CommentText, DraftComment, FinalComment, OutcomeComment, PersonalizedComment,
    Pronoun, PronounId, StudentDetails, SubjectId,
};
pub use duplicates::{find_duplicate, find_duplicate_by, find_duplicate_in_scope, is_duplicate};
pub use grading::match_band;
pub use ordering::{filter_by_rating, sort_by_rating_desc, RatingFilter};
pub use placeholders::{substitute, POSSESSIVE_PRONOUN_TOKEN, SUBJECT_PRONOUN_TOKEN};
pub use populate::{PopulateEffect, PopulateMachine, PopulateState};
pub use rating::{emoji_for, label_for, normalize, RatingLevel, RATING_OPTIONS};
pub use repository::{CommentCatalog, CommentCopier, CopyError, FinalCommentStore, RepositoryError};
pub use router::final_comment_router;
pub use service::{
    ComposeRequest, ComposeResponse, CopyCommentsOutcome, FinalCommentService,
    FinalCommentServiceError, FinalCommentSubmission, NewOutcomeComment, NewPersonalizedComment,
    RatedCommentView,
};
pub use session::{CompositionSession, SessionEvent};
