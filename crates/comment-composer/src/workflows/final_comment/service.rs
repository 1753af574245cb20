use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::CompositionConfig;

use super::composition::{CompositionInputs, CompositionPolicy};
use super::copy::{CopyCommentsRequest, CopyCommentsResult};
use super::domain::{
    CommentId, FinalComment, OutcomeComment, PersonalizedComment, Pronoun, PronounId,
    StudentDetails, SubjectId,
};
use super::duplicates::find_duplicate_in_scope;
use super::ordering::{apply_filter, RatingFilter};
use super::placeholders::contains_placeholders;
use super::populate::{PopulateEffect, PopulateMachine};
use super::rating::{level_for, normalize};
use super::repository::{
    CommentCatalog, CommentCopier, CopyError, FinalCommentStore, RepositoryError,
};
use super::session::CompositionSession;

static COMMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_comment_id(prefix: &str) -> CommentId {
    let id = COMMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CommentId(format!("{prefix}-{id:06}"))
}

/// Facade tying the composition engine to the catalog, store and copy collaborators.
pub struct FinalCommentService<C, S, X> {
    catalog: Arc<C>,
    store: Arc<S>,
    copier: Arc<X>,
    limits: CompositionConfig,
}

impl<C, S, X> FinalCommentService<C, S, X>
where
    C: CommentCatalog + 'static,
    S: FinalCommentStore + 'static,
    X: CommentCopier + 'static,
{
    pub fn new(catalog: Arc<C>, store: Arc<S>, copier: Arc<X>, limits: CompositionConfig) -> Self {
        Self {
            catalog,
            store,
            copier,
            limits,
        }
    }

    pub fn policy(&self, extended: bool) -> CompositionPolicy {
        self.limits.policy(extended)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Picker contents: filtered by rounded rating and sorted for display.
    pub fn personalized_comments(
        &self,
        subject: &SubjectId,
        filter: RatingFilter,
    ) -> Result<Vec<RatedCommentView>, FinalCommentServiceError> {
        let comments = self.catalog.personalized_comments(subject)?;
        Ok(apply_filter(&comments, filter)
            .into_iter()
            .map(RatedCommentView::from)
            .collect())
    }

    pub fn outcome_comments(
        &self,
        subject: &SubjectId,
    ) -> Result<Vec<OutcomeComment>, FinalCommentServiceError> {
        Ok(self.catalog.outcome_comments(subject)?)
    }

    pub fn final_comments(
        &self,
        subject: &SubjectId,
    ) -> Result<Vec<FinalComment>, FinalCommentServiceError> {
        Ok(self.store.list(subject)?)
    }

    /// Stateless preview of what populating would do to `request.draft`.
    pub fn compose(&self, request: ComposeRequest) -> Result<ComposeResponse, FinalCommentServiceError> {
        let outcomes = self.catalog.outcome_comments(&request.subject_id)?;
        let personalized = match &request.personalized_comment_id {
            Some(id) => Some(self.find_personalized(&request.subject_id, id)?),
            None => None,
        };
        let pronoun = match &request.pronoun_id {
            Some(id) => Some(self.find_pronoun(id)?),
            None => None,
        };

        let policy = self.policy(request.extended);
        let candidate = policy.candidate(CompositionInputs {
            grade: request.grade,
            outcome_comments: &outcomes,
            personalized: personalized.as_ref(),
            pronoun: pronoun.as_ref(),
        });

        let mut machine = PopulateMachine::with_draft(request.draft);
        let populate = match machine.candidate_changed(candidate.text.clone()) {
            PopulateEffect::Applied => PopulateEffect::Applied,
            _ => machine.request_populate(),
        };

        debug!(
            subject = %request.subject_id,
            matched = candidate.matched_outcome.is_some(),
            truncated = candidate.truncated,
            ?populate,
            "composed final comment candidate"
        );

        Ok(ComposeResponse {
            can_populate: !candidate.is_empty(),
            unresolved_placeholders: pronoun.is_none() && contains_placeholders(&candidate.text),
            candidate: candidate.text,
            matched_outcome: candidate.matched_outcome,
            truncated: candidate.truncated,
            max_length: policy.max_length(),
            populate,
        })
    }

    /// Open an editing session over the subject's current banks.
    pub fn open_session(
        &self,
        subject: &SubjectId,
        extended: bool,
    ) -> Result<CompositionSession, FinalCommentServiceError> {
        Ok(CompositionSession::new(
            subject.clone(),
            self.catalog.outcome_comments(subject)?,
            self.catalog.personalized_comments(subject)?,
            self.policy(extended),
        ))
    }

    pub fn add_personalized_comment(
        &self,
        subject: &SubjectId,
        new: NewPersonalizedComment,
    ) -> Result<PersonalizedComment, FinalCommentServiceError> {
        let text = required_text(&new.text, "comment text")?;
        let existing = self.catalog.personalized_comments(subject)?;
        if let Some(duplicate) =
            find_duplicate_in_scope(&text, &existing, |comment| &comment.subject_id == subject)
        {
            warn!(subject = %subject, duplicate = %duplicate.id, "rejected duplicate personalized comment");
            return Err(FinalCommentServiceError::Duplicate(duplicate.id.clone()));
        }

        let stored = self.catalog.insert_personalized(PersonalizedComment {
            id: next_comment_id("personalized"),
            text,
            rating: new.rating,
            subject_id: subject.clone(),
        })?;
        info!(subject = %subject, id = %stored.id, "personalized comment added");
        Ok(stored)
    }

    pub fn add_outcome_comment(
        &self,
        subject: &SubjectId,
        new: NewOutcomeComment,
    ) -> Result<OutcomeComment, FinalCommentServiceError> {
        let text = required_text(&new.text, "comment text")?;
        if new.lower_range > new.upper_range {
            return Err(FinalCommentServiceError::Validation(format!(
                "lower range {} exceeds upper range {}",
                new.lower_range, new.upper_range
            )));
        }

        let existing = self.catalog.outcome_comments(subject)?;
        if let Some(duplicate) =
            find_duplicate_in_scope(&text, &existing, |comment| &comment.subject_id == subject)
        {
            warn!(subject = %subject, duplicate = %duplicate.id, "rejected duplicate outcome comment");
            return Err(FinalCommentServiceError::Duplicate(duplicate.id.clone()));
        }

        let stored = self.catalog.insert_outcome(OutcomeComment {
            id: next_comment_id("outcome"),
            text,
            lower_range: new.lower_range,
            upper_range: new.upper_range,
            subject_id: subject.clone(),
        })?;
        info!(subject = %subject, id = %stored.id, "outcome comment added");
        Ok(stored)
    }

    pub fn submit_final_comment(
        &self,
        submission: FinalCommentSubmission,
    ) -> Result<FinalComment, FinalCommentServiceError> {
        let max_length = self.policy(submission.extended).max_length();
        let student = StudentDetails {
            first_name: submission.first_name,
            last_name: submission.last_name,
            grade: submission.grade,
        };
        let record = build_final_comment(
            &submission.subject_id,
            student,
            &submission.comment,
            max_length,
        )?;
        let stored = self.store.insert(record)?;
        info!(subject = %stored.subject_id, id = %stored.id, "final comment submitted");
        Ok(stored)
    }

    pub fn copy_comments(
        &self,
        request: CopyCommentsRequest,
    ) -> Result<CopyCommentsOutcome, FinalCommentServiceError> {
        let result = self.copier.copy_comments(&request)?;
        info!(
            source = %request.source_subject_id,
            target = %request.target_subject_id,
            copied = result.success_count,
            duplicates = result.duplicate_count,
            overwrite = result.overwrite,
            "comments copied between subjects"
        );
        Ok(CopyCommentsOutcome {
            message: result.summary(),
            result,
        })
    }

    fn find_personalized(
        &self,
        subject: &SubjectId,
        id: &CommentId,
    ) -> Result<PersonalizedComment, FinalCommentServiceError> {
        self.catalog
            .personalized_comments(subject)?
            .into_iter()
            .find(|comment| &comment.id == id)
            .ok_or_else(|| FinalCommentServiceError::NotFound {
                kind: "personalized comment",
                id: id.0.clone(),
            })
    }

    fn find_pronoun(&self, id: &PronounId) -> Result<Pronoun, FinalCommentServiceError> {
        self.catalog
            .pronouns()?
            .into_iter()
            .find(|pronoun| &pronoun.id == id)
            .ok_or_else(|| FinalCommentServiceError::NotFound {
                kind: "pronoun",
                id: id.0.clone(),
            })
    }
}

fn required_text(raw: &str, field: &str) -> Result<String, FinalCommentServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FinalCommentServiceError::Validation(format!(
            "{field} is required"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a draft and stamp it as a final comment record.
pub(crate) fn build_final_comment(
    subject: &SubjectId,
    student: StudentDetails,
    comment: &str,
    max_length: usize,
) -> Result<FinalComment, FinalCommentServiceError> {
    let first_name = required_text(&student.first_name, "first name")?;
    let last_name = required_text(&student.last_name, "last name")?;
    if !student.grade.is_finite() {
        return Err(FinalCommentServiceError::Validation(
            "grade must be a number".to_string(),
        ));
    }

    let comment = required_text(comment, "final comment")?;
    let length = comment.chars().count();
    if length > max_length {
        return Err(FinalCommentServiceError::Validation(format!(
            "final comment is {length} characters; the limit is {max_length}"
        )));
    }

    Ok(FinalComment {
        id: next_comment_id("final"),
        subject_id: subject.clone(),
        first_name,
        last_name,
        grade: student.grade,
        comment,
        submitted_at: Utc::now(),
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    pub subject_id: SubjectId,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub personalized_comment_id: Option<CommentId>,
    #[serde(default)]
    pub pronoun_id: Option<PronounId>,
    /// Current contents of the comment field.
    #[serde(default)]
    pub draft: String,
    #[serde(default)]
    pub extended: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeResponse {
    pub candidate: String,
    pub matched_outcome: Option<OutcomeComment>,
    pub truncated: bool,
    pub max_length: usize,
    pub can_populate: bool,
    /// `applied` when the draft was blank, `confirmation_required` when it would be overwritten.
    pub populate: PopulateEffect,
    pub unresolved_placeholders: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPersonalizedComment {
    pub text: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOutcomeComment {
    pub text: String,
    pub lower_range: i32,
    pub upper_range: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalCommentSubmission {
    pub subject_id: SubjectId,
    pub first_name: String,
    pub last_name: String,
    pub grade: f64,
    pub comment: String,
    #[serde(default)]
    pub extended: bool,
}

/// Personalized comment as shown in the picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedCommentView {
    pub id: CommentId,
    pub text: String,
    pub rating: Option<f64>,
    pub normalized_rating: f64,
    pub emoji: &'static str,
    pub label: &'static str,
}

impl From<PersonalizedComment> for RatedCommentView {
    fn from(comment: PersonalizedComment) -> Self {
        let normalized_rating = normalize(comment.rating);
        let level = level_for(normalized_rating);
        Self {
            id: comment.id,
            text: comment.text,
            rating: comment.rating,
            normalized_rating,
            emoji: level.emoji,
            label: level.label,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyCommentsOutcome {
    #[serde(flatten)]
    pub result: CopyCommentsResult,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FinalCommentServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Copy(#[from] CopyError),
    #[error("an identical comment already exists ({0})")]
    Duplicate(CommentId),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("invalid request: {0}")]
    Validation(String),
}
