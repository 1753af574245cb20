use tracing::{debug, info, warn};

use super::composition::{CompositionCandidate, CompositionInputs, CompositionPolicy};
use super::domain::{
    CommentId, DraftComment, FinalComment, OutcomeComment, PersonalizedComment, Pronoun,
    StudentDetails, SubjectId,
};
use super::ordering::{apply_filter, RatingFilter};
use super::populate::{PopulateEffect, PopulateMachine, PopulateState};
use super::repository::FinalCommentStore;
use super::service::{build_final_comment, FinalCommentServiceError};

/// Discrete inputs from the final-comment form.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    GradeChanged(Option<f64>),
    PersonalizedSelected(Option<CommentId>),
    PronounSelected(Option<Pronoun>),
    DraftEdited(String),
    Populate,
    ConfirmReplace,
    CancelReplace,
    Closed,
}

/// One student's final comment being edited against a subject's comment banks.
///
/// The form holds no composition logic of its own: it forwards [`SessionEvent`]s and
/// renders from the accessors.
#[derive(Debug, Clone)]
pub struct CompositionSession {
    subject_id: SubjectId,
    outcome_comments: Vec<OutcomeComment>,
    personalized_comments: Vec<PersonalizedComment>,
    policy: CompositionPolicy,
    grade: Option<f64>,
    selected: Option<PersonalizedComment>,
    pronoun: Option<Pronoun>,
    candidate: CompositionCandidate,
    machine: PopulateMachine,
}

impl CompositionSession {
    pub fn new(
        subject_id: SubjectId,
        outcome_comments: Vec<OutcomeComment>,
        personalized_comments: Vec<PersonalizedComment>,
        policy: CompositionPolicy,
    ) -> Self {
        Self {
            subject_id,
            outcome_comments,
            personalized_comments,
            policy,
            grade: None,
            selected: None,
            pronoun: None,
            candidate: CompositionCandidate::default(),
            machine: PopulateMachine::new(),
        }
    }

    /// Start from text already in the comment field.
    pub fn with_draft(mut self, text: impl Into<String>) -> Self {
        self.machine = PopulateMachine::with_draft(text);
        self
    }

    pub fn apply(&mut self, event: SessionEvent) -> PopulateEffect {
        debug!(subject = %self.subject_id, ?event, "composition event");
        match event {
            SessionEvent::GradeChanged(grade) => {
                self.grade = grade;
                self.recompute()
            }
            SessionEvent::PersonalizedSelected(id) => {
                self.selected = id.and_then(|id| self.lookup_personalized(&id));
                self.recompute()
            }
            SessionEvent::PronounSelected(pronoun) => {
                self.pronoun = pronoun;
                self.recompute()
            }
            SessionEvent::DraftEdited(text) => self.machine.edit(text),
            SessionEvent::Populate => self.machine.request_populate(),
            SessionEvent::ConfirmReplace => self.machine.confirm(),
            SessionEvent::CancelReplace => self.machine.cancel(),
            SessionEvent::Closed => {
                self.clear();
                PopulateEffect::Dismissed
            }
        }
    }

    /// Persist the draft; it is cleared only once the store accepts it.
    pub fn submit<S>(
        &mut self,
        store: &S,
        student: StudentDetails,
    ) -> Result<FinalComment, FinalCommentServiceError>
    where
        S: FinalCommentStore + ?Sized,
    {
        let record = build_final_comment(
            &self.subject_id,
            student,
            &self.machine.draft().text,
            self.policy.max_length(),
        )?;

        match store.insert(record) {
            Ok(stored) => {
                info!(subject = %self.subject_id, id = %stored.id, "final comment submitted");
                self.clear();
                Ok(stored)
            }
            Err(err) => {
                warn!(subject = %self.subject_id, error = %err, "final comment submit failed; draft kept");
                Err(err.into())
            }
        }
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    pub fn grade(&self) -> Option<f64> {
        self.grade
    }

    pub fn candidate(&self) -> &CompositionCandidate {
        &self.candidate
    }

    /// Band for the current grade; `None` drives the outcome field's empty state.
    pub fn matched_outcome(&self) -> Option<&OutcomeComment> {
        self.candidate.matched_outcome.as_ref()
    }

    pub fn selected_personalized(&self) -> Option<&PersonalizedComment> {
        self.selected.as_ref()
    }

    pub fn draft(&self) -> &DraftComment {
        self.machine.draft()
    }

    pub fn state(&self) -> PopulateState {
        self.machine.state()
    }

    pub fn can_populate(&self) -> bool {
        self.machine.can_populate()
    }

    pub fn personalized_options(&self, filter: RatingFilter) -> Vec<PersonalizedComment> {
        apply_filter(&self.personalized_comments, filter)
    }

    fn lookup_personalized(&self, id: &CommentId) -> Option<PersonalizedComment> {
        let found = self
            .personalized_comments
            .iter()
            .find(|comment| &comment.id == id)
            .cloned();
        if found.is_none() {
            warn!(subject = %self.subject_id, id = %id, "unknown personalized comment selected; clearing selection");
        }
        found
    }

    fn recompute(&mut self) -> PopulateEffect {
        self.candidate = self.policy.candidate(CompositionInputs {
            grade: self.grade,
            outcome_comments: &self.outcome_comments,
            personalized: self.selected.as_ref(),
            pronoun: self.pronoun.as_ref(),
        });
        self.machine.candidate_changed(self.candidate.text.clone())
    }

    fn clear(&mut self) {
        self.grade = None;
        self.selected = None;
        self.pronoun = None;
        self.candidate = CompositionCandidate::default();
        self.machine.reset();
    }
}
