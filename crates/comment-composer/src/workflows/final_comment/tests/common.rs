use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::CompositionConfig;
use crate::workflows::final_comment::copy::{CopyCommentsRequest, CopyCommentsResult};
use crate::workflows::final_comment::domain::{
    CommentId, FinalComment, OutcomeComment, PersonalizedComment, Pronoun, PronounId,
    StudentDetails, SubjectId,
};
use crate::workflows::final_comment::repository::{
    CommentCatalog, CommentCopier, CopyError, FinalCommentStore, RepositoryError,
};
use crate::workflows::final_comment::{final_comment_router, FinalCommentService};

pub(super) fn math() -> SubjectId {
    SubjectId("math".to_string())
}

pub(super) fn science() -> SubjectId {
    SubjectId("science".to_string())
}

pub(super) fn outcome(id: &str, lower: i32, upper: i32, text: &str) -> OutcomeComment {
    OutcomeComment {
        id: CommentId(id.to_string()),
        text: text.to_string(),
        lower_range: lower,
        upper_range: upper,
        subject_id: math(),
    }
}

pub(super) fn personalized(id: &str, text: &str, rating: Option<f64>) -> PersonalizedComment {
    PersonalizedComment {
        id: CommentId(id.to_string()),
        text: text.to_string(),
        rating,
        subject_id: math(),
    }
}

pub(super) fn they() -> Pronoun {
    Pronoun {
        id: PronounId("they".to_string()),
        subject_pronoun: "they".to_string(),
        possessive_pronoun: "their".to_string(),
    }
}

pub(super) fn outcome_bank() -> Vec<OutcomeComment> {
    vec![
        outcome("band-b", 70, 79, "Steady work this term."),
        outcome("band-a", 80, 100, "Great"),
        outcome("band-c", 50, 69, "{{pronoun}} should review {{possessivePronoun}} notes."),
    ]
}

pub(super) fn personalized_bank() -> Vec<PersonalizedComment> {
    vec![
        personalized("p-kind", "kind to classmates", Some(4.0)),
        personalized("p-focus", "Needs to focus in class.", Some(2.0)),
        personalized("p-curious", "Asks curious questions", Some(4.0)),
        personalized("p-star", "Leads group work with {{possessivePronoun}} ideas.", Some(5.0)),
        personalized("p-plain", "Completes homework", None),
    ]
}

pub(super) fn student() -> StudentDetails {
    StudentDetails {
        first_name: "Avery".to_string(),
        last_name: "Lee".to_string(),
        grade: 95.0,
    }
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    outcomes: Mutex<HashMap<SubjectId, Vec<OutcomeComment>>>,
    personalized: Mutex<HashMap<SubjectId, Vec<PersonalizedComment>>>,
    pronouns: Vec<Pronoun>,
}

impl MemoryCatalog {
    pub(super) fn seeded() -> Self {
        let catalog = Self {
            pronouns: vec![they()],
            ..Self::default()
        };
        catalog
            .outcomes
            .lock()
            .expect("catalog mutex poisoned")
            .insert(math(), outcome_bank());
        catalog
            .personalized
            .lock()
            .expect("catalog mutex poisoned")
            .insert(math(), personalized_bank());
        catalog
    }
}

impl CommentCatalog for MemoryCatalog {
    fn outcome_comments(&self, subject: &SubjectId) -> Result<Vec<OutcomeComment>, RepositoryError> {
        let guard = self.outcomes.lock().expect("catalog mutex poisoned");
        Ok(guard.get(subject).cloned().unwrap_or_default())
    }

    fn personalized_comments(
        &self,
        subject: &SubjectId,
    ) -> Result<Vec<PersonalizedComment>, RepositoryError> {
        let guard = self.personalized.lock().expect("catalog mutex poisoned");
        Ok(guard.get(subject).cloned().unwrap_or_default())
    }

    fn pronouns(&self) -> Result<Vec<Pronoun>, RepositoryError> {
        Ok(self.pronouns.clone())
    }

    fn insert_outcome(&self, comment: OutcomeComment) -> Result<OutcomeComment, RepositoryError> {
        let mut guard = self.outcomes.lock().expect("catalog mutex poisoned");
        guard
            .entry(comment.subject_id.clone())
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    fn insert_personalized(
        &self,
        comment: PersonalizedComment,
    ) -> Result<PersonalizedComment, RepositoryError> {
        let mut guard = self.personalized.lock().expect("catalog mutex poisoned");
        guard
            .entry(comment.subject_id.clone())
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    records: Arc<Mutex<Vec<FinalComment>>>,
}

impl MemoryStore {
    pub(super) fn records(&self) -> Vec<FinalComment> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl FinalCommentStore for MemoryStore {
    fn insert(&self, comment: FinalComment) -> Result<FinalComment, RepositoryError> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(comment.clone());
        Ok(comment)
    }

    fn list(&self, subject: &SubjectId) -> Result<Vec<FinalComment>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.subject_id == subject)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableStore;

impl FinalCommentStore for UnavailableStore {
    fn insert(&self, _comment: FinalComment) -> Result<FinalComment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _subject: &SubjectId) -> Result<Vec<FinalComment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Replays a canned collaborator result and records the requests it saw.
#[derive(Default)]
pub(super) struct CannedCopier {
    pub(super) result: Option<CopyCommentsResult>,
    pub(super) requests: Mutex<Vec<CopyCommentsRequest>>,
}

impl CannedCopier {
    pub(super) fn returning(success_count: u32, duplicate_count: u32, overwrite: bool) -> Self {
        Self {
            result: Some(CopyCommentsResult {
                success_count,
                duplicate_count,
                overwrite,
            }),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl CommentCopier for CannedCopier {
    fn copy_comments(&self, request: &CopyCommentsRequest) -> Result<CopyCommentsResult, CopyError> {
        self.requests
            .lock()
            .expect("copier mutex poisoned")
            .push(request.clone());
        self.result
            .ok_or_else(|| CopyError::UnknownSubject(request.source_subject_id.clone()))
    }
}

pub(super) type TestService = FinalCommentService<MemoryCatalog, MemoryStore, CannedCopier>;

pub(super) fn build_service() -> (TestService, Arc<MemoryStore>, Arc<CannedCopier>) {
    let store = Arc::new(MemoryStore::default());
    let copier = Arc::new(CannedCopier::returning(5, 2, false));
    let service = FinalCommentService::new(
        Arc::new(MemoryCatalog::seeded()),
        store.clone(),
        copier.clone(),
        CompositionConfig::default(),
    );
    (service, store, copier)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    final_comment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
