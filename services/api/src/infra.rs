use comment_composer::workflows::final_comment::{
    find_duplicate, CommentCatalog, CommentCopier, CommentId, CopyCommentsRequest,
    CopyCommentsResult, CopyError, FinalComment, FinalCommentStore, OutcomeComment,
    PersonalizedComment, Pronoun, PronounId, RepositoryError, SubjectId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

static COPY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct CatalogData {
    outcomes: HashMap<SubjectId, Vec<OutcomeComment>>,
    personalized: HashMap<SubjectId, Vec<PersonalizedComment>>,
}

/// Process-local comment banks. Clones share the same data, so the copier can work on it.
#[derive(Clone)]
pub(crate) struct InMemoryCommentCatalog {
    data: Arc<Mutex<CatalogData>>,
    pronouns: Arc<Vec<Pronoun>>,
}

impl Default for InMemoryCommentCatalog {
    fn default() -> Self {
        Self {
            data: Arc::new(Mutex::new(CatalogData::default())),
            pronouns: Arc::new(default_pronouns()),
        }
    }
}

impl InMemoryCommentCatalog {
    pub(crate) fn with_banks(
        subject: &SubjectId,
        outcomes: Vec<OutcomeComment>,
        personalized: Vec<PersonalizedComment>,
    ) -> Self {
        let catalog = Self::default();
        {
            let mut guard = catalog.data.lock().expect("catalog mutex poisoned");
            guard.outcomes.insert(subject.clone(), outcomes);
            guard.personalized.insert(subject.clone(), personalized);
        }
        catalog
    }
}

impl CommentCatalog for InMemoryCommentCatalog {
    fn outcome_comments(&self, subject: &SubjectId) -> Result<Vec<OutcomeComment>, RepositoryError> {
        let guard = self.data.lock().expect("catalog mutex poisoned");
        Ok(guard.outcomes.get(subject).cloned().unwrap_or_default())
    }

    fn personalized_comments(
        &self,
        subject: &SubjectId,
    ) -> Result<Vec<PersonalizedComment>, RepositoryError> {
        let guard = self.data.lock().expect("catalog mutex poisoned");
        Ok(guard.personalized.get(subject).cloned().unwrap_or_default())
    }

    fn pronouns(&self) -> Result<Vec<Pronoun>, RepositoryError> {
        Ok(self.pronouns.as_ref().clone())
    }

    fn insert_outcome(&self, comment: OutcomeComment) -> Result<OutcomeComment, RepositoryError> {
        let mut guard = self.data.lock().expect("catalog mutex poisoned");
        let bank = guard.outcomes.entry(comment.subject_id.clone()).or_default();
        if bank.iter().any(|existing| existing.id == comment.id) {
            return Err(RepositoryError::Conflict);
        }
        bank.push(comment.clone());
        Ok(comment)
    }

    fn insert_personalized(
        &self,
        comment: PersonalizedComment,
    ) -> Result<PersonalizedComment, RepositoryError> {
        let mut guard = self.data.lock().expect("catalog mutex poisoned");
        let bank = guard
            .personalized
            .entry(comment.subject_id.clone())
            .or_default();
        if bank.iter().any(|existing| existing.id == comment.id) {
            return Err(RepositoryError::Conflict);
        }
        bank.push(comment.clone());
        Ok(comment)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryFinalCommentStore {
    records: Arc<Mutex<Vec<FinalComment>>>,
}

impl FinalCommentStore for InMemoryFinalCommentStore {
    fn insert(&self, comment: FinalComment) -> Result<FinalComment, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.iter().any(|existing| existing.id == comment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(comment.clone());
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

/// Copies one subject's personalized comments into another over the shared in-memory catalog.
///
/// Append mode skips comments whose trimmed text already exists in the target bank and
/// counts them as duplicates. Overwrite mode replaces the target bank wholesale.
pub(crate) struct InMemoryCommentCopier {
    catalog: InMemoryCommentCatalog,
}

impl InMemoryCommentCopier {
    pub(crate) fn new(catalog: InMemoryCommentCatalog) -> Self {
        Self { catalog }
    }
}

impl CommentCopier for InMemoryCommentCopier {
    fn copy_comments(&self, request: &CopyCommentsRequest) -> Result<CopyCommentsResult, CopyError> {
        let mut guard = self
            .catalog
            .data
            .lock()
            .map_err(|_| CopyError::Unavailable("catalog lock poisoned".to_string()))?;

        let source = match guard.personalized.get(&request.source_subject_id) {
            Some(comments) => comments.clone(),
            None => {
                return Err(CopyError::UnknownSubject(
                    request.source_subject_id.clone(),
                ))
            }
        };

        let target = &request.target_subject_id;
        let bank = guard.personalized.entry(target.clone()).or_default();
        if request.overwrite {
            bank.clear();
        }

        let mut result = CopyCommentsResult {
            success_count: 0,
            duplicate_count: 0,
            overwrite: request.overwrite,
        };
        for comment in source {
            if !request.overwrite && find_duplicate(&comment.text, bank.as_slice()).is_some() {
                result.duplicate_count += 1;
                continue;
            }
            bank.push(PersonalizedComment {
                id: next_copy_id(),
                subject_id: target.clone(),
                ..comment
            });
            result.success_count += 1;
        }

        Ok(result)
    }
}

fn next_copy_id() -> CommentId {
    let id = COPY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CommentId(format!("personalized-copy-{id:06}"))
}

pub(crate) fn default_pronouns() -> Vec<Pronoun> {
    [("they", "they", "their"), ("she", "she", "her"), ("he", "he", "his")]
        .into_iter()
        .map(|(id, subject, possessive)| Pronoun {
            id: PronounId(id.to_string()),
            subject_pronoun: subject.to_string(),
            possessive_pronoun: possessive.to_string(),
        })
        .collect()
}

/// Parse `subject/possessive`, e.g. `they/their`.
pub(crate) fn parse_pronoun(raw: &str) -> Result<Pronoun, String> {
    let (subject, possessive) = raw
        .split_once('/')
        .map(|(subject, possessive)| (subject.trim(), possessive.trim()))
        .filter(|(subject, possessive)| !subject.is_empty() && !possessive.is_empty())
        .ok_or_else(|| format!("expected subject/possessive such as they/their, got '{raw}'"))?;

    Ok(Pronoun {
        id: PronounId(subject.to_lowercase()),
        subject_pronoun: subject.to_string(),
        possessive_pronoun: possessive.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str) -> SubjectId {
        SubjectId(id.to_string())
    }

    fn personalized(id: &str, subject_id: &str, text: &str) -> PersonalizedComment {
        PersonalizedComment {
            id: CommentId(id.to_string()),
            text: text.to_string(),
            rating: Some(4.0),
            subject_id: subject(subject_id),
        }
    }

    fn seeded() -> InMemoryCommentCatalog {
        let catalog = InMemoryCommentCatalog::with_banks(
            &subject("math"),
            vec![OutcomeComment {
                id: CommentId("band".to_string()),
                text: "Great".to_string(),
                lower_range: 80,
                upper_range: 100,
                subject_id: subject("math"),
            }],
            vec![
                personalized("a", "math", "Kind"),
                personalized("b", "math", "Curious"),
            ],
        );
        catalog
            .insert_personalized(personalized("c", "science", "Kind "))
            .expect("seed target");
        catalog
    }

    #[test]
    fn append_copy_skips_trimmed_duplicates() {
        let catalog = seeded();
        let copier = InMemoryCommentCopier::new(catalog.clone());
        let result = copier
            .copy_comments(&CopyCommentsRequest {
                source_subject_id: subject("math"),
                target_subject_id: subject("science"),
                overwrite: false,
            })
            .expect("copy succeeds");

        assert_eq!(result.success_count, 2);
        assert_eq!(result.duplicate_count, 1);
        let target = catalog
            .personalized_comments(&subject("science"))
            .expect("target bank");
        assert_eq!(target.len(), 2);
        assert!(target.iter().all(|comment| comment.subject_id == subject("science")));
    }

    #[test]
    fn overwrite_copy_replaces_the_target_bank() {
        let catalog = seeded();
        let copier = InMemoryCommentCopier::new(catalog.clone());
        let result = copier
            .copy_comments(&CopyCommentsRequest {
                source_subject_id: subject("math"),
                target_subject_id: subject("science"),
                overwrite: true,
            })
            .expect("copy succeeds");

        assert_eq!(result.success_count, 2);
        assert_eq!(result.duplicate_count, 0);
        let texts: Vec<String> = catalog
            .personalized_comments(&subject("science"))
            .expect("target bank")
            .into_iter()
            .map(|comment| comment.text)
            .collect();
        assert_eq!(texts, vec!["Kind", "Curious"]);
    }

    #[test]
    fn copy_from_unknown_subject_fails() {
        let copier = InMemoryCommentCopier::new(seeded());
        let err = copier
            .copy_comments(&CopyCommentsRequest {
                source_subject_id: subject("history"),
                target_subject_id: subject("math"),
                overwrite: false,
            })
            .expect_err("unknown source");
        assert!(matches!(err, CopyError::UnknownSubject(_)));
    }

    #[test]
    fn parses_pronoun_pairs() {
        let pronoun = parse_pronoun(" she / her ").expect("parses");
        assert_eq!(pronoun.subject_pronoun, "she");
        assert_eq!(pronoun.possessive_pronoun, "her");
        assert!(parse_pronoun("they").is_err());
        assert!(parse_pronoun("/their").is_err());
    }
}
