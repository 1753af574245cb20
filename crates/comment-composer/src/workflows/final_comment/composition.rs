use serde::Serialize;
use tracing::debug;

use super::domain::{OutcomeComment, PersonalizedComment, Pronoun};
use super::grading::match_band;
use super::placeholders::substitute;

pub const STANDARD_MAX_LENGTH: usize = 1000;
pub const EXTENDED_MAX_LENGTH: usize = 3000;

/// Join outcome then personalized text with one space, dropping blank parts, and hard-cut
/// anything past `max_length` characters.
pub fn compose(outcome: Option<&str>, personalized: Option<&str>, max_length: usize) -> String {
    let joined = [outcome, personalized]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(joined, max_length)
}

fn truncate_chars(text: String, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}

/// Everything a candidate depends on. Borrowed so recomputation stays cheap and repeatable.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionInputs<'a> {
    pub grade: Option<f64>,
    pub outcome_comments: &'a [OutcomeComment],
    pub personalized: Option<&'a PersonalizedComment>,
    pub pronoun: Option<&'a Pronoun>,
}

/// Computed draft awaiting a populate decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompositionCandidate {
    pub text: String,
    pub matched_outcome: Option<OutcomeComment>,
    pub truncated: bool,
}

impl CompositionCandidate {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Character-limit policy; the limit itself comes from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionPolicy {
    max_length: usize,
}

impl CompositionPolicy {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_MAX_LENGTH)
    }

    pub fn extended() -> Self {
        Self::new(EXTENDED_MAX_LENGTH)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn compose(&self, outcome: Option<&str>, personalized: Option<&str>) -> String {
        compose(outcome, personalized, self.max_length)
    }

    pub fn candidate(&self, inputs: CompositionInputs<'_>) -> CompositionCandidate {
        let matched = match_band(inputs.grade, inputs.outcome_comments);
        let outcome_text = matched.map(|band| substitute(&band.text, inputs.pronoun));
        let personalized_text = inputs
            .personalized
            .map(|comment| substitute(&comment.text, inputs.pronoun));

        let untruncated = compose(
            outcome_text.as_deref(),
            personalized_text.as_deref(),
            usize::MAX,
        );
        let untruncated_len = untruncated.chars().count();
        let truncated = untruncated_len > self.max_length;
        if truncated {
            debug!(
                length = untruncated_len,
                max_length = self.max_length,
                "composed comment exceeds limit; truncating"
            );
        }

        CompositionCandidate {
            text: truncate_chars(untruncated, self.max_length),
            matched_outcome: matched.cloned(),
            truncated,
        }
    }
}

impl Default for CompositionPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
