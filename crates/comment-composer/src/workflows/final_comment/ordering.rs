use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::domain::PersonalizedComment;
use super::rating::rating_bucket;

/// Rating picker selection; `0` on the wire means "show everything".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum RatingFilter {
    #[default]
    All,
    Only(i64),
}

impl From<i64> for RatingFilter {
    fn from(selected: i64) -> Self {
        if selected == 0 {
            Self::All
        } else {
            Self::Only(selected)
        }
    }
}

impl From<RatingFilter> for i64 {
    fn from(filter: RatingFilter) -> Self {
        match filter {
            RatingFilter::All => 0,
            RatingFilter::Only(value) => value,
        }
    }
}

impl RatingFilter {
    pub fn admits(self, comment: &PersonalizedComment) -> bool {
        match self {
            Self::All => true,
            Self::Only(value) => rating_bucket(comment.rating) == value,
        }
    }
}

/// Highest rating first, then case-insensitive, accent-folded text; the input slice is left
/// untouched.
pub fn sort_by_rating_desc(comments: &[PersonalizedComment]) -> Vec<PersonalizedComment> {
    let mut sorted = comments.to_vec();
    sorted.sort_by(compare_for_display);
    sorted
}

pub fn filter_by_rating(comments: &[PersonalizedComment], selected: i64) -> Vec<PersonalizedComment> {
    apply_filter(comments, RatingFilter::from(selected))
}

pub fn apply_filter(comments: &[PersonalizedComment], filter: RatingFilter) -> Vec<PersonalizedComment> {
    let mut selected: Vec<PersonalizedComment> = comments
        .iter()
        .filter(|comment| filter.admits(comment))
        .cloned()
        .collect();
    selected.sort_by(compare_for_display);
    selected
}

fn compare_for_display(a: &PersonalizedComment, b: &PersonalizedComment) -> Ordering {
    rating_bucket(b.rating)
        .cmp(&rating_bucket(a.rating))
        .then_with(|| compare_text(&a.text, &b.text))
}

/// Collation-style text order: base letters first, accents only break ties, case never does.
///
/// `sort_by` is stable, so text that differs only by case keeps input order.
fn compare_text(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| decomposed(a).cmp(decomposed(b)))
}

fn decomposed(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd().flat_map(char::to_lowercase)
}

fn base_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    decomposed(text).filter(|c| !is_combining_mark(*c))
}
