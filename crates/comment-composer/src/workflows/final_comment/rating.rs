use serde::Serialize;

/// Rating assumed for comments that were never rated.
pub const DEFAULT_RATING: f64 = 3.0;

/// One row of the fixed sentiment scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingLevel {
    pub value: i64,
    pub emoji: &'static str,
    pub label: &'static str,
}

/// Sentiment scale in ascending order, as offered by rating pickers.
pub const RATING_OPTIONS: [RatingLevel; 5] = [
    RatingLevel {
        value: 1,
        emoji: "😢",
        label: "Very Negative",
    },
    RatingLevel {
        value: 2,
        emoji: "🙁",
        label: "Negative",
    },
    RatingLevel {
        value: 3,
        emoji: "😐",
        label: "Neutral",
    },
    RatingLevel {
        value: 4,
        emoji: "🙂",
        label: "Positive",
    },
    RatingLevel {
        value: 5,
        emoji: "😊",
        label: "Very Positive",
    },
];

const NEUTRAL: RatingLevel = RATING_OPTIONS[2];

/// Canonical rating for a possibly unrated comment.
///
/// Zero is an explicit rating and passes through; only a missing (or non-finite)
/// value falls back to [`DEFAULT_RATING`].
pub fn normalize(rating: Option<f64>) -> f64 {
    match rating {
        Some(value) if value.is_finite() => value,
        _ => DEFAULT_RATING,
    }
}

/// Half-up rounding: `.5` always moves toward positive infinity, so `-2.5` becomes `-2`.
pub fn round_rating(value: f64) -> i64 {
    // Adding 0.5 first loses precision just below a half, so compare the fraction instead.
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// Normalize then round; the key used for ordering and filtering.
pub fn rating_bucket(rating: Option<f64>) -> i64 {
    round_rating(normalize(rating))
}

pub fn level_for(rating: f64) -> RatingLevel {
    let rounded = round_rating(rating);
    RATING_OPTIONS
        .iter()
        .copied()
        .find(|level| level.value == rounded)
        .unwrap_or(NEUTRAL)
}

pub fn emoji_for(rating: f64) -> &'static str {
    level_for(rating).emoji
}

pub fn label_for(rating: f64) -> &'static str {
    level_for(rating).label
}
