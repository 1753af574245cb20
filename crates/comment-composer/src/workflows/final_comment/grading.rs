use super::domain::OutcomeComment;

/// First band, in list order, whose inclusive range covers `grade`.
///
/// No closest-band fallback: an absent or non-finite grade, an empty list, or a grade
/// outside every band all yield `None`. When bands overlap the earliest one wins.
pub fn match_band(grade: Option<f64>, bands: &[OutcomeComment]) -> Option<&OutcomeComment> {
    let grade = grade.filter(|value| value.is_finite())?;
    bands.iter().find(|band| band.covers(grade))
}
