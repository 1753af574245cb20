//! CSV import of outcome and personalized comment banks.
//!
//! Outcome banks use `Lower Range,Upper Range,Comment`; personalized banks use
//! `Comment,Rating` where a blank rating means unrated.

mod parser;

use crate::workflows::final_comment::{
    CommentId, OutcomeComment, PersonalizedComment, SubjectId,
};
use std::io::Read;
use std::path::Path;

use parser::{clean_text, parse_rows, OutcomeRow, PersonalizedRow};

#[derive(Debug)]
pub enum CommentBankImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// 1-based data row whose range is inverted.
    InvalidBand { row: usize, lower: i32, upper: i32 },
}

impl std::fmt::Display for CommentBankImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommentBankImportError::Io(err) => write!(f, "failed to read comment bank: {}", err),
            CommentBankImportError::Csv(err) => write!(f, "invalid comment bank CSV: {}", err),
            CommentBankImportError::InvalidBand { row, lower, upper } => write!(
                f,
                "row {row}: lower range {lower} is greater than upper range {upper}"
            ),
        }
    }
}

impl std::error::Error for CommentBankImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommentBankImportError::Io(err) => Some(err),
            CommentBankImportError::Csv(err) => Some(err),
            CommentBankImportError::InvalidBand { .. } => None,
        }
    }
}

impl From<std::io::Error> for CommentBankImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CommentBankImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct CommentBankImporter;

impl CommentBankImporter {
    pub fn outcomes_from_path<P: AsRef<Path>>(
        path: P,
        subject: &SubjectId,
    ) -> Result<Vec<OutcomeComment>, CommentBankImportError> {
        let file = std::fs::File::open(path)?;
        Self::outcomes_from_reader(file, subject)
    }

    /// Rows keep file order, which is also band precedence when ranges overlap.
    pub fn outcomes_from_reader<R: Read>(
        reader: R,
        subject: &SubjectId,
    ) -> Result<Vec<OutcomeComment>, CommentBankImportError> {
        let rows: Vec<OutcomeRow> = parse_rows(reader)?;
        let mut comments = Vec::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            if row.lower_range > row.upper_range {
                return Err(CommentBankImportError::InvalidBand {
                    row: index + 1,
                    lower: row.lower_range,
                    upper: row.upper_range,
                });
            }

            let text = clean_text(&row.comment);
            if text.is_empty() {
                continue;
            }

            comments.push(OutcomeComment {
                id: CommentId(format!("outcome-{:03}", index + 1)),
                text,
                lower_range: row.lower_range,
                upper_range: row.upper_range,
                subject_id: subject.clone(),
            });
        }

        Ok(comments)
    }

    pub fn personalized_from_path<P: AsRef<Path>>(
        path: P,
        subject: &SubjectId,
    ) -> Result<Vec<PersonalizedComment>, CommentBankImportError> {
        let file = std::fs::File::open(path)?;
        Self::personalized_from_reader(file, subject)
    }

    pub fn personalized_from_reader<R: Read>(
        reader: R,
        subject: &SubjectId,
    ) -> Result<Vec<PersonalizedComment>, CommentBankImportError> {
        let rows: Vec<PersonalizedRow> = parse_rows(reader)?;

        Ok(rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let text = clean_text(&row.comment);
                (!text.is_empty()).then(|| PersonalizedComment {
                    id: CommentId(format!("personalized-{:03}", index + 1)),
                    text,
                    rating: row.rating,
                    subject_id: subject.clone(),
                })
            })
            .collect())
    }
}
