//! Confirm-before-overwrite control for writing a composed candidate into the draft.
//!
//! A blank draft is filled as soon as a candidate appears. A draft with content is only
//! replaced after an explicit populate request followed by a confirmation; cancelling
//! leaves the draft byte-for-byte as it was.

use serde::Serialize;

use super::domain::DraftComment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulateState {
    /// No candidate to offer.
    Idle,
    /// A candidate exists and nothing is pending.
    Ready,
    /// The overwrite dialog is showing; the draft is untouched until the user answers.
    Confirming,
    /// The latest candidate was written into the draft.
    Applied,
}

/// What the surrounding form should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulateEffect {
    /// Draft was overwritten; move focus to the comment field.
    Applied,
    /// Show (or keep showing) the overwrite dialog.
    ConfirmationRequired,
    /// Hide the dialog; the draft is unchanged.
    Dismissed,
    Unchanged,
    /// Populate is unavailable because the candidate is empty.
    Disabled,
}

impl PopulateEffect {
    pub fn requests_focus(self) -> bool {
        matches!(self, PopulateEffect::Applied)
    }

    pub fn shows_confirmation(self) -> bool {
        matches!(self, PopulateEffect::ConfirmationRequired)
    }
}

#[derive(Debug, Clone)]
pub struct PopulateMachine {
    state: PopulateState,
    draft: DraftComment,
    candidate: String,
    pending: Option<String>,
}

impl Default for PopulateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PopulateMachine {
    pub fn new() -> Self {
        Self {
            state: PopulateState::Idle,
            draft: DraftComment::default(),
            candidate: String::new(),
            pending: None,
        }
    }

    /// Resume editing an existing draft, e.g. when reopening a saved final comment.
    pub fn with_draft(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            draft: DraftComment {
                dirty: !text.is_empty(),
                text,
            },
            ..Self::new()
        }
    }

    pub fn state(&self) -> PopulateState {
        self.state
    }

    pub fn draft(&self) -> &DraftComment {
        &self.draft
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    /// Candidate awaiting confirmation, if the dialog is showing.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn can_populate(&self) -> bool {
        !self.candidate.is_empty()
    }

    /// A selection changed and the candidate was recomputed.
    pub fn candidate_changed(&mut self, candidate: impl Into<String>) -> PopulateEffect {
        let candidate = candidate.into();
        let repeated = candidate == self.candidate;
        self.candidate = candidate;

        if self.state == PopulateState::Confirming {
            // The dialog keeps offering what the user asked for; a new request replaces it.
            return PopulateEffect::Unchanged;
        }

        if self.candidate.is_empty() {
            self.state = PopulateState::Idle;
            return PopulateEffect::Unchanged;
        }

        if self.draft.is_blank() {
            return self.apply(self.candidate.clone());
        }

        if !(repeated && self.state == PopulateState::Applied) {
            self.state = PopulateState::Ready;
        }
        PopulateEffect::Unchanged
    }

    /// Explicit populate click.
    pub fn request_populate(&mut self) -> PopulateEffect {
        if !self.can_populate() {
            return PopulateEffect::Disabled;
        }

        if self.state == PopulateState::Confirming {
            self.pending = Some(self.candidate.clone());
            return PopulateEffect::ConfirmationRequired;
        }

        if self.draft.is_blank() {
            return self.apply(self.candidate.clone());
        }

        if self.draft.text == self.candidate {
            self.state = PopulateState::Ready;
            return PopulateEffect::Unchanged;
        }

        self.pending = Some(self.candidate.clone());
        self.state = PopulateState::Confirming;
        PopulateEffect::ConfirmationRequired
    }

    /// "Replace" in the overwrite dialog.
    pub fn confirm(&mut self) -> PopulateEffect {
        match self.pending.take() {
            Some(pending) if self.state == PopulateState::Confirming => self.apply(pending),
            _ => PopulateEffect::Unchanged,
        }
    }

    /// "Cancel", a click outside, or any other dismissal of the dialog.
    pub fn cancel(&mut self) -> PopulateEffect {
        if self.state != PopulateState::Confirming {
            return PopulateEffect::Unchanged;
        }

        self.pending = None;
        self.state = if self.candidate.is_empty() {
            PopulateState::Idle
        } else {
            PopulateState::Ready
        };
        PopulateEffect::Dismissed
    }

    /// Manual typing in the comment field.
    ///
    /// Typing while the overwrite dialog is open dismisses it: the user's new text must not
    /// be replaced by a confirmation given for the older draft.
    pub fn edit(&mut self, text: impl Into<String>) -> PopulateEffect {
        self.draft.text = text.into();
        self.draft.dirty = true;
        match self.state {
            PopulateState::Confirming => {
                self.cancel();
                PopulateEffect::Dismissed
            }
            PopulateState::Applied => {
                self.state = PopulateState::Ready;
                PopulateEffect::Unchanged
            }
            PopulateState::Idle | PopulateState::Ready => PopulateEffect::Unchanged,
        }
    }

    /// Drop the draft after a successful submit or when the form closes.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn apply(&mut self, text: String) -> PopulateEffect {
        self.draft.text = text;
        self.draft.dirty = true;
        self.pending = None;
        self.state = PopulateState::Applied;
        PopulateEffect::Applied
    }
}
