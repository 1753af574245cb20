use super::domain::Pronoun;

/// Token replaced by the selected pronoun's subject form ("they").
pub const SUBJECT_PRONOUN_TOKEN: &str = "{{pronoun}}";
/// Token replaced by the selected pronoun's possessive form ("their").
pub const POSSESSIVE_PRONOUN_TOKEN: &str = "{{possessivePronoun}}";

/// Fill pronoun tokens; without a pronoun the text comes back untouched, tokens included.
///
/// Values are inserted verbatim. No capitalization or verb agreement is attempted.
pub fn substitute(text: &str, pronoun: Option<&Pronoun>) -> String {
    match pronoun {
        Some(pronoun) => text
            .replace(POSSESSIVE_PRONOUN_TOKEN, &pronoun.possessive_pronoun)
            .replace(SUBJECT_PRONOUN_TOKEN, &pronoun.subject_pronoun),
        None => text.to_string(),
    }
}

pub fn contains_placeholders(text: &str) -> bool {
    text.contains(SUBJECT_PRONOUN_TOKEN) || text.contains(POSSESSIVE_PRONOUN_TOKEN)
}
