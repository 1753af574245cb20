use super::domain::CommentText;

/// Exact, case-sensitive match after trimming both ends. Inner whitespace counts.
pub fn is_duplicate(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

pub fn find_duplicate<'a, T>(candidate: &str, existing: &'a [T]) -> Option<&'a T>
where
    T: CommentText,
{
    find_duplicate_by(candidate, existing, |_| true, |item: &T| item.comment_text())
}

/// Like [`find_duplicate`], restricted to entries accepted by `scope` (e.g. the same subject).
pub fn find_duplicate_in_scope<'a, T, P>(
    candidate: &str,
    existing: &'a [T],
    scope: P,
) -> Option<&'a T>
where
    T: CommentText,
    P: Fn(&T) -> bool,
{
    find_duplicate_by(candidate, existing, scope, |item: &T| item.comment_text())
}

pub fn find_duplicate_by<'a, T, P, F>(
    candidate: &str,
    existing: &'a [T],
    scope: P,
    text_of: F,
) -> Option<&'a T>
where
    P: Fn(&T) -> bool,
    F: Fn(&T) -> &str,
{
    existing
        .iter()
        .filter(|item| scope(item))
        .find(|item| is_duplicate(candidate, text_of(item)))
}
