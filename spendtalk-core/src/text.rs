//! Small text helpers shared by the lexicon-driven parsers.

/// True if `phrase` occurs in `haystack` with no letter or digit directly
/// before or after it. Both inputs are expected to be lowercase already.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    haystack.match_indices(phrase).any(|(start, m)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + m.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// First phrase from `phrases` found in `haystack`, in list order.
pub fn find_phrase<'a>(haystack: &str, phrases: &[&'a str]) -> Option<&'a str> {
    phrases.iter().copied().find(|p| contains_phrase(haystack, p))
}

pub fn contains_any(haystack: &str, phrases: &[&str]) -> bool {
    find_phrase(haystack, phrases).is_some()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
