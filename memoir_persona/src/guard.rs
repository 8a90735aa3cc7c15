//! Critical-token guard.
//!
//! Dates, clock times and proper-noun phrases must survive a stylistic
//! rewrite. Tokens are taken from the text before rewriting; any that no
//! longer appear (case-insensitively) are appended as a single
//! `" (Important: ...)"` suffix.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Start of the suffix appended for missing tokens.
pub const IMPORTANT_PREFIX: &str = " (Important: ";

#[expect(clippy::expect_used, reason = "guard patterns are literals")]
fn literal(pattern: &str, case_insensitive: bool) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .expect("guard pattern compiles")
}

static DATE: Lazy<Regex> = Lazy::new(|| {
    literal(
        r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b|\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(?:st|nd|rd|th)?\b",
        true,
    )
});

static TIME: Lazy<Regex> =
    Lazy::new(|| literal(r"\b\d{1,2}:\d{2}(?:\s*(?:AM|PM|am|pm)\b)?", false));

static PROPER_NOUN: Lazy<Regex> =
    Lazy::new(|| literal(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b", false));

/// Collect the critical tokens of `text`: dates, then times, then
/// proper-noun phrases. Classes are matched independently, so a token may
/// appear once per class.
#[must_use]
pub fn extract_critical_tokens(text: &str) -> Vec<String> {
    [&*DATE, &*TIME, &*PROPER_NOUN]
        .into_iter()
        .flat_map(|re| re.find_iter(text).map(|m| m.as_str().to_string()))
        .collect()
}

/// Append any token missing from `rewritten`.
///
/// Every missing token is listed in extraction order, repeats included.
#[must_use]
pub fn preserve(rewritten: &str, tokens: &[String]) -> String {
    let haystack = rewritten.to_lowercase();
    let missing: Vec<&str> = tokens
        .iter()
        .filter(|token| !haystack.contains(&token.to_lowercase()))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        rewritten.to_string()
    } else {
        format!("{rewritten}{IMPORTANT_PREFIX}{})", missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_each_token_class() {
        let tokens = extract_critical_tokens("The meeting is on March 15th at 3:00 PM");
        assert_eq!(tokens, vec!["March 15th", "3:00 PM", "The", "March"]);
    }

    #[test]
    fn numeric_dates_and_bare_times() {
        let tokens = extract_critical_tokens("due 12/05/2025, call at 9:30");
        assert_eq!(tokens, vec!["12/05/2025", "9:30"]);
    }

    #[test]
    fn month_names_match_in_any_case() {
        let tokens = extract_critical_tokens("see you march 3rd");
        assert_eq!(tokens, vec!["march 3rd"]);
    }

    #[test]
    fn proper_nouns_are_maximal_runs() {
        let tokens = extract_critical_tokens("lunch with Mary Jane Watson in the city");
        assert_eq!(tokens, vec!["Mary Jane Watson"]);
    }

    #[test]
    fn lowercase_text_has_no_tokens() {
        assert!(extract_critical_tokens("nothing special here").is_empty());
    }

    #[test]
    fn present_tokens_leave_text_unchanged() {
        let tokens = vec!["March 15th".to_string()];
        assert_eq!(
            preserve("see you on march 15th", &tokens),
            "see you on march 15th"
        );
    }

    #[test]
    fn every_missing_token_is_listed() {
        let tokens = vec![
            "March 15th".to_string(),
            "Ana".to_string(),
            "Ana".to_string(),
        ];
        assert_eq!(
            preserve("see you soon", &tokens),
            "see you soon (Important: March 15th, Ana, Ana)"
        );
    }

    #[test]
    fn repeated_name_in_the_original_repeats_in_the_suffix() {
        let tokens = extract_critical_tokens("Ana said Ana would call on March 3rd");
        assert_eq!(tokens, vec!["March 3rd", "Ana", "Ana", "March"]);
        assert_eq!(
            preserve("she will call", &tokens),
            "she will call (Important: March 3rd, Ana, Ana, March)"
        );
    }
}
