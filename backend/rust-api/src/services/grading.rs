//! Free-text answer grading.
//!
//! Both the submitted and the stored answer are run through the same
//! normalization and then compared for exact equality. Word order stays
//! significant: "tower eiffel" does not match "eiffel tower".

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Articles folded away at the start of an answer. Only one is stripped.
const LEADING_ARTICLES: [&str; 3] = ["the", "an", "a"];

/// Returns true when the submission matches the stored answer after
/// normalization on both sides.
pub fn grade(submitted: &str, correct: &str) -> bool {
    normalize(submitted) == normalize(correct)
}

/// Canonical normalization applied before comparison:
/// trim, lowercase, fold diacritics (NFD, drop combining marks), drop
/// everything but alphanumerics and whitespace, collapse whitespace runs,
/// strip one leading article, strip one trailing "s".
///
/// The trailing-s fold is a deliberate naive plural fold and also bites
/// words that genuinely end in "s" ("gas" becomes "ga"). Both sides get the
/// same treatment, so matching is unaffected.
pub fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let without_article = strip_leading_article(&collapsed);
    without_article
        .strip_suffix('s')
        .unwrap_or(without_article)
        .to_string()
}

/// Strips a single leading article when it is a whole word. Runs after
/// whitespace collapsing, so a single space separator is guaranteed.
fn strip_leading_article(answer: &str) -> &str {
    for article in LEADING_ARTICLES {
        if let Some(rest) = answer.strip_prefix(article) {
            if let Some(rest) = rest.strip_prefix(' ') {
                return rest;
            }
        }
    }
    answer
}
