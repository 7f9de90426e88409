/*!
 * Reassembly of translated chunks into the final text.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::normalizer::collapse_whitespace;

// @const: Sentence punctuation run that may have whitespace between marks, as in `. . .`
static SPACED_PUNCTUATION_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?](?:\s*[.!?])+").expect("spaced punctuation regex is valid")
});

// @const: Run of sentence punctuation with any surrounding whitespace
static PUNCTUATION_SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*([.!?]+)\s*").expect("punctuation spacing regex is valid")
});

/// Join translated parts and tidy spacing around sentence punctuation
///
/// Every run of `.`, `!` and `?` loses the whitespace before it and is
/// followed by exactly one space, except at the very end of the text. Runs
/// such as `...` or `?!` are kept together, and spaced runs like `. . .` are
/// closed up first.
pub fn reassemble<S: AsRef<str>>(parts: &[S]) -> String {
    let joined = parts
        .iter()
        .map(|part| part.as_ref())
        .collect::<Vec<&str>>()
        .join(" ");

    let closed = SPACED_PUNCTUATION_RUN.replace_all(&joined, |caps: &Captures| {
        caps[0].chars().filter(|c| !c.is_whitespace()).collect::<String>()
    });
    let spaced = PUNCTUATION_SPACING.replace_all(&closed, "$1 ");
    collapse_whitespace(&spaced)
}
