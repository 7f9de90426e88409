/*!
 * Whitespace normalization for caption text.
 */

use std::fmt;
use std::ops::Deref;

/// Text with no control whitespace, no runs of spaces, and no leading or
/// trailing whitespace.
///
/// Only [`normalize`] constructs it, so the chunker can rely on single-space
/// separators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Borrow the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for NormalizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapse all whitespace (tabs, newlines, carriage returns and Unicode
/// spaces) into single spaces and trim the ends.
pub fn normalize(raw: &str) -> NormalizedText {
    NormalizedText(collapse_whitespace(raw))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
