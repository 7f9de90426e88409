/*!
 * Sentence-aware chunking of normalized text.
 *
 * Translation services reject or truncate long inputs, so caption text is cut
 * into chunks of at most `max_len` characters. Cuts fall on sentence
 * boundaries where possible and on word boundaries inside sentences that are
 * too long on their own.
 */

use std::fmt;
use std::ops::Deref;

use super::normalizer::NormalizedText;

/// Default chunk budget in characters
pub const MAX_CHUNK_LEN: usize = 1000;

/// Characters that end a sentence. `।` is the Devanagari danda.
pub const SENTENCE_TERMINATORS: [char; 4] = ['.', '!', '?', '।'];

/// A non-empty piece of text, the unit of translation
///
/// Its length never exceeds the budget it was cut for, except when it is a
/// single word longer than the budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk(String);

impl Chunk {
    /// Borrow the chunk text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Consume into the chunk text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for Chunk {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Chunk {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_terminator(c: char) -> bool {
    SENTENCE_TERMINATORS.contains(&c)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text into sentences, each keeping its terminators
///
/// A boundary is a run of terminators followed by whitespace or the end of the
/// text, so decimals like `3.14` and ellipses stay inside their sentence. A
/// trailing fragment without a terminator is returned as-is.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        while chars.next_if(|&(_, next)| is_terminator(next)).is_some() {}

        match chars.peek() {
            None => {
                push_trimmed(&mut sentences, &text[start..]);
                start = text.len();
            }
            Some(&(idx, next)) if next.is_whitespace() => {
                push_trimmed(&mut sentences, &text[start..idx]);
                start = idx;
            }
            Some(_) => {}
        }
    }

    if start < text.len() {
        push_trimmed(&mut sentences, &text[start..]);
    }
    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        sentences.push(piece);
    }
}

/// Pieces waiting to be joined into one chunk
#[derive(Default)]
struct Accumulator<'a> {
    parts: Vec<&'a str>,
    len: usize,
}

impl<'a> Accumulator<'a> {
    /// Joined length if `piece_len` more characters were appended
    fn projected_len(&self, piece_len: usize) -> usize {
        if self.parts.is_empty() {
            piece_len
        } else {
            self.len + 1 + piece_len
        }
    }

    fn push(&mut self, piece: &'a str, piece_len: usize) {
        self.len = self.projected_len(piece_len);
        self.parts.push(piece);
    }

    fn flush_into(&mut self, chunks: &mut Vec<Chunk>) {
        if !self.parts.is_empty() {
            chunks.push(Chunk(self.parts.join(" ")));
            self.parts.clear();
            self.len = 0;
        }
    }
}

/// Cut normalized text into chunks of at most `max_len` characters
///
/// Sentences are packed greedily. A sentence longer than `max_len` is split on
/// whitespace and its words packed the same way; a single word longer than
/// `max_len` becomes a chunk of its own. A `max_len` of zero is treated as one.
pub fn chunk(text: &NormalizedText, max_len: usize) -> Vec<Chunk> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::new();
    let mut current = Accumulator::default();

    for sentence in split_sentences(text.as_str()) {
        let sentence_len = char_len(sentence);

        if current.projected_len(sentence_len) <= max_len {
            current.push(sentence, sentence_len);
            continue;
        }

        current.flush_into(&mut chunks);
        if sentence_len > max_len {
            pack_words(sentence, max_len, &mut chunks);
        } else {
            current.push(sentence, sentence_len);
        }
    }

    current.flush_into(&mut chunks);
    chunks
}

fn pack_words(sentence: &str, max_len: usize, chunks: &mut Vec<Chunk>) {
    let mut group = Accumulator::default();
    for word in sentence.split_whitespace() {
        let word_len = char_len(word);
        if group.projected_len(word_len) > max_len {
            group.flush_into(chunks);
        }
        group.push(word, word_len);
    }
    group.flush_into(chunks);
}
