/*!
 * Translation of a single chunk with detection short-circuit, retry and
 * fallback.
 */

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use super::chunker::Chunk;
use super::events::{ChunkEvent, TranslationObserver};
use crate::language_utils;
use crate::providers::Provider;

/// Upper bound for a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// How a chunk ended up in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkOutcome {
    /// The provider returned a translation
    Translated,
    /// The chunk was already in the target language
    Skipped,
    /// Every attempt failed; the original text is kept
    Fallback,
}

impl ChunkOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Translated => "translated",
            Self::Skipped => "skipped",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ChunkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of translating one chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkTranslation {
    /// Position of the chunk in the input
    pub index: usize,
    /// Output text for this position
    pub text: String,
    pub outcome: ChunkOutcome,
    /// Translate calls made for this chunk
    pub attempts: u32,
}

impl ChunkTranslation {
    pub(crate) fn fallback(index: usize, chunk: &Chunk, attempts: u32) -> Self {
        Self {
            index,
            text: chunk.to_string(),
            outcome: ChunkOutcome::Fallback,
            attempts,
        }
    }
}

/// Attempt bound and backoff for translate calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total translate attempts per chunk, at least one
    pub max_attempts: u32,
    /// First backoff in milliseconds, doubled per attempt; 0 disables backoff
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base_ms,
        }
    }

    /// Sleep after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let delay_ms = self.backoff_base_ms.saturating_mul(1u64 << shift);
        Duration::from_millis(delay_ms).min(MAX_BACKOFF)
    }
}

/// Translate one chunk, never failing
///
/// 1. If detection reports the target language the chunk is returned as-is.
///    A detection error only costs the shortcut.
/// 2. Otherwise translation is attempted up to `policy.max_attempts` times;
///    the first non-blank answer wins. Non-retryable errors end the loop early.
/// 3. When nothing succeeds the original chunk is returned as a fallback.
pub async fn translate_chunk(
    index: usize,
    chunk: &Chunk,
    target_language: &str,
    provider: &dyn Provider,
    policy: &RetryPolicy,
    observer: &dyn TranslationObserver,
) -> ChunkTranslation {
    match provider.detect_language(chunk).await {
        Ok(detected) if language_utils::language_codes_match(&detected, target_language) => {
            observer.on_event(&ChunkEvent::Completed {
                index,
                outcome: ChunkOutcome::Skipped,
                attempts: 0,
            });
            return ChunkTranslation {
                index,
                text: chunk.to_string(),
                outcome: ChunkOutcome::Skipped,
                attempts: 0,
            };
        }
        Ok(_) => {}
        Err(e) => observer.on_event(&ChunkEvent::DetectionFailed {
            index,
            error: e.to_string(),
        }),
    }

    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    while attempts < max_attempts {
        attempts += 1;

        let retryable = match provider.translate(chunk, target_language).await {
            Ok(translated) if !translated.trim().is_empty() => {
                observer.on_event(&ChunkEvent::Completed {
                    index,
                    outcome: ChunkOutcome::Translated,
                    attempts,
                });
                return ChunkTranslation {
                    index,
                    text: translated.trim().to_string(),
                    outcome: ChunkOutcome::Translated,
                    attempts,
                };
            }
            Ok(_) => {
                observer.on_event(&ChunkEvent::AttemptFailed {
                    index,
                    attempt: attempts,
                    max_attempts,
                    error: "provider returned an empty translation".to_string(),
                });
                true
            }
            Err(e) => {
                observer.on_event(&ChunkEvent::AttemptFailed {
                    index,
                    attempt: attempts,
                    max_attempts,
                    error: e.to_string(),
                });
                e.is_retryable()
            }
        };

        if !retryable {
            break;
        }
        if attempts < max_attempts {
            let delay = policy.delay_after(attempts);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    observer.on_event(&ChunkEvent::Completed {
        index,
        outcome: ChunkOutcome::Fallback,
        attempts,
    });
    ChunkTranslation::fallback(index, chunk, attempts)
}
