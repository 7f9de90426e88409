/*!
 * Per-chunk observability events.
 *
 * The pipeline reports every detection failure, failed attempt and final
 * outcome through a [`TranslationObserver`] instead of printing, so callers
 * decide whether events go to the log, a progress bar or a test assertion.
 */

use log::{debug, warn};
use parking_lot::Mutex;

use super::chunk_translator::ChunkOutcome;

/// Something that happened while translating one chunk
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkEvent {
    /// Language detection failed; translation goes ahead without the skip check
    DetectionFailed {
        index: usize,
        error: String,
    },

    /// One translation attempt failed or returned nothing
    AttemptFailed {
        index: usize,
        attempt: u32,
        max_attempts: u32,
        error: String,
    },

    /// Translation was served from the cache
    CacheHit {
        index: usize,
    },

    /// The provider panicked while handling the chunk
    Panicked {
        index: usize,
        message: String,
    },

    /// Final outcome; emitted exactly once per chunk
    Completed {
        index: usize,
        outcome: ChunkOutcome,
        attempts: u32,
    },
}

impl ChunkEvent {
    /// Index of the chunk the event belongs to
    pub fn index(&self) -> usize {
        match self {
            Self::DetectionFailed { index, .. }
            | Self::AttemptFailed { index, .. }
            | Self::CacheHit { index }
            | Self::Panicked { index, .. }
            | Self::Completed { index, .. } => *index,
        }
    }
}

/// Receiver for chunk events
pub trait TranslationObserver: Send + Sync {
    fn on_event(&self, event: &ChunkEvent);
}

impl<F> TranslationObserver for F
where
    F: Fn(&ChunkEvent) + Send + Sync,
{
    fn on_event(&self, event: &ChunkEvent) {
        self(event)
    }
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl TranslationObserver for LogObserver {
    fn on_event(&self, event: &ChunkEvent) {
        match event {
            ChunkEvent::DetectionFailed { index, error } => {
                debug!("Chunk {}: language detection failed, translating anyway: {}", index + 1, error);
            }
            ChunkEvent::AttemptFailed { index, attempt, max_attempts, error } => {
                warn!("Chunk {}: translation attempt {}/{} failed: {}", index + 1, attempt, max_attempts, error);
            }
            ChunkEvent::CacheHit { index } => {
                debug!("Chunk {}: served from cache", index + 1);
            }
            ChunkEvent::Panicked { index, message } => {
                warn!("Chunk {}: provider panicked: {}", index + 1, message);
            }
            ChunkEvent::Completed { index, outcome: ChunkOutcome::Fallback, attempts } => {
                warn!("Chunk {}: keeping original text after {} attempt(s)", index + 1, attempts);
            }
            ChunkEvent::Completed { index, outcome, attempts } => {
                debug!("Chunk {}: {} after {} attempt(s)", index + 1, outcome, attempts);
            }
        }
    }
}

/// Records events in memory
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ChunkEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<ChunkEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events matching a predicate
    pub fn count(&self, predicate: impl Fn(&ChunkEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| predicate(event)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl TranslationObserver for EventLog {
    fn on_event(&self, event: &ChunkEvent) {
        self.events.lock().push(event.clone());
    }
}
