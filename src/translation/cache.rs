/*!
 * Translation caching functionality.
 *
 * Captions repeat themselves (intros, jingles, "[Music]"), and a re-run over
 * the same video produces identical chunks. The cache lets the pipeline skip
 * the provider for chunks it has already translated into the same language.
 * The cache holds a bounded number of entries and evicts the oldest first.
 */

use log::debug;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cache key combining chunk text and target language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Source chunk
    source_text: String,

    /// Target language code, lowercased
    target_language: String,
}

impl CacheKey {
    fn new(source_text: &str, target_language: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            target_language: target_language.trim().to_lowercase(),
        }
    }
}

/// Default maximum number of cached chunks
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Stored translations plus their insertion order
#[derive(Debug, Default)]
struct Entries {
    map: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

/// Hit/miss counters for a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Translation cache for storing and retrieving translated chunks
#[derive(Debug)]
pub struct TranslationCache {
    /// Internal cache storage
    entries: RwLock<Entries>,

    /// Maximum number of entries kept
    capacity: usize,

    /// Cache hit counter
    hits: AtomicUsize,

    /// Cache miss counter
    misses: AtomicUsize,

    /// Whether caching is enabled
    enabled: bool,
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TranslationCache {
    /// Create a new translation cache with the default capacity
    pub fn new(enabled: bool) -> Self {
        Self::with_capacity(enabled, DEFAULT_CACHE_CAPACITY)
    }

    /// Create a cache holding at most `capacity` entries
    ///
    /// A capacity of zero disables storing.
    pub fn with_capacity(enabled: bool, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            capacity,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get a translation from the cache
    pub fn get(&self, source_text: &str, target_language: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(source_text, target_language);
        let found = self.entries.read().map.get(&key).cloned();

        match &found {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for '{}' (-> {})", truncate_text(source_text, 30), target_language);
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }
        found
    }

    /// Store a translation in the cache
    pub fn store(&self, source_text: &str, target_language: &str, translation: &str) {
        if !self.enabled || self.capacity == 0 {
            return;
        }

        let key = CacheKey::new(source_text, target_language);
        let mut entries = self.entries.write();
        if entries.map.insert(key.clone(), translation.to_string()).is_some() {
            return;
        }
        entries.order.push_back(key);

        while entries.map.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
            debug!("Evicted oldest cache entry, capacity {}", self.capacity);
        }
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().map.len(),
        }
    }

    /// Drop all entries and reset the counters
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.map.clear();
        entries.order.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}
