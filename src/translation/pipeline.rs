/*!
 * Text translation pipeline.
 *
 * Wires normalizer, chunker, chunk translator and reassembler into a single
 * `translate_text` call. Chunks are translated concurrently up to a fixed
 * limit and reassembled in input order. A chunk that fails, or whose provider
 * panics, degrades to its original text without affecting the others.
 */

use futures::FutureExt;
use futures::stream::{self, StreamExt};
use log::{error, info};
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::cache::TranslationCache;
use super::chunk_translator::{ChunkOutcome, ChunkTranslation, RetryPolicy, translate_chunk};
use super::chunker::{Chunk, MAX_CHUNK_LEN, chunk};
use super::events::{ChunkEvent, LogObserver, TranslationObserver};
use super::normalizer::normalize;
use super::reassembler::reassemble;
use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::providers::Provider;

/// Tuning for a [`TextTranslator`]
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Chunk budget in characters
    pub max_chunk_chars: usize,

    /// Attempt bound and backoff per chunk
    pub retry: RetryPolicy,

    /// Maximum chunks in flight at once
    pub concurrent_requests: usize,

    /// Deadline for the whole chunk phase
    pub timeout: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_chunk_chars: MAX_CHUNK_LEN,
            retry: RetryPolicy::default(),
            concurrent_requests: 4,
            timeout: None,
        }
    }
}

impl From<&TranslationConfig> for PipelineOptions {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            max_chunk_chars: config.max_chunk_chars,
            retry: RetryPolicy::new(config.retry_count, config.retry_backoff_ms),
            concurrent_requests: config.concurrent_requests.max(1),
            timeout: config.pipeline_timeout(),
        }
    }
}

/// Output of a pipeline run with per-chunk detail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Final reassembled text
    pub text: String,

    /// One entry per chunk, in input order
    pub chunks: Vec<ChunkTranslation>,
}

impl PipelineReport {
    /// Number of chunks with the given outcome
    pub fn count(&self, outcome: ChunkOutcome) -> usize {
        self.chunks.iter().filter(|c| c.outcome == outcome).count()
    }

    /// Whether any chunk fell back to its original text
    pub fn is_degraded(&self) -> bool {
        self.count(ChunkOutcome::Fallback) > 0
    }
}

/// Translates arbitrary-length text through an injected provider
pub struct TextTranslator {
    provider: Arc<dyn Provider>,
    options: PipelineOptions,
    cache: TranslationCache,
    observer: Arc<dyn TranslationObserver>,
}

impl TextTranslator {
    /// Create a translator with default options, an enabled cache and log output
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            options: PipelineOptions::default(),
            cache: TranslationCache::new(true),
            observer: Arc::new(LogObserver),
        }
    }

    /// Create a translator configured from the translation settings
    pub fn from_config(provider: Arc<dyn Provider>, config: &TranslationConfig) -> Self {
        Self::new(provider)
            .with_options(PipelineOptions::from(config))
            .with_cache(TranslationCache::with_capacity(config.cache_enabled, config.cache_capacity))
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cache(mut self, cache: TranslationCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn TranslationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Translate text into `target_language`
    ///
    /// Blank input is returned unchanged. The only error is a timeout; any
    /// per-chunk failure leaves that chunk untranslated instead.
    pub async fn translate_text(&self, raw_text: &str, target_language: &str) -> Result<String, TranslationError> {
        Ok(self.translate_text_detailed(raw_text, target_language).await?.text)
    }

    /// Like [`translate_text`](Self::translate_text), with per-chunk outcomes
    pub async fn translate_text_detailed(
        &self,
        raw_text: &str,
        target_language: &str,
    ) -> Result<PipelineReport, TranslationError> {
        if raw_text.trim().is_empty() {
            return Ok(PipelineReport {
                text: raw_text.to_string(),
                chunks: Vec::new(),
            });
        }

        let start_time = Instant::now();
        let normalized = normalize(raw_text);
        let chunks = chunk(&normalized, self.options.max_chunk_chars);

        info!(
            "Translating {} chars in {} chunk(s) to '{}' via {}",
            normalized.chars().count(),
            chunks.len(),
            target_language,
            self.provider.name()
        );

        let work = self.translate_chunks(&chunks, target_language);
        let translations = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
                error!("Translation abandoned after {:?} with chunks still in flight", limit);
                TranslationError::Timeout { limit }
            })?,
            None => work.await,
        };

        let parts: Vec<&str> = translations.iter().map(|t| t.text.as_str()).collect();
        let report = PipelineReport {
            text: reassemble(&parts),
            chunks: translations,
        };

        info!(
            "Translation finished in {:?}: {} translated, {} skipped, {} untranslated",
            start_time.elapsed(),
            report.count(ChunkOutcome::Translated),
            report.count(ChunkOutcome::Skipped),
            report.count(ChunkOutcome::Fallback)
        );

        Ok(report)
    }

    /// Translate all chunks with bounded concurrency, returned in input order
    async fn translate_chunks(&self, chunks: &[Chunk], target_language: &str) -> Vec<ChunkTranslation> {
        let concurrency = self.options.concurrent_requests.max(1);

        let mut results = stream::iter(chunks.iter().enumerate())
            .map(|(index, chunk)| self.translate_one(index, chunk, target_language))
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .await;

        // Completion order differs from input order under concurrency
        results.sort_by_key(|t| t.index);
        results
    }

    async fn translate_one(&self, index: usize, chunk: &Chunk, target_language: &str) -> ChunkTranslation {
        if let Some(cached) = self.cache.get(chunk, target_language) {
            self.observer.on_event(&ChunkEvent::CacheHit { index });
            self.observer.on_event(&ChunkEvent::Completed {
                index,
                outcome: ChunkOutcome::Translated,
                attempts: 0,
            });
            return ChunkTranslation {
                index,
                text: cached,
                outcome: ChunkOutcome::Translated,
                attempts: 0,
            };
        }

        let attempt = translate_chunk(
            index,
            chunk,
            target_language,
            self.provider.as_ref(),
            &self.options.retry,
            self.observer.as_ref(),
        );

        let translation = match AssertUnwindSafe(attempt).catch_unwind().await {
            Ok(translation) => translation,
            Err(panic) => {
                self.observer.on_event(&ChunkEvent::Panicked {
                    index,
                    message: panic_message(panic.as_ref()),
                });
                self.observer.on_event(&ChunkEvent::Completed {
                    index,
                    outcome: ChunkOutcome::Fallback,
                    attempts: 1,
                });
                ChunkTranslation::fallback(index, chunk, 1)
            }
        };

        if translation.outcome == ChunkOutcome::Translated {
            self.cache.store(chunk, target_language, &translation.text);
        }
        translation
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
