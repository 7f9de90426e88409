/*!
 * Text translation pipeline for caption text.
 *
 * Caption text flows one way through these submodules:
 *
 * - `normalizer`: whitespace cleanup
 * - `chunker`: sentence-aware splitting into bounded chunks
 * - `chunk_translator`: per-chunk detection, retry and fallback
 * - `reassembler`: joining and punctuation spacing
 * - `pipeline`: the `TextTranslator` orchestrating the steps above
 *
 * plus `cache` for reusing translations and `events` for observability.
 */

// Re-export main types for easier usage
pub use self::cache::{CacheStats, DEFAULT_CACHE_CAPACITY, TranslationCache};
pub use self::chunk_translator::{ChunkOutcome, ChunkTranslation, RetryPolicy, translate_chunk};
pub use self::chunker::{Chunk, MAX_CHUNK_LEN, SENTENCE_TERMINATORS, chunk, split_sentences};
pub use self::events::{ChunkEvent, EventLog, LogObserver, TranslationObserver};
pub use self::normalizer::{NormalizedText, normalize};
pub use self::pipeline::{PipelineOptions, PipelineReport, TextTranslator};
pub use self::reassembler::reassemble;

// Submodules
pub mod cache;
pub mod chunk_translator;
pub mod chunker;
pub mod events;
pub mod normalizer;
pub mod pipeline;
pub mod reassembler;
