/*!
 * # captran - caption translator
 *
 * A Rust library that fetches the captions of a YouTube video and translates
 * them into a target language.
 *
 * ## Features
 *
 * - Video id extraction from watch, embed, shorts and short-link URLs
 * - Caption track listing and selection (target language first, manual
 *   tracks before generated ones)
 * - Sentence-aware chunking of long text under a character budget
 * - Per-chunk language detection, retry with backoff and fallback to the
 *   original text
 * - Bounded concurrent translation with order-preserving reassembly
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `captions`: Caption sources, track selection and text assembly
 * - `translation`: The text translation pipeline:
 *   - `translation::normalizer`: Whitespace normalization
 *   - `translation::chunker`: Sentence-aware chunking
 *   - `translation::chunk_translator`: Detection, retry and fallback per chunk
 *   - `translation::reassembler`: Joining and punctuation spacing
 *   - `translation::pipeline`: The orchestrating `TextTranslator`
 *   - `translation::cache`: Caching of chunk translations
 *   - `translation::events`: Chunk events and observers
 * - `providers`: Translation provider clients:
 *   - `providers::google`: Google web translate client
 *   - `providers::mock`: Configurable in-process provider
 * - `video_id`: Video reference parsing
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod captions;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod video_id;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{CaptionTranslation, Controller, JsonReport};
pub use captions::{CaptionEntry, CaptionSource, CaptionTrack};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use translation::TextTranslator;
pub use video_id::extract_video_id;
