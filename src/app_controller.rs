use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::{Config, TranslationConfig, TranslationProvider};
use crate::captions::{self, CaptionSource, Transcript, YouTubeCaptions};
use crate::providers::Provider;
use crate::providers::google::GoogleTranslate;
use crate::providers::mock::MockProvider;
use crate::translation::{
    ChunkOutcome, ChunkTranslation, PipelineReport, TextTranslator, TranslationObserver, chunk, normalize,
};
use crate::video_id;

// @module: Application controller for caption translation

/// Outcome of processing one video
#[derive(Debug, Clone, Serialize)]
pub struct CaptionTranslation {
    pub video_id: String,
    /// Language of the caption track that was used
    pub language_code: String,
    /// Whether that track was generated by speech recognition
    pub is_generated: bool,
    pub target_language: String,
    /// Cleaned caption text
    pub original: String,
    /// Translated text, or the original when no translation was needed
    pub translated: String,
    /// Whether the translation pipeline ran
    pub was_translated: bool,
    /// Per-chunk outcomes, empty when the pipeline did not run
    pub chunks: Vec<ChunkTranslation>,
}

/// JSON envelope printed by the CLI
///
/// Success flattens the result next to `"success": true`; failure carries only
/// the error chain.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a, T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub result: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a, T: Serialize> JsonReport<'a, T> {
    pub fn success(result: &'a T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: &anyhow::Error) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(format!("{:#}", error)),
        }
    }
}

impl CaptionTranslation {
    /// Number of chunks left untranslated after exhausting their attempts
    pub fn untranslated_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.outcome == ChunkOutcome::Fallback).count()
    }
}

/// Build the provider selected in the translation settings
pub fn build_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>> {
    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::Google => Arc::new(
            GoogleTranslate::new_with_config(&config.endpoint, config.request_timeout(), config.rate_limit)
                .context("Failed to create Google translate client")?,
        ),
        TranslationProvider::Mock => Arc::new(MockProvider::working()),
    };
    Ok(provider)
}

/// Main application controller for caption translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Where captions come from
    captions: Arc<dyn CaptionSource>,

    // @field: Translation pipeline
    translator: TextTranslator,
}

impl Controller {
    // @method: Create a controller with network-backed collaborators
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let captions = YouTubeCaptions::new(
            config.captions.endpoint.clone(),
            std::time::Duration::from_secs(config.captions.timeout_secs),
        )
        .context("Failed to create caption client")?;
        let provider = build_provider(&config.translation)?;

        Ok(Self::with_components(config, Arc::new(captions), provider))
    }

    // @method: Create a controller with explicit collaborators
    pub fn with_components(config: Config, captions: Arc<dyn CaptionSource>, provider: Arc<dyn Provider>) -> Self {
        let translator = TextTranslator::from_config(provider, &config.translation);
        Self {
            config,
            captions,
            translator,
        }
    }

    /// Route chunk events to `observer` instead of the log
    pub fn with_observer(mut self, observer: Arc<dyn TranslationObserver>) -> Self {
        self.translator = self.translator.with_observer(observer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn translator(&self) -> &TextTranslator {
        &self.translator
    }

    /// Number of chunks `text` will be split into
    pub fn planned_chunks(&self, text: &str) -> usize {
        chunk(&normalize(text), self.config.translation.max_chunk_chars).len()
    }

    /// Resolve a video reference and fetch its caption text
    pub async fn fetch_transcript(&self, input: &str) -> Result<Transcript> {
        let video_id = video_id::extract_video_id(input)?;
        let transcript = captions::fetch_transcript(
            self.captions.as_ref(),
            &video_id,
            &self.config.target_language,
            &self.config.captions.preferred_languages,
        )
        .await
        .with_context(|| format!("Failed to get captions for video {}", video_id))?;

        info!(
            "Fetched {} chars of captions for {}",
            transcript.text.chars().count(),
            video_id
        );
        Ok(transcript)
    }

    /// Translate a fetched transcript into the target language
    ///
    /// Nothing is sent to the provider when `translate` is false or the
    /// track is already in the target language.
    pub async fn translate_transcript(&self, transcript: Transcript, translate: bool) -> Result<CaptionTranslation> {
        let target_language = self.config.target_language.clone();

        let (translated, chunks, was_translated) = if !translate {
            (transcript.text.clone(), Vec::new(), false)
        } else if transcript.matches_target {
            info!("Captions are already in '{}', skipping translation", target_language);
            (transcript.text.clone(), Vec::new(), false)
        } else {
            let report = self.translate_text(&transcript.text).await?;
            (report.text, report.chunks, true)
        };

        let result = CaptionTranslation {
            video_id: transcript.video_id,
            language_code: transcript.track.language_code,
            is_generated: transcript.track.is_generated,
            target_language,
            original: transcript.text,
            translated,
            was_translated,
            chunks,
        };

        let untranslated = result.untranslated_chunks();
        if untranslated > 0 {
            warn!(
                "{} of {} chunk(s) could not be translated and were kept as-is",
                untranslated,
                result.chunks.len()
            );
        }
        Ok(result)
    }

    /// Fetch and translate the captions of a video
    pub async fn run(&self, input: &str, translate: bool) -> Result<CaptionTranslation> {
        let start_time = Instant::now();
        let transcript = self.fetch_transcript(input).await?;
        let result = self.translate_transcript(transcript, translate).await?;
        info!("Processed video {} in {:?}", result.video_id, start_time.elapsed());
        Ok(result)
    }

    /// Translate raw text through the pipeline into the target language
    pub async fn translate_text(&self, raw_text: &str) -> Result<PipelineReport> {
        self.translator
            .translate_text_detailed(raw_text, &self.config.target_language)
            .await
            .context("Translation failed")
    }
}
