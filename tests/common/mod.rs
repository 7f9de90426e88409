/*!
 * Common test utilities for the captran test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

use captran::app_config::{Config, TranslationProvider};
use captran::captions::{CaptionEntry, CaptionSource, CaptionTrack};
use captran::errors::{CaptionError, ProviderError};
use captran::providers::Provider;

/// Route library logs through env_logger; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Config using the offline provider with no backoff and no rate limit
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    config.translation.retry_backoff_ms = 0;
    config.translation.rate_limit = None;
    config
}

/// `count` distinct sentences of roughly 40 characters each
pub fn numbered_sentences(count: usize) -> String {
    (0..count)
        .map(|i| format!("Sentence number {} talks about caption text.", i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a caption track for stubs
pub fn track(language_code: &str, is_generated: bool) -> CaptionTrack {
    CaptionTrack {
        language_code: language_code.to_string(),
        name: language_code.to_string(),
        is_generated,
        base_url: format!("stub://{}/{}", language_code, is_generated),
    }
}

/// In-memory caption source keyed by video id
#[derive(Debug, Default)]
pub struct StubCaptions {
    videos: HashMap<String, Vec<(CaptionTrack, Vec<CaptionEntry>)>>,
    fetches: AtomicUsize,
}

impl StubCaptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a track and its entries for a video
    pub fn with_track(mut self, video_id: &str, track: CaptionTrack, lines: &[&str]) -> Self {
        let entries = lines
            .iter()
            .enumerate()
            .map(|(i, line)| CaptionEntry::new(*line, i as f64 * 2.0, 2.0))
            .collect();
        self.videos.entry(video_id.to_string()).or_default().push((track, entries));
        self
    }

    /// Register a video that has no tracks at all
    pub fn with_video(mut self, video_id: &str) -> Self {
        self.videos.entry(video_id.to_string()).or_default();
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptionSource for StubCaptions {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, CaptionError> {
        let tracks = self.videos.get(video_id).ok_or_else(|| {
            CaptionError::Provider(ProviderError::ApiError {
                status_code: 404,
                message: format!("unknown video {}", video_id),
            })
        })?;
        Ok(tracks.iter().map(|(track, _)| track.clone()).collect())
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<CaptionEntry>, CaptionError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.videos
            .values()
            .flatten()
            .find(|(candidate, _)| candidate == track)
            .map(|(_, entries)| entries.clone())
            .ok_or_else(|| CaptionError::Provider(ProviderError::ParseError("unknown track".to_string())))
    }
}

/// Provider whose earlier calls take longer than later ones
///
/// With several chunks in flight, completion order is the reverse of start order.
#[derive(Debug)]
pub struct DecreasingLatencyProvider {
    calls: AtomicUsize,
    step_ms: u64,
    max_calls: usize,
}

impl DecreasingLatencyProvider {
    pub fn new(max_calls: usize, step_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            step_ms,
            max_calls,
        })
    }
}

#[async_trait]
impl Provider for DecreasingLatencyProvider {
    fn name(&self) -> &str {
        "decreasing-latency"
    }

    async fn detect_language(&self, _text: &str) -> Result<String, ProviderError> {
        Ok("en".to_string())
    }

    async fn translate(&self, text: &str, _target_language: &str) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.max_calls.saturating_sub(call) as u64;
        tokio::time::sleep(Duration::from_millis(remaining * self.step_ms)).await;
        Ok(format!("~{}", text))
    }
}
