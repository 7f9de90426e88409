/*!
 * Caption retrieval.
 *
 * A [`CaptionSource`] lists a video's caption tracks and fetches the timed
 * entries of one of them. The helpers here pick a track and flatten its
 * entries into plain text for the translation pipeline.
 */

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::CaptionError;
use crate::language_utils;
use crate::translation::normalize;

pub mod youtube;

pub use self::youtube::YouTubeCaptions;

/// One timed caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    pub text: String,
    pub start_secs: f64,
    pub duration_secs: f64,
}

impl CaptionEntry {
    pub fn new(text: impl Into<String>, start_secs: f64, duration_secs: f64) -> Self {
        Self {
            text: text.into(),
            start_secs,
            duration_secs,
        }
    }
}

/// A caption track offered for a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Language code as reported by the provider (`en`, `pt-BR`, ...)
    pub language_code: String,
    /// Human readable track name
    pub name: String,
    /// Whether the track was produced by speech recognition
    pub is_generated: bool,
    /// Where the entries of this track are fetched from
    pub base_url: String,
}

/// Source of caption tracks for a video
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// List every caption track of a video, manual and generated
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, CaptionError>;

    /// Fetch the timed entries of a track
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<CaptionEntry>, CaptionError>;
}

/// The track chosen for a video
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSelection<'a> {
    pub track: &'a CaptionTrack,
    /// The track is already in the target language
    pub matches_target: bool,
}

/// Pick the track to use for a video
///
/// Order of preference: a track in the target language, then one in each
/// preferred language, then any manual track, then any generated track.
/// Within a language, manual tracks win over generated ones.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    target_language: &str,
    preferred_languages: &[String],
) -> Option<TrackSelection<'a>> {
    let in_language = |language: &str| {
        tracks
            .iter()
            .filter(|t| language_utils::language_codes_match(&t.language_code, language))
            .min_by_key(|t| t.is_generated)
    };

    if let Some(track) = in_language(target_language) {
        return Some(TrackSelection { track, matches_target: true });
    }

    let fallback = preferred_languages
        .iter()
        .find_map(|language| in_language(language.as_str()))
        .or_else(|| tracks.iter().find(|t| !t.is_generated))
        .or_else(|| tracks.first())?;

    Some(TrackSelection { track: fallback, matches_target: false })
}

/// Flatten caption entries into one line of text
///
/// Each entry is whitespace-normalized; blank entries are dropped.
pub fn assemble_text(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .map(|entry| normalize(&entry.text))
        .filter(|text| !text.is_empty())
        .map(|text| text.into_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Caption text of a video together with the track it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub video_id: String,
    pub track: CaptionTrack,
    pub matches_target: bool,
    pub text: String,
}

/// List, select, fetch and flatten the captions of a video
pub async fn fetch_transcript(
    source: &dyn CaptionSource,
    video_id: &str,
    target_language: &str,
    preferred_languages: &[String],
) -> Result<Transcript, CaptionError> {
    let tracks = source.list_tracks(video_id).await?;
    for track in &tracks {
        debug!(
            "Found {} caption track: {} ({})",
            if track.is_generated { "generated" } else { "manual" },
            track.language_code,
            track.name
        );
    }

    let selection = select_track(&tracks, target_language, preferred_languages)
        .ok_or_else(|| CaptionError::NoCaptions { video_id: video_id.to_string() })?;

    info!(
        "Using {} caption track '{}' for {}{}",
        if selection.track.is_generated { "generated" } else { "manual" },
        selection.track.language_code,
        video_id,
        if selection.matches_target { " (already in target language)" } else { "" }
    );

    let entries = source.fetch_track(selection.track).await?;
    let text = assemble_text(&entries);
    if text.is_empty() {
        return Err(CaptionError::EmptyTranscript { video_id: video_id.to_string() });
    }

    Ok(Transcript {
        video_id: video_id.to_string(),
        track: selection.track.clone(),
        matches_target: selection.matches_target,
        text,
    })
}
