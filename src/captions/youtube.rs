use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{CaptionEntry, CaptionSource, CaptionTrack};
use crate::errors::{CaptionError, ProviderError};

// @const: Marker preceding the track list in the watch page player response
const CAPTION_TRACKS_MARKER: &str = "\"captionTracks\":";

// @const: One `<text>` element of a timed-text document
static TEXT_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text\s+start="([0-9.]+)"(?:\s+dur="([0-9.]+)")?[^>]*?(?:/>|>(.*?)</text>)"#)
        .expect("text element regex is valid")
});

// @const: Inline markup inside caption text
static INLINE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("inline tag regex is valid"));

// @const: Named and numeric character references
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);").expect("entity regex is valid")
});

/// Caption source backed by the public YouTube watch page and timed-text API
#[derive(Debug)]
pub struct YouTubeCaptions {
    /// Site root, without trailing slash
    base_url: String,
    client: Client,
}

/// Track entry as it appears in the player response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<Value>,
}

impl YouTubeCaptions {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CaptionError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("captran/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.8")
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to send request to {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: format!("GET {} failed", url),
            });
        }
        Ok(body)
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl CaptionSource for YouTubeCaptions {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, CaptionError> {
        let url = format!("{}/watch?v={}", self.base_url, video_id);
        let page = self.get_text(&url).await?;

        let tracks = parse_caption_tracks(&page)?;
        if tracks.is_empty() {
            warn!("Watch page for {} lists no caption tracks", video_id);
        }
        Ok(tracks)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<CaptionEntry>, CaptionError> {
        let url = self.absolute_url(&track.base_url);
        let body = self.get_text(&url).await?;
        let entries = parse_timed_text(&body);
        debug!("Fetched {} caption entries for '{}'", entries.len(), track.language_code);
        Ok(entries)
    }
}

/// Extract the caption track list from a watch page
///
/// A page without a track list yields no tracks; a malformed list is an error.
pub fn parse_caption_tracks(page: &str) -> Result<Vec<CaptionTrack>, ProviderError> {
    let Some(json) = extract_json_array(page, CAPTION_TRACKS_MARKER) else {
        return Ok(Vec::new());
    };

    let raw: Vec<RawTrack> = serde_json::from_str(json)
        .map_err(|e| ProviderError::ParseError(format!("Invalid caption track list: {}", e)))?;

    Ok(raw
        .into_iter()
        .map(|track| CaptionTrack {
            name: track
                .name
                .as_ref()
                .and_then(track_name)
                .unwrap_or_else(|| track.language_code.clone()),
            is_generated: track.kind.as_deref() == Some("asr"),
            language_code: track.language_code,
            base_url: track.base_url,
        })
        .collect())
}

/// Track names come either as `{"simpleText": ..}` or as `{"runs": [{"text": ..}]}`
fn track_name(name: &Value) -> Option<String> {
    if let Some(text) = name.get("simpleText").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    let runs = name.get("runs")?.as_array()?;
    let text: String = runs
        .iter()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

/// Slice out the JSON array that follows `marker`, honoring nesting and strings
fn extract_json_array<'a>(source: &'a str, marker: &str) -> Option<&'a str> {
    let after_marker = source.find(marker)? + marker.len();
    let start = after_marker + source[after_marker..].find('[')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in source[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&source[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a timed-text XML document into caption entries
pub fn parse_timed_text(xml: &str) -> Vec<CaptionEntry> {
    TEXT_ELEMENT
        .captures_iter(xml)
        .map(|caps| {
            let raw = caps.get(3).map_or("", |m| m.as_str());
            // Text is escaped twice: once by the XML and once inside it
            let text = unescape_entities(&unescape_entities(raw));
            CaptionEntry {
                text: INLINE_TAG.replace_all(&text, "").into_owned(),
                start_secs: parse_secs(caps.get(1).map(|m| m.as_str())),
                duration_secs: parse_secs(caps.get(2).map(|m| m.as_str())),
            }
        })
        .collect()
}

fn parse_secs(value: Option<&str>) -> f64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0.0)
}

/// Decode one level of XML/HTML character references
pub fn unescape_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => {
                    let number = &entity[1..];
                    let code = match number.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => number.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
