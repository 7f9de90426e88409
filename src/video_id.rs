use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::errors::CaptionError;

// @module: Video reference parsing

// @const: Canonical 11-character video id
static BARE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("bare id regex is valid")
});

// @const: Characters allowed in an id taken from a URL
static URL_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("url id regex is valid")
});

fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com" || host == "youtu.be" || host.ends_with(".youtube.com")
}

/// Extract a video id from a watch/embed/shorts/short-link URL or a bare id
pub fn extract_video_id(input: &str) -> Result<String, CaptionError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CaptionError::InvalidInput("empty video reference".to_string()));
    }

    if BARE_ID.is_match(input) {
        return Ok(input.to_string());
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| CaptionError::InvalidInput(format!("'{}' is not a URL: {}", input, e)))?;

    let host = url
        .host_str()
        .filter(|host| is_youtube_host(host))
        .ok_or_else(|| CaptionError::InvalidInput(format!("'{}' is not a YouTube URL", input)))?;

    let candidate = if host.eq_ignore_ascii_case("youtu.be") {
        url.path_segments().and_then(|mut segments| segments.next()).map(str::to_string)
    } else if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        Some(id.into_owned())
    } else {
        let mut segments = url.path_segments().into_iter().flatten();
        match (segments.next(), segments.next()) {
            (Some("embed" | "shorts" | "live" | "v"), Some(id)) => Some(id.to_string()),
            _ => None,
        }
    };

    candidate
        .map(|id| id.trim().to_string())
        .filter(|id| URL_ID.is_match(id))
        .ok_or_else(|| CaptionError::InvalidInput(format!("no video id in '{}'", input)))
}
