use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::Provider;

/// Client for the public Google web translate endpoint
///
/// One endpoint serves both operations: a `sl=auto` request returns the
/// translated segments and the detected source language.
#[derive(Debug)]
pub struct GoogleTranslate {
    /// Base URL of the endpoint, without trailing slash
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Optional rate limit in requests per minute
    rate_limit: Option<u32>,
    /// Start time of the most recent request, for pacing
    last_request: Mutex<Option<Instant>>,
}

/// Decoded body of a `translate_a/single` response
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateResponse {
    /// Concatenated translated segments
    pub text: String,
    /// Source language as detected by the service
    pub detected_language: Option<String>,
}

impl GoogleTranslate {
    /// Create a client with default timeout and no rate limit
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new_with_config(base_url, Duration::from_secs(30), None)
    }

    /// Create a client with explicit timeout and rate limit
    pub fn new_with_config(
        base_url: impl Into<String>,
        timeout: Duration,
        rate_limit: Option<u32>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("captran/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            rate_limit: rate_limit.filter(|limit| *limit > 0),
            last_request: Mutex::new(None),
        })
    }

    /// Wait until the rate limit allows another request
    async fn pace(&self) {
        let Some(rate_limit) = self.rate_limit else {
            return;
        };

        let interval = Duration::from_millis(60_000 / rate_limit as u64);
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Send one `translate_a/single` request
    async fn request(&self, text: &str, target_language: &str) -> Result<TranslateResponse, ProviderError> {
        self.pace().await;

        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to send request to {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            error!("Google translate error ({}): {}", status, truncate(&body, 200));
            return Err(status_error(status, body));
        }

        parse_translate_response(&body)
    }
}

/// Map a non-success status onto the provider error taxonomy
fn status_error(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(truncate(&body, 200)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::AuthenticationError(truncate(&body, 200))
        }
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: truncate(&body, 200),
        },
    }
}

/// Parse the nested-array response format
///
/// `[[["translated", "original", ...], ...], null, "en", ...]`: segments live
/// at `[0][i][0]` and the detected source language at `[2]`.
pub fn parse_translate_response(body: &str) -> Result<TranslateResponse, ProviderError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("Invalid JSON: {}", e)))?;

    let root = value
        .as_array()
        .ok_or_else(|| ProviderError::ParseError("Response is not a JSON array".to_string()))?;

    let text = match root.first() {
        Some(Value::Array(segments)) => segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect::<String>(),
        Some(Value::Null) | None => String::new(),
        Some(other) => {
            return Err(ProviderError::ParseError(format!(
                "Unexpected segment list: {}",
                truncate(&other.to_string(), 100)
            )));
        }
    };

    let detected_language = root
        .get(2)
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(TranslateResponse { text, detected_language })
}

/// Target code in the form the endpoint accepts
///
/// Region-tagged codes (`zh-CN`) pass through; others are reduced to ISO 639-1.
fn endpoint_language_code(code: &str) -> String {
    let code = code.trim();
    if code.contains('-') {
        return code.to_string();
    }
    language_utils::normalize_to_part1_or_part2t(code).unwrap_or_else(|_| code.to_lowercase())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    fn name(&self) -> &str {
        "google"
    }

    async fn detect_language(&self, text: &str) -> Result<String, ProviderError> {
        let response = self.request(text, "en").await?;
        let detected = response
            .detected_language
            .ok_or_else(|| ProviderError::ParseError("Response carries no detected language".to_string()))?;

        debug!("Detected language '{}' for {} chars", detected, text.chars().count());
        Ok(detected)
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let target = endpoint_language_code(target_language);
        let response = self.request(text, &target).await?;
        Ok(response.text)
    }
}
