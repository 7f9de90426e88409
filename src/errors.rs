/*!
 * Error types for the captran application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to a translation or detection provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether another attempt with the same input may succeed.
    ///
    /// Authentication failures and client-side API errors (4xx other than 429)
    /// will fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::AuthenticationError(_) => false,
            Self::ApiError { status_code, .. } => {
                *status_code == 429 || !(400..500).contains(status_code)
            }
            _ => true,
        }
    }
}

/// Errors raised while locating or fetching captions
#[derive(Error, Debug)]
pub enum CaptionError {
    /// The video URL or id could not be understood
    #[error("Invalid video reference: {0}")]
    InvalidInput(String),

    /// The video has no caption track of any kind
    #[error("No captions available for video {video_id}")]
    NoCaptions {
        /// Video the lookup was made for
        video_id: String,
    },

    /// A track was found but contained no usable text
    #[error("Caption track for video {video_id} contains no text")]
    EmptyTranscript {
        /// Video the track belongs to
        video_id: String,
    },

    /// Transport or parsing failure in the caption provider
    #[error("Caption provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Errors surfaced by the translation pipeline as a whole
///
/// Per-chunk failures never appear here; they degrade to the original text.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The pipeline did not finish within its deadline
    #[error("Translation timed out after {limit:?}")]
    Timeout {
        /// Configured deadline
        limit: Duration,
    },
}
