/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds, uppercasing the text
 * - `MockProvider::intermittent(n)` - Fails every Nth translate call
 * - `MockProvider::failing()` - Always fails with a retryable error
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Always fails with an authentication error
    Unauthorized,
    /// Returns empty response
    Empty,
    /// Simulates slow response (for timeout and ordering tests)
    Slow { delay_ms: u64 },
    /// Panics inside translate
    Panicking,
}

/// Detection mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockDetection {
    /// Always report this language
    Fixed(String),
    /// Detection always errors
    Failing,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// What `detect_language` reports
    detection: MockDetection,
    /// Translate call counter, shared across clones
    translate_calls: Arc<AtomicUsize>,
    /// Detect call counter, shared across clones
    detect_calls: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str, &str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            detection: MockDetection::Fixed("en".to_string()),
            translate_calls: Arc::new(AtomicUsize::new(0)),
            detect_calls: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that sleeps before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Report a fixed language from `detect_language`
    pub fn detecting(mut self, language: impl Into<String>) -> Self {
        self.detection = MockDetection::Fixed(language.into());
        self
    }

    /// Make `detect_language` always fail
    pub fn with_failing_detection(mut self) -> Self {
        self.detection = MockDetection::Failing;
        self
    }

    /// Set a custom response generator, called with `(text, target_language)`
    pub fn with_custom_response(mut self, generator: fn(&str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of translate calls made so far
    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    /// Number of detect calls made so far
    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    fn render(&self, text: &str, target_language: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(text, target_language),
            None => text.to_uppercase(),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            detection: self.detection.clone(),
            translate_calls: Arc::clone(&self.translate_calls),
            detect_calls: Arc::clone(&self.detect_calls),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn detect_language(&self, _text: &str) -> Result<String, ProviderError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);

        match &self.detection {
            MockDetection::Fixed(language) => Ok(language.clone()),
            MockDetection::Failing => Err(ProviderError::ConnectionError(
                "Simulated detection failure".to_string(),
            )),
        }
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let count = self.translate_calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => Ok(self.render(text, target_language)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure on request {}", count + 1),
                    })
                } else {
                    Ok(self.render(text, target_language))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid credentials".to_string(),
            )),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.render(text, target_language))
            }

            MockBehavior::Panicking => panic!("Simulated provider panic"),
        }
    }
}
