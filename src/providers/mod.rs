/*!
 * Provider implementations for language detection and translation.
 *
 * This module contains client implementations for the services the pipeline
 * talks to:
 * - Google: public web translate endpoint
 * - Mock: in-process stub with configurable failure modes
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// The pipeline only ever holds an `Arc<dyn Provider>`, so providers can be
/// swapped for stubs without any global state.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Detect the language of a piece of text
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - A language code such as `en` or `zh-CN`
    async fn detect_language(&self, text: &str) -> Result<String, ProviderError>;

    /// Translate text into the target language
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `target_language` - Target language code
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError>;
}

pub mod google;
pub mod mock;
