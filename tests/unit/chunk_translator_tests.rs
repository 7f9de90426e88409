/*!
 * Tests for translating a single chunk
 */

use captran::providers::mock::{MockBehavior, MockProvider};
use captran::translation::{
    ChunkEvent, ChunkOutcome, EventLog, RetryPolicy, chunk, normalize, translate_chunk,
};

fn single_chunk(text: &str) -> captran::translation::Chunk {
    chunk(&normalize(text), 1000).remove(0)
}

#[tokio::test]
async fn test_translate_chunk_withWorkingProvider_shouldTranslateOnFirstAttempt() {
    let provider = MockProvider::working();
    let events = EventLog::new();
    let input = single_chunk("Hello world.");

    let result = translate_chunk(0, &input, "ko", &provider, &RetryPolicy::default(), &events).await;

    assert_eq!(result.text, "HELLO WORLD.");
    assert_eq!(result.outcome, ChunkOutcome::Translated);
    assert_eq!(result.attempts, 1);
    assert_eq!(provider.detect_calls(), 1);
    assert_eq!(
        events.events(),
        vec![ChunkEvent::Completed { index: 0, outcome: ChunkOutcome::Translated, attempts: 1 }]
    );
}

#[tokio::test]
async fn test_translate_chunk_withTargetLanguageDetected_shouldSkipTranslation() {
    let provider = MockProvider::working().detecting("ko");
    let input = single_chunk("안녕하세요.");

    let result = translate_chunk(3, &input, "kor", &provider, &RetryPolicy::default(), &EventLog::new()).await;

    assert_eq!(result.text, "안녕하세요.");
    assert_eq!(result.outcome, ChunkOutcome::Skipped);
    assert_eq!(result.attempts, 0);
    assert_eq!(result.index, 3);
    assert_eq!(provider.translate_calls(), 0);
}

#[tokio::test]
async fn test_translate_chunk_withRegionTaggedDetection_shouldStillSkip() {
    let provider = MockProvider::working().detecting("zh-CN");
    let input = single_chunk("你好。");

    let result = translate_chunk(0, &input, "zh-TW", &provider, &RetryPolicy::default(), &EventLog::new()).await;

    assert_eq!(result.outcome, ChunkOutcome::Skipped);
    assert_eq!(provider.translate_calls(), 0);
}

#[tokio::test]
async fn test_translate_chunk_withFailingProvider_shouldFallBackAfterMaxAttempts() {
    let provider = MockProvider::failing();
    let events = EventLog::new();
    let input = single_chunk("Keep me as I am.");

    let result = translate_chunk(0, &input, "ko", &provider, &RetryPolicy::new(3, 0), &events).await;

    assert_eq!(result.text, "Keep me as I am.");
    assert_eq!(result.outcome, ChunkOutcome::Fallback);
    assert_eq!(result.attempts, 3);
    assert_eq!(provider.translate_calls(), 3);
    assert_eq!(events.count(|e| matches!(e, ChunkEvent::AttemptFailed { .. })), 3);
    assert_eq!(
        events.count(|e| matches!(e, ChunkEvent::Completed { outcome: ChunkOutcome::Fallback, attempts: 3, .. })),
        1
    );
}

#[tokio::test]
async fn test_translate_chunk_withEmptyResponses_shouldRetryThenFallBack() {
    let provider = MockProvider::empty();
    let input = single_chunk("Something to say.");

    let result = translate_chunk(0, &input, "ko", &provider, &RetryPolicy::new(2, 0), &EventLog::new()).await;

    assert_eq!(result.outcome, ChunkOutcome::Fallback);
    assert_eq!(result.text, "Something to say.");
    assert_eq!(provider.translate_calls(), 2);
}

#[tokio::test]
async fn test_translate_chunk_withIntermittentProvider_shouldSucceedOnRetry() {
    // Every second translate call fails
    let provider = MockProvider::intermittent(2).with_custom_response(|text, target| format!("{}:{}", target, text));
    let events = EventLog::new();
    let input = single_chunk("Try again.");

    // Call 0 succeeds with fail_every 2, so burn it on another chunk first
    let _ = translate_chunk(0, &single_chunk("Warm up."), "ko", &provider, &RetryPolicy::new(3, 0), &events).await;
    events.clear();

    let result = translate_chunk(1, &input, "ko", &provider, &RetryPolicy::new(3, 0), &events).await;

    assert_eq!(result.text, "ko:Try again.");
    assert_eq!(result.outcome, ChunkOutcome::Translated);
    assert_eq!(result.attempts, 2);
    assert_eq!(events.count(|e| matches!(e, ChunkEvent::AttemptFailed { attempt: 1, .. })), 1);
}

#[tokio::test]
async fn test_translate_chunk_withUnauthorizedProvider_shouldStopAfterOneAttempt() {
    let provider = MockProvider::new(MockBehavior::Unauthorized);
    let input = single_chunk("Secret text.");

    let result = translate_chunk(0, &input, "ko", &provider, &RetryPolicy::new(5, 0), &EventLog::new()).await;

    assert_eq!(result.outcome, ChunkOutcome::Fallback);
    assert_eq!(result.attempts, 1);
    assert_eq!(provider.translate_calls(), 1);
}

#[tokio::test]
async fn test_translate_chunk_withFailingDetection_shouldStillTranslate() {
    let provider = MockProvider::working().with_failing_detection();
    let events = EventLog::new();
    let input = single_chunk("Detect me.");

    let result = translate_chunk(0, &input, "ko", &provider, &RetryPolicy::default(), &events).await;

    assert_eq!(result.outcome, ChunkOutcome::Translated);
    assert_eq!(result.text, "DETECT ME.");
    assert_eq!(events.count(|e| matches!(e, ChunkEvent::DetectionFailed { index: 0, .. })), 1);
}

#[tokio::test]
async fn test_translate_chunk_withPaddedTranslation_shouldTrimIt() {
    let provider = MockProvider::working().with_custom_response(|text, _| format!("  {}\n", text));
    let input = single_chunk("Trim me.");

    let result = translate_chunk(0, &input, "ko", &provider, &RetryPolicy::default(), &EventLog::new()).await;

    assert_eq!(result.text, "Trim me.");
    assert_eq!(result.outcome, ChunkOutcome::Translated);
}

#[tokio::test]
async fn test_translate_chunk_withBackoff_shouldSleepBetweenAttempts() {
    let provider = MockProvider::failing();
    let input = single_chunk("Slow down.");
    let started = std::time::Instant::now();

    let result = translate_chunk(0, &input, "ko", &provider, &RetryPolicy::new(3, 20), &EventLog::new()).await;

    assert_eq!(result.attempts, 3);
    // 20ms after the first failure, 40ms after the second, none after the last
    assert!(started.elapsed() >= std::time::Duration::from_millis(60));
}
