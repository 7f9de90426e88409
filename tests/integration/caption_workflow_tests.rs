/*!
 * End-to-end tests from a video reference to translated caption text.
 *
 * The controller runs against an in-memory caption source and the mock
 * provider, so no network access is needed.
 */

use std::sync::Arc;

use captran::{Controller, JsonReport};
use captran::app_controller::build_provider;
use captran::errors::CaptionError;
use captran::providers::mock::MockProvider;
use captran::translation::{ChunkEvent, EventLog};

use crate::common::{self, StubCaptions, track};

const VIDEO_ID: &str = "dQw4w9WgXcQ";

fn english_video() -> StubCaptions {
    StubCaptions::new()
        .with_track(VIDEO_ID, track("en", true), &["[Music]", "we're no strangers", "to love ."])
        .with_track(VIDEO_ID, track("en", false), &["We're no strangers\nto love.", "  ", "You know the rules!"])
}

#[tokio::test]
async fn test_run_withEnglishCaptions_shouldTranslateIntoTarget() {
    common::init_test_logging();
    let provider = MockProvider::working();
    let controller = Controller::with_components(
        common::test_config(),
        Arc::new(english_video()),
        Arc::new(provider.clone()),
    );

    let result = controller
        .run(&format!("https://www.youtube.com/watch?v={}&t=5s", VIDEO_ID), true)
        .await
        .unwrap();

    assert_eq!(result.video_id, VIDEO_ID);
    assert_eq!(result.language_code, "en");
    assert!(!result.is_generated);
    assert_eq!(result.target_language, "ko");
    assert_eq!(result.original, "We're no strangers to love. You know the rules!");
    assert_eq!(result.translated, "WE'RE NO STRANGERS TO LOVE. YOU KNOW THE RULES!");
    assert!(result.was_translated);
    assert_eq!(result.untranslated_chunks(), 0);
    assert_eq!(provider.translate_calls(), result.chunks.len());
}

#[tokio::test]
async fn test_run_withTargetLanguageTrack_shouldNotTranslate() {
    let provider = MockProvider::working();
    let source = english_video().with_track(VIDEO_ID, track("ko", true), &["이미 한국어입니다."]);
    let controller = Controller::with_components(common::test_config(), Arc::new(source), Arc::new(provider.clone()));

    let result = controller.run(VIDEO_ID, true).await.unwrap();

    assert_eq!(result.language_code, "ko");
    assert!(!result.was_translated);
    assert_eq!(result.translated, "이미 한국어입니다.");
    assert_eq!(result.translated, result.original);
    assert_eq!(provider.detect_calls(), 0);
    assert_eq!(provider.translate_calls(), 0);
}

#[tokio::test]
async fn test_run_withTranslationDisabled_shouldReturnCleanOriginal() {
    let provider = MockProvider::working();
    let controller = Controller::with_components(
        common::test_config(),
        Arc::new(english_video()),
        Arc::new(provider.clone()),
    );

    let result = controller.run(&format!("https://youtu.be/{}", VIDEO_ID), false).await.unwrap();

    assert!(!result.was_translated);
    assert_eq!(result.translated, result.original);
    assert!(result.chunks.is_empty());
    assert_eq!(provider.translate_calls(), 0);
}

#[tokio::test]
async fn test_run_withFailingProvider_shouldDegradeToOriginal() {
    let events = Arc::new(EventLog::new());
    let controller = Controller::with_components(
        common::test_config(),
        Arc::new(english_video()),
        Arc::new(MockProvider::failing()),
    )
    .with_observer(events.clone());

    let result = controller.run(VIDEO_ID, true).await.unwrap();

    assert!(result.was_translated);
    assert_eq!(result.translated, result.original);
    assert_eq!(result.untranslated_chunks(), result.chunks.len());
    assert_eq!(
        events.count(|e| matches!(e, ChunkEvent::AttemptFailed { .. })),
        result.chunks.len() * 3
    );
}

#[tokio::test]
async fn test_run_withInvalidReference_shouldFailWithInputError() {
    let controller = Controller::with_components(
        common::test_config(),
        Arc::new(english_video()),
        Arc::new(MockProvider::working()),
    );

    let error = controller.run("https://vimeo.com/123456", true).await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<CaptionError>(),
        Some(CaptionError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_run_withVideoWithoutCaptions_shouldFailWithNoCaptions() {
    let controller = Controller::with_components(
        common::test_config(),
        Arc::new(StubCaptions::new().with_video(VIDEO_ID)),
        Arc::new(MockProvider::working()),
    );

    let error = controller.run(VIDEO_ID, true).await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<CaptionError>(),
        Some(CaptionError::NoCaptions { .. })
    ));
    assert!(format!("{:#}", error).contains(VIDEO_ID));
}

#[tokio::test]
async fn test_planned_chunks_shouldMatchPipelineChunkCount() {
    let mut config = common::test_config();
    config.translation.max_chunk_chars = 60;
    let controller = Controller::with_components(
        config,
        Arc::new(StubCaptions::new()),
        Arc::new(MockProvider::working()),
    );
    let text = common::numbered_sentences(7);

    let report = controller.translate_text(&text).await.unwrap();

    assert_eq!(controller.planned_chunks(&text), report.chunks.len());
    assert_eq!(report.text, text.to_uppercase());
}

#[test]
fn test_with_config_withInvalidConfig_shouldFail() {
    let mut config = common::test_config();
    config.translation.concurrent_requests = 0;
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_build_provider_withMockSetting_shouldReturnMock() {
    let provider = build_provider(&common::test_config().translation).unwrap();
    assert_eq!(provider.name(), "mock");
}

#[test]
fn test_caption_translation_shouldSerializeForJsonOutput() {
    let result = tokio_test::block_on(
        Controller::with_components(
            common::test_config(),
            Arc::new(english_video()),
            Arc::new(MockProvider::working()),
        )
        .run(VIDEO_ID, false),
    )
    .unwrap();

    let json = serde_json::to_value(JsonReport::success(&result)).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["video_id"], VIDEO_ID);
    assert!(json.get("error").is_none());
    assert_eq!(json["was_translated"], false);
    assert_eq!(json["original"], json["translated"]);
}

#[tokio::test]
async fn test_json_report_forTextPipeline_shouldCarrySuccessFlag() {
    let controller = Controller::with_components(
        common::test_config(),
        Arc::new(StubCaptions::new()),
        Arc::new(MockProvider::working()),
    );
    let report = controller.translate_text("Plain text input.").await.unwrap();

    let json = serde_json::to_value(JsonReport::success(&report)).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["text"], "PLAIN TEXT INPUT.");
    assert_eq!(json["chunks"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_json_report_forFailure_shouldCarryErrorChainOnly() {
    let controller = Controller::with_components(
        common::test_config(),
        Arc::new(StubCaptions::new().with_video(VIDEO_ID)),
        Arc::new(MockProvider::working()),
    );
    let error = controller.run(VIDEO_ID, true).await.unwrap_err();

    let json = serde_json::to_value(JsonReport::<()>::failure(&error)).unwrap();

    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains(VIDEO_ID));
    assert!(json.get("original").is_none());
}
