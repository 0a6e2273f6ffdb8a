//! Tests for ModelRequestExecutor's immediate-then-queued strategy.

mod test_utils;

use pitchkit_config::PollingConfig;
use pitchkit_core::GenerationMode;
use pitchkit_error::UpstreamErrorKind;
use pitchkit_models::ModelRequestExecutor;
use serde_json::json;
use std::sync::Arc;
use test_utils::{MockMediaBackend, MockReply, MockStatus, image_output};

const MODEL: &str = "fal-ai/flux/schnell";

fn executor(mock: &Arc<MockMediaBackend>) -> ModelRequestExecutor {
    let polling = PollingConfig::default()
        .with_interval_ms(1000)
        .with_timeout_secs(30);
    ModelRequestExecutor::new(mock.clone(), polling)
}

#[tokio::test]
async fn test_immediate_success_never_queues() -> anyhow::Result<()> {
    let output = image_output("https://cdn/a.png");
    let mock = Arc::new(MockMediaBackend::new_success(output.clone()));

    let result = executor(&mock).execute(MODEL, &json!({"prompt": "anvil"})).await?;

    assert_eq!(result.data(), &output);
    assert_eq!(*result.mode(), GenerationMode::Immediate);
    assert_eq!(mock.request_calls(), 1);
    assert_eq!(mock.submit_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_not_found_falls_back_to_queue() -> anyhow::Result<()> {
    let output = image_output("https://cdn/queued.png");
    let mock = Arc::new(MockMediaBackend::scripted(
        vec![MockReply::Http(404)],
        vec![MockReply::Output(output.clone())],
    ));

    let result = executor(&mock).execute(MODEL, &json!({"prompt": "anvil"})).await?;

    assert_eq!(result.data(), &output);
    assert_eq!(*result.mode(), GenerationMode::Queued);
    assert_eq!(mock.request_calls(), 1);
    assert_eq!(mock.submit_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_server_error_also_falls_back() -> anyhow::Result<()> {
    let output = image_output("https://cdn/queued.png");
    let mock = Arc::new(MockMediaBackend::scripted(
        vec![MockReply::Http(500)],
        vec![MockReply::Output(output.clone())],
    ));

    let result = executor(&mock).execute(MODEL, &json!({})).await?;

    assert_eq!(*result.mode(), GenerationMode::Queued);
    assert_eq!(mock.submit_calls(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_queued_handle_is_polled_to_completion() -> anyhow::Result<()> {
    let output = json!({"video": {"url": "https://cdn/clip.mp4"}});
    let mock = Arc::new(
        MockMediaBackend::scripted(vec![MockReply::Http(404)], vec![MockReply::Pending])
            .with_statuses(vec![
                MockStatus::Pending,
                MockStatus::Completed(Some(output.clone())),
            ]),
    );

    let result = executor(&mock).execute(MODEL, &json!({})).await?;

    assert_eq!(result.data(), &output);
    assert_eq!(result.request_id().as_deref(), Some("req-1"));
    assert_eq!(*result.mode(), GenerationMode::Queued);
    assert_eq!(mock.status_calls(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_immediate_handle_is_polled_without_queueing() -> anyhow::Result<()> {
    let output = image_output("https://cdn/b.png");
    let mock = Arc::new(
        MockMediaBackend::scripted(vec![MockReply::Pending], vec![MockReply::Empty])
            .with_statuses(vec![MockStatus::Completed(Some(output.clone()))]),
    );

    let result = executor(&mock).execute(MODEL, &json!({})).await?;

    assert_eq!(result.data(), &output);
    assert_eq!(*result.mode(), GenerationMode::Immediate);
    assert_eq!(mock.submit_calls(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_polling_failure_does_not_fall_back() {
    let mock = Arc::new(
        MockMediaBackend::scripted(vec![MockReply::Pending], vec![MockReply::Output(json!({}))])
            .with_statuses(vec![MockStatus::Failed("nsfw")]),
    );

    let err = executor(&mock).execute(MODEL, &json!({})).await.unwrap_err();

    assert!(matches!(
        err.upstream_kind(),
        Some(UpstreamErrorKind::JobFailed { .. })
    ));
    assert_eq!(mock.submit_calls(), 0);
}

#[tokio::test]
async fn test_empty_immediate_output_falls_back() -> anyhow::Result<()> {
    let output = image_output("https://cdn/c.png");
    let mock = Arc::new(MockMediaBackend::scripted(
        vec![MockReply::Empty],
        vec![MockReply::Output(output.clone())],
    ));

    let result = executor(&mock).execute(MODEL, &json!({})).await?;

    assert_eq!(*result.mode(), GenerationMode::Queued);
    assert_eq!(result.data(), &output);
    Ok(())
}

#[tokio::test]
async fn test_queued_without_output_is_hard_failure() {
    let mock = Arc::new(MockMediaBackend::scripted(
        vec![MockReply::Http(404)],
        vec![MockReply::Empty],
    ));

    let err = executor(&mock).execute(MODEL, &json!({})).await.unwrap_err();

    assert_eq!(
        err.upstream_kind(),
        Some(&UpstreamErrorKind::MissingOutput(MODEL.to_string()))
    );
    assert_eq!(mock.submit_calls(), 1);
}

#[tokio::test]
async fn test_queue_error_is_surfaced() {
    let mock = Arc::new(MockMediaBackend::scripted(
        vec![MockReply::Http(404)],
        vec![MockReply::Http(422)],
    ));

    let err = executor(&mock).execute(MODEL, &json!({})).await.unwrap_err();

    assert!(matches!(
        err.upstream_kind(),
        Some(UpstreamErrorKind::HttpStatus { status_code: 422, .. })
    ));
}
