//! Integration tests for the generation pipeline: validation, caching,
//! retries, failure classification and cancellation.

use integrations_gemini_media::mocks::{MockHttpTransport, RecordingMetricsRecorder};
use integrations_gemini_media::observability::MediaMetrics;
use integrations_gemini_media::transport::{HttpMethod, TransportError};
use integrations_gemini_media::types::{
    GenerationParams, ImageRequest, Locale, MediaKind, ReferenceImage, TextRequest,
};
use integrations_gemini_media::{
    CancellationToken, ErrorKind, GeminiMediaClient, GenerationError, MediaClient,
};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const PNG_BASE64: &str = "iVBORw0KGgo=";

fn client(transport: &MockHttpTransport) -> GeminiMediaClient {
    GeminiMediaClient::builder()
        .api_key(SecretString::new("test-key".into()))
        .transport(Arc::new(transport.clone()))
        .build()
        .unwrap()
}

fn client_with_metrics(transport: &MockHttpTransport) -> (GeminiMediaClient, Arc<RecordingMetricsRecorder>) {
    let recorder = Arc::new(RecordingMetricsRecorder::new());
    let client = GeminiMediaClient::builder()
        .api_key(SecretString::new("test-key".into()))
        .transport(Arc::new(transport.clone()))
        .metrics(MediaMetrics::new("gemini_media", recorder.clone()))
        .build()
        .unwrap();
    (client, recorder)
}

fn image_response() -> String {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    {"text": "Here is a red bicycle on a beach."},
                    {"inlineData": {"mimeType": "image/png", "data": PNG_BASE64}}
                ]
            },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 8, "candidatesTokenCount": 1290, "totalTokenCount": 1298},
        "modelVersion": "gemini-2.0-flash-preview-image-generation"
    })
    .to_string()
}

fn text_response(text: &str, finish_reason: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": finish_reason
        }]
    })
    .to_string()
}

fn error_body(code: u16, message: &str, status: &str) -> String {
    json!({"error": {"code": code, "message": message, "status": status}}).to_string()
}

#[tokio::test]
async fn test_short_prompt_never_reaches_transport() {
    let transport = MockHttpTransport::new();
    let client = client(&transport);

    let error = client.generate_image("cat").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InvalidInput);
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_out_of_range_params_never_reach_transport() {
    let transport = MockHttpTransport::new();
    let client = client(&transport);

    let request = TextRequest::new("Describe a lamp", Locale::En)
        .with_params(GenerationParams::default().with_temperature(3.0));
    let error = client.generate(request).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InvalidInput);
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_identical_prompt_is_served_from_cache() {
    let transport = MockHttpTransport::new();
    transport.enqueue_json_response(200, &image_response());
    let (client, recorder) = client_with_metrics(&transport);

    let first = client.generate_image("A red bicycle on a beach").await.unwrap();
    let second = client.generate_image("  a red BICYCLE on a beach ").await.unwrap();

    transport.verify_request_count(1);
    assert_eq!(first.bytes(), second.bytes());
    assert_eq!(first.mime_type(), Some("image/png"));
    assert_ne!(first.url(), second.url());
    assert_eq!(client.service().cache(MediaKind::Image).len(), 1);
    assert_eq!(recorder.counter("gemini_media_cache_misses_total"), 1);
    assert_eq!(recorder.counter("gemini_media_cache_hits_total"), 1);
    assert_eq!(recorder.counter("gemini_media_generations_total"), 2);
}

#[tokio::test]
async fn test_cache_hit_leaves_quota_untouched() {
    let transport = MockHttpTransport::new();
    transport.enqueue_json_response(200, &image_response());
    let client = client(&transport);

    client.generate_image("A red bicycle on a beach").await.unwrap();
    let after_first = client.rate_limits(MediaKind::Image);
    client.generate_image("A red bicycle on a beach").await.unwrap();
    let after_second = client.rate_limits(MediaKind::Image);

    let display = client.rate_limit_display(MediaKind::Image);
    assert_eq!(after_first.remaining_requests, display.requests_per_day - 1);
    assert_eq!(after_first.remaining_tokens, display.tokens_per_minute - 500);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_request_targets_model_endpoint_with_key() {
    let transport = MockHttpTransport::new();
    transport.enqueue_json_response(200, &image_response());
    let client = client(&transport);

    client.generate_image("A red bicycle on a beach").await.unwrap();

    transport.verify_request(
        0,
        HttpMethod::Post,
        "/v1beta/models/gemini-2.0-flash-preview-image-generation:generateContent",
    );
    assert!(transport.last_request().unwrap().url.contains("key=test-key"));

    let body = transport.request_json(0).unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "A red bicycle on a beach");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    assert_eq!(body["generationConfig"]["responseModalities"], json!(["TEXT", "IMAGE"]));

    let safety = body["safetySettings"].as_array().unwrap();
    assert_eq!(safety.len(), 4);
    assert!(safety.iter().all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
}

#[tokio::test]
async fn test_edit_sends_reference_and_has_its_own_cache_entry() {
    let transport = MockHttpTransport::new();
    transport.enqueue_json_response(200, &image_response());
    transport.enqueue_json_response(200, &image_response());
    let client = client(&transport);

    client.generate_image("Make the bicycle blue").await.unwrap();
    let edited = client
        .edit_image(
            "Make the bicycle blue",
            ReferenceImage::new("image/png", b"reference".to_vec()),
        )
        .await
        .unwrap();

    transport.verify_request_count(2);
    assert!(edited.bytes().is_some());

    let body = transport.request_json(1).unwrap();
    let reference = &body["contents"][0]["parts"][1]["inlineData"];
    assert_eq!(reference["mimeType"], "image/png");
    assert_eq!(reference["data"], "cmVmZXJlbmNl");
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_twice_then_success() {
    let transport = MockHttpTransport::new();
    let limited = error_body(429, "Resource has been exhausted", "RESOURCE_EXHAUSTED");
    transport.enqueue_json_response(429, &limited);
    transport.enqueue_json_response(429, &limited);
    transport.enqueue_json_response(200, &image_response());
    let (client, recorder) = client_with_metrics(&transport);

    let start = Instant::now();
    let image = client.generate_image("A red bicycle on a beach").await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(3));
    assert!(image.bytes().is_some());
    transport.verify_request_count(3);
    assert_eq!(client.rate_limited_count(MediaKind::Image), 2);
    assert_eq!(recorder.counter("gemini_media_retries_total"), 2);
    assert_eq!(recorder.counter("gemini_media_rate_limits_total"), 2);
    assert_eq!(client.service().cache(MediaKind::Image).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_retries_are_bounded() {
    let transport = MockHttpTransport::new();
    for _ in 0..4 {
        transport.enqueue_json_response_with_headers(429, "{}", &[("retry-after", "30")]);
    }
    let client = client(&transport);

    let start = Instant::now();
    let error = client.generate_image("A red bicycle on a beach").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::RateLimited);
    assert_eq!(error.retry_after(), Some(Duration::from_secs(30)));
    // The hint is reported but the backoff stays 1 s + 2 s.
    assert!(start.elapsed() < Duration::from_secs(4));
    transport.verify_request_count(3);
    assert_eq!(client.rate_limited_count(MediaKind::Image), 3);
    assert_eq!(client.rate_limits(MediaKind::Image).remaining_requests, 0);
    assert!(client.service().cache(MediaKind::Image).is_empty());
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let transport = MockHttpTransport::new();
    transport.enqueue_json_response(403, &error_body(403, "Permission denied", "PERMISSION_DENIED"));
    transport.enqueue_json_response(200, &image_response());
    let client = client(&transport);

    let error = client.generate_image("A red bicycle on a beach").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Forbidden);
    assert!(error.to_string().contains("Permission denied"));
    transport.verify_request_count(1);
    assert_eq!(transport.pending_responses(), 1);
}

#[tokio::test]
async fn test_status_codes_map_to_kinds() {
    let cases = [
        (400, ErrorKind::InvalidInput),
        (401, ErrorKind::Unauthorized),
        (403, ErrorKind::Forbidden),
        (500, ErrorKind::ServerError),
        (502, ErrorKind::Unknown),
        (503, ErrorKind::Unknown),
    ];

    for (status, kind) in cases {
        let transport = MockHttpTransport::new();
        transport.enqueue_json_response(status, &error_body(status, "failure", "STATUS"));
        let client = client(&transport);

        let error = client
            .generate(TextRequest::new("Describe a lamp", Locale::En))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), kind, "HTTP {status}");
        transport.verify_request_count(1);
    }
}

#[tokio::test]
async fn test_transport_failure_is_classified() {
    let transport = MockHttpTransport::new();
    transport.enqueue_error(TransportError::Timeout);
    let client = client(&transport);

    let error = client.generate_image("A red bicycle on a beach").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert_eq!(error.user_message(), ErrorKind::Transport.message());
    transport.verify_request_count(1);
}

#[tokio::test]
async fn test_non_stop_finish_reason_is_not_retried_or_cached() {
    let transport = MockHttpTransport::new();
    transport.enqueue_json_response(200, &text_response("", "SAFETY"));
    let client = client(&transport);

    let error = client
        .generate(TextRequest::new("Describe a lamp", Locale::En))
        .await
        .unwrap_err();

    assert_eq!(error, GenerationError::Stopped { reason: "SAFETY".to_string() });
    assert_eq!(error.kind(), ErrorKind::Unknown);
    assert!(error.user_message().contains("SAFETY"));
    transport.verify_request_count(1);
    assert!(client.service().cache(MediaKind::Text).is_empty());
}

#[tokio::test]
async fn test_malformed_successes() {
    let bodies = [
        "not json".to_string(),
        json!({"candidates": []}).to_string(),
        text_response("no picture, sorry", "STOP"),
        json!({"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "@@@"}}]}, "finishReason": "STOP"}]})
            .to_string(),
        json!({"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}]}}]})
            .to_string(),
    ];

    for body in bodies {
        let transport = MockHttpTransport::new();
        transport.enqueue_json_response(200, &body);
        let client = client(&transport);

        let error = client.generate_image("A red bicycle on a beach").await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::MalformedResponse, "{body}");
        transport.verify_request_count(1);
        assert_eq!(client.resources().live_count(), 0);
        assert!(client.service().cache(MediaKind::Image).is_empty(), "{body}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_request_leaves_state_untouched() {
    let transport = MockHttpTransport::new();
    transport.enqueue_delayed_response(
        Duration::from_secs(5),
        Ok(integrations_gemini_media::HttpResponse {
            status: 200,
            headers: Default::default(),
            body: image_response().into(),
        }),
    );
    let client = client(&transport);
    let token = CancellationToken::new();

    let (result, ()) = tokio::join!(
        client.generate_with_cancel(ImageRequest::new("A red bicycle on a beach"), &token),
        async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        }
    );

    assert_eq!(result.unwrap_err(), GenerationError::Cancelled);
    assert!(client.service().cache(MediaKind::Image).is_empty());
    let display = client.rate_limit_display(MediaKind::Image);
    assert_eq!(client.rate_limits(MediaKind::Image).remaining_requests, display.requests_per_day);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_stops_retrying() {
    let transport = MockHttpTransport::new();
    transport.enqueue_json_response(429, "{}");
    transport.enqueue_json_response(200, &image_response());
    let client = client(&transport);
    let token = CancellationToken::new();

    let (result, ()) = tokio::join!(
        client.generate_with_cancel(ImageRequest::new("A red bicycle on a beach"), &token),
        async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            token.cancel();
        }
    );

    assert_eq!(result.unwrap_err(), GenerationError::Cancelled);
    transport.verify_request_count(1);
    assert_eq!(transport.pending_responses(), 1);
    assert_eq!(client.rate_limited_count(MediaKind::Image), 1);
    assert!(client.service().cache(MediaKind::Image).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_identical_prompts_are_not_coalesced() {
    let transport = MockHttpTransport::new();
    for _ in 0..2 {
        transport.enqueue_delayed_response(
            Duration::from_millis(100),
            Ok(integrations_gemini_media::HttpResponse {
                status: 200,
                headers: Default::default(),
                body: image_response().into(),
            }),
        );
    }
    let client = client(&transport);

    let results = futures::future::join_all(
        (0..2).map(|_| client.generate(ImageRequest::new("A red bicycle on a beach"))),
    )
    .await;

    assert!(results.iter().all(Result::is_ok));
    transport.verify_request_count(2);
    assert_eq!(client.service().cache(MediaKind::Image).len(), 1);
}
