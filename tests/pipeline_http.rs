use std::sync::Arc;
use std::time::Duration;

use briefly::{
    HfInferenceClient, InferenceConfig, PipelineOptions, SummarizePipeline, SummaryFailure,
    SummaryOutcome, WordChunker,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "facebook/bart-large-cnn";
const TEXT: &str = "alpha beta gamma delta epsilon";

/// Helper to build a pipeline against a mock endpoint, three words per chunk
fn make_pipeline(server: &MockServer, timeout: Duration) -> SummarizePipeline {
    let config = InferenceConfig {
        api_key: Some("hf_test".to_string()),
        model: MODEL.to_string(),
        api_base: server.uri(),
        timeout,
        max_attempts: 3,
        retry_delay: Duration::ZERO,
    };
    let client = HfInferenceClient::from_config(&config).expect("client should build");
    SummarizePipeline::new(
        Box::new(WordChunker::new(3).expect("valid window")),
        Arc::new(client),
        PipelineOptions::default(),
    )
}

fn summary_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([{ "summary_text": text }]))
}

#[tokio::test]
async fn test_chunks_are_summarized_then_condensed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}", MODEL)))
        .and(body_string_contains("alpha beta gamma"))
        .respond_with(summary_response("S1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("delta epsilon"))
        .respond_with(summary_response("S2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("\"inputs\":\"S1 S2\""))
        .and(body_string_contains("\"min_length\":30"))
        .respond_with(summary_response("Both."))
        .expect(1)
        .mount(&server)
        .await;

    let report = make_pipeline(&server, Duration::from_secs(5))
        .run(TEXT)
        .await
        .expect("pipeline should run");

    assert_eq!(report.combined, "S1 S2");
    assert_eq!(report.condensed.as_deref(), Some("Both."));
    assert!(!report.partial);
}

#[tokio::test]
async fn test_endpoint_error_on_one_chunk_skips_condensation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("alpha beta gamma"))
        .respond_with(summary_response("S1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("delta epsilon"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .expect(1)
        .mount(&server)
        .await;

    let report = make_pipeline(&server, Duration::from_secs(5))
        .run(TEXT)
        .await
        .expect("pipeline should run");

    assert!(report.partial);
    assert!(report.condensed.is_none());
    assert_eq!(report.combined, "S1 ⚠️ HF error 429: rate limited");
    assert_eq!(
        report.chunks[1].outcome,
        SummaryOutcome::failure(SummaryFailure::Endpoint {
            status: 429,
            body: "rate limited".to_string(),
        })
    );

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 2, "no retry and no condensation call expected");
}

#[tokio::test]
async fn test_transport_failures_degrade_per_chunk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(summary_response("too late").set_delay(Duration::from_secs(3)))
        .expect(6)
        .mount(&server)
        .await;

    let report = make_pipeline(&server, Duration::from_millis(200))
        .run(TEXT)
        .await
        .expect("transport failures must not abort the run");

    assert_eq!(report.chunks.len(), 2);
    assert!(report.partial);
    assert_eq!(report.failed_chunks(), 2);
    for chunk in &report.chunks {
        match chunk.outcome.failure_reason() {
            Some(SummaryFailure::Transport { attempts, .. }) => assert_eq!(*attempts, 3),
            other => panic!("expected transport failure, got {:?}", other),
        }
    }
    assert_eq!(report.combined.matches("⚠️ Network error").count(), 2);
}

#[tokio::test]
async fn test_malformed_success_body_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "Model is loading" })))
        .expect(2)
        .mount(&server)
        .await;

    let report = make_pipeline(&server, Duration::from_secs(5))
        .run(TEXT)
        .await
        .expect("pipeline should run");

    assert!(report.partial);
    assert!(report
        .combined
        .starts_with("⚠️ Unexpected HF response: {\"error\":\"Model is loading\"}"));
}
