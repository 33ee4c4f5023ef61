//! End-to-end bootstrap against mocked kernel and OpenAI servers
//!
//! Wires the real clients, metadata store and provisioner together the same
//! way the binary does, with wiremock standing in for both upstreams.

use serde_json::{json, Value};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use casestudy_bootstrap::config::{KernelConfig, MetadataConfig, OpenAiConfig, RequestConfig};
use casestudy_bootstrap::kernel::KernelClient;
use casestudy_bootstrap::metadata::{KernelMetadataStore, MetadataParser};
use casestudy_bootstrap::openai::{OpenAiClient, OpenAiProvisioner};
use casestudy_bootstrap::workflow::{
    BootstrapEvent, BootstrapRequest, BootstrapWorkflow, Operation, ProgressReporter,
};

const METADATA_PATH: &str = "sentinel-5p/potato/4/metadata.json";

fn request_config() -> RequestConfig {
    RequestConfig {
        timeout_ms: 5000,
        max_retries: 0,
        retry_delay_ms: 10,
    }
}

fn build_workflow(kernel_uri: &str, openai_uri: &str) -> BootstrapWorkflow {
    let kernel = Arc::new(
        KernelClient::new(
            &KernelConfig {
                api_key: "kernel-key".to_string(),
                base_url: kernel_uri.to_string(),
            },
            request_config(),
        )
        .expect("kernel client"),
    );
    let openai = OpenAiClient::new(
        &OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url: openai_uri.to_string(),
            model: "gpt-4o".to_string(),
        },
        request_config(),
    )
    .expect("openai client");

    let parser = MetadataParser::new(
        MetadataConfig {
            leading_wrapper_lines: 3,
            trailing_wrapper_lines: 2,
            signed_url_ttl_secs: 600,
        },
        kernel.clone(),
    );
    let store = Arc::new(KernelMetadataStore::new(kernel.clone(), parser));
    let provisioner = Arc::new(OpenAiProvisioner::new(openai, kernel.clone(), "gpt-4o"));

    BootstrapWorkflow::new(kernel.clone(), kernel.clone(), store, kernel, provisioner)
}

/// Metadata artifact as the kernel serves it, framing lines included
fn wrapped_metadata() -> String {
    let payload = json!({
        "caseStudy": "sentinel-5p",
        "keyframes": [{
            "timestamp": "2024-03",
            "images": [{ "relativePath": "sentinel-5p/potato/4/no2.png", "kind": "no2" }],
            "data": [{
                "region": "Zurich",
                "parameter": "NO2",
                "meanConcentration": 41.2,
                "unit": "µmol/m²"
            }],
            "dataDescription": "monthly mean"
        }],
        "imageKinds": ["no2"],
        "relativePathsForAgent": [METADATA_PATH]
    });
    format!(
        "--boundary\nContent-Type: application/json\n\n{}\n\n--boundary--\n",
        serde_json::to_string_pretty(&payload).unwrap()
    )
}

async fn mount_metadata(kernel: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/files/download"))
        .and(query_param("relativePath", METADATA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(wrapped_metadata()))
        .mount(kernel)
        .await;

    Mock::given(method("POST"))
        .and(path("/files/signed-url"))
        .and(body_partial_json(json!({
            "relativePath": "sentinel-5p/potato/4/no2.png",
            "expiresInSeconds": 600
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signedUrl": "https://storage.example/no2.png?sig=1"
        })))
        .mount(kernel)
        .await;
}

#[tokio::test]
async fn test_fresh_bootstrap_end_to_end() {
    let kernel = MockServer::start().await;
    let openai = MockServer::start().await;
    mount_metadata(&kernel).await;

    Mock::given(method("GET"))
        .and(path("/research-contexts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&kernel)
        .await;

    Mock::given(method("GET"))
        .and(path("/source-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "f1",
                "name": "metadata.json",
                "relativePath": METADATA_PATH,
                "createdAt": "2024-03-01T10:00:00Z",
                "provider": "minio",
                "type": "remote"
            },
            {
                "id": "f2",
                "name": "no2.png",
                "relativePath": "sentinel-5p/potato/4/no2.png",
                "createdAt": "2024-03-01T10:00:00Z",
                "provider": "minio",
                "type": "remote"
            }
        ])))
        .expect(1)
        .mount(&kernel)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "file-1" })))
        .expect(1)
        .mount(&openai)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/vector_stores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "vs_1" })))
        .expect(1)
        .mount(&openai)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/assistants"))
        .and(body_partial_json(json!({ "name": "sentinel-5p_potato_4" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "asst_1",
            "model": "gpt-4o",
            "tools": [{ "type": "file_search" }]
        })))
        .expect(1)
        .mount(&openai)
        .await;

    Mock::given(method("POST"))
        .and(path("/research-contexts"))
        .and(body_partial_json(json!({
            "agentExternalId": "asst_1",
            "title": "sentinel-5p_potato_4"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "title": "sentinel-5p_potato_4",
            "description": "d",
            "status": "active"
        })))
        .expect(1)
        .mount(&kernel)
        .await;

    Mock::given(method("POST"))
        .and(path("/research-contexts/42/conversations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7,
            "title": "sentinel-5p_potato_4"
        })))
        .expect(1)
        .mount(&kernel)
        .await;

    let workflow = build_workflow(&kernel.uri(), &openai.uri());
    let (reporter, mut rx) = ProgressReporter::channel();

    let success = assert_ok!(
        workflow
            .execute(BootstrapRequest::new("sentinel-5p", "potato", 4), &reporter)
            .await
    );

    assert_eq!(success.research_context.id, 42);
    assert_eq!(success.conversation.id, 7);

    let value: Value = serde_json::to_value(&success).unwrap();
    assert_eq!(
        value["metadata"]["keyframes"][0]["images"][0]["signedUrl"],
        "https://storage.example/no2.png?sig=1"
    );
    assert!(value["metadata"]["expirationTime"].as_i64().unwrap() > 0);

    drop(reporter);
    let mut last = None;
    while let Some(event) = rx.recv().await {
        last = Some(event);
    }
    assert!(matches!(last, Some(BootstrapEvent::Success(_))));
}

#[tokio::test]
async fn test_existing_pair_end_to_end_skips_openai() {
    let kernel = MockServer::start().await;
    let openai = MockServer::start().await;
    mount_metadata(&kernel).await;

    Mock::given(method("GET"))
        .and(path("/research-contexts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 42, "title": "sentinel-5p_potato_4", "description": "d", "status": "active" }
        ])))
        .mount(&kernel)
        .await;

    Mock::given(method("GET"))
        .and(path("/research-contexts/42/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "title": "sentinel-5p_potato_4" }
        ])))
        .mount(&kernel)
        .await;

    Mock::given(method("POST"))
        .and(path("/research-contexts"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&kernel)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&openai)
        .await;

    let workflow = build_workflow(&kernel.uri(), &openai.uri());
    let success = assert_ok!(
        workflow
            .execute(
                BootstrapRequest::new("sentinel-5p", "potato", 4),
                &ProgressReporter::silent(),
            )
            .await
    );

    assert_eq!(success.research_context.id, 42);
    assert_eq!(success.conversation.id, 7);
}

#[tokio::test]
async fn test_signing_failure_aborts_before_provisioning() {
    let kernel = MockServer::start().await;
    let openai = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/research-contexts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&kernel)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string(wrapped_metadata()))
        .mount(&kernel)
        .await;

    Mock::given(method("POST"))
        .and(path("/files/signed-url"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&kernel)
        .await;

    Mock::given(method("GET"))
        .and(path("/source-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&kernel)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&openai)
        .await;

    let workflow = build_workflow(&kernel.uri(), &openai.uri());
    let failure = assert_err!(
        workflow
            .execute(
                BootstrapRequest::new("sentinel-5p", "potato", 4),
                &ProgressReporter::silent(),
            )
            .await
    );

    assert_eq!(failure.operation, Operation::FetchMetadata);
    assert!(failure.context.unwrap_or_default().contains("no2.png"));
}
