//! End-to-end tests against mock HTTP servers: real page fetching, real
//! transcript fetching, and a real chat-completions exchange.

use breve::agent::{GroqAgent, ModelHandle};
use breve::config::AgentConfig;
use breve::loader::UrlLoader;
use breve::orchestrator::{self, RequestError};
use breve::transcript::TranscriptFetcher;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "llama-3.1-8b-instant";

fn agent_for(server: &MockServer) -> GroqAgent {
    let config = AgentConfig {
        model: MODEL.to_string(),
        api_base: server.uri(),
    };
    GroqAgent::new(&config).unwrap()
}

fn handle() -> ModelHandle {
    ModelHandle::new(MODEL, "gsk_test_key")
}

async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk_test_key"))
        .and(body_partial_json(json!({ "model": MODEL })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn summarises_a_web_page_end_to_end() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>An Article</title></head><body>
                <article><p>Rust programs compile to fast native binaries.</p></article>
            </body></html>"#,
            "text/html",
        ))
        .mount(&site)
        .await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk_test_key"))
        .and(body_string_contains("Provide a 300-word summary"))
        .and(body_string_contains("Rust programs compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "A tidy summary." } }]
        })))
        .expect(1)
        .mount(&llm)
        .await;

    let loader = UrlLoader::new().unwrap();
    let agent = agent_for(&llm);
    let url = format!("{}/article", site.uri());

    let summary = orchestrator::summarize_url(&handle(), &url, &loader, &agent)
        .await
        .unwrap();
    assert_eq!(summary, "A tidy summary.");
}

#[tokio::test]
async fn summarises_a_video_via_its_transcript() {
    let video_site = MockServer::start().await;
    let watch_page = format!(
        r#"<html><body><script>var ytInitialPlayerResponse = {{"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"{}/api/timedtext?v=dQw4w9WgXcQ&lang=en","languageCode":"en"}}]}}}},"videoDetails":{{"videoId":"dQw4w9WgXcQ","title":"A Talk","author":"A Speaker","lengthSeconds":"212"}}}};</script></body></html>"#,
        video_site.uri()
    );
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "dQw4w9WgXcQ"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(watch_page, "text/html"))
        .mount(&video_site)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="2">welcome to the talk</text><text start="2" dur="3">about fearless concurrency</text></transcript>"#,
            "text/xml",
        ))
        .mount(&video_site)
        .await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("welcome to the talk about fearless concurrency"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Talk summary." } }]
        })))
        .expect(1)
        .mount(&llm)
        .await;

    // The URL string still classifies as a video by substring; only the
    // video id is taken from it, and the fetcher hits the mock host.
    let loader = UrlLoader::with_transcript_fetcher(
        TranscriptFetcher::with_base(video_site.uri()).unwrap(),
    );
    let agent = agent_for(&llm);

    let summary = orchestrator::summarize_url(
        &handle(),
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        &loader,
        &agent,
    )
    .await
    .unwrap();
    assert_eq!(summary, "Talk summary.");
}

#[tokio::test]
async fn raw_fetch_attaches_video_metadata() {
    let video_site = MockServer::start().await;
    let watch_page = format!(
        r#"{{"captionTracks":[{{"baseUrl":"{}/api/timedtext","languageCode":"en"}}],"videoDetails":{{"title":"A Talk","author":"A Speaker","lengthSeconds":"212"}}}}"#,
        video_site.uri()
    );
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(watch_page, "text/html"))
        .mount(&video_site)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<transcript><text start=\"0\">hello there</text></transcript>",
            "text/xml",
        ))
        .mount(&video_site)
        .await;

    let loader = UrlLoader::with_transcript_fetcher(
        TranscriptFetcher::with_base(video_site.uri()).unwrap(),
    );

    let documents =
        orchestrator::fetch_documents("https://youtu.be/dQw4w9WgXcQ", &loader)
            .await
            .unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].text, "hello there");
    assert_eq!(documents[0].metadata.title.as_deref(), Some("A Talk"));
    assert_eq!(documents[0].metadata.author.as_deref(), Some("A Speaker"));
    assert_eq!(documents[0].metadata.length_seconds, Some(212));
    assert_eq!(documents[0].metadata.source, "https://youtu.be/dQw4w9WgXcQ");
}

#[tokio::test]
async fn empty_pages_warn_and_never_reach_the_llm() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spa"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><script>bootApplication(window);</script></body></html>",
            "text/html",
        ))
        .mount(&site)
        .await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "unreachable" } }]
        })))
        .expect(0)
        .mount(&llm)
        .await;

    let loader = UrlLoader::new().unwrap();
    let agent = agent_for(&llm);
    let url = format!("{}/spa", site.uri());

    let err = orchestrator::summarize_url(&handle(), &url, &loader, &agent)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::EmptyContent));
    assert!(err.is_warning());
}

#[tokio::test]
async fn videos_without_captions_error_and_never_reach_the_llm() {
    let video_site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body>no caption data here</body></html>",
            "text/html",
        ))
        .mount(&video_site)
        .await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&llm)
        .await;

    let loader = UrlLoader::with_transcript_fetcher(
        TranscriptFetcher::with_base(video_site.uri()).unwrap(),
    );
    let agent = agent_for(&llm);

    let err = orchestrator::summarize_url(
        &handle(),
        "https://youtu.be/dQw4w9WgXcQ",
        &loader,
        &agent,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RequestError::Load(_)));
    assert!(!err.is_warning());
    assert!(err.to_string().contains("no transcript"));
}

#[tokio::test]
async fn rejected_credentials_surface_the_api_message() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><p>Plenty of text for the summariser to work with.</p></body></html>",
            "text/html",
        ))
        .mount(&site)
        .await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid API Key", "type": "invalid_request_error" }
        })))
        .mount(&llm)
        .await;

    let loader = UrlLoader::new().unwrap();
    let agent = agent_for(&llm);

    let err = orchestrator::summarize_url(&handle(), &site.uri(), &loader, &agent)
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::Agent(_)));
    assert!(err.to_string().contains("Invalid API Key"));
    assert!(err.is_credential_rejection());
    assert!(!err.is_warning());
    assert!(!err.is_validation());
}

#[tokio::test]
async fn one_completion_per_invocation() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><p>Stable text that is comfortably long enough.</p></body></html>",
            "text/html",
        ))
        .mount(&site)
        .await;

    let llm = MockServer::start().await;
    mount_completion(&llm, "The only summary.").await;

    let loader = UrlLoader::new().unwrap();
    let agent = agent_for(&llm);

    let summary = orchestrator::summarize_url(&handle(), &site.uri(), &loader, &agent)
        .await
        .unwrap();
    assert_eq!(summary, "The only summary.");

    let requests = llm.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}
