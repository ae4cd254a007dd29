use openai_probe::{ConnectivityChecker, Stage, Step};
use serde_json::{json, Value};
use url::Url;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

const TEST_API_KEY: &str = "sk-test1234567890";

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ],
        "usage": { "prompt_tokens": 20, "completion_tokens": 4, "total_tokens": 24 }
    }))
}

fn image_reply(url: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "created": 1700000000,
        "data": [{ "url": url }]
    }))
}

async fn mount_chat(server: &MockServer, model: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .and(body_partial_json(json!({ "model": model })))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .and(body_partial_json(json!({ "model": "dall-e-3" })))
        .respond_with(response)
        .mount(server)
        .await;
}

fn checker(server: &MockServer) -> ConnectivityChecker<Vec<u8>> {
    let base_url = Url::parse(&format!("{}/v1/", server.uri())).unwrap();
    ConnectivityChecker::with_writer(Vec::new()).with_base_url(base_url)
}

/// `(path, model)` of every request the server saw, in arrival order.
async fn recorded_calls(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request: &Request| {
            let body: Value = request.body_json().unwrap();
            (
                request.url.path().to_string(),
                body["model"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

fn report(checker: ConnectivityChecker<Vec<u8>>) -> String {
    String::from_utf8(checker.into_writer()).unwrap()
}

#[tokio::test]
async fn all_probes_pass() {
    let server = MockServer::start().await;
    mount_chat(&server, "gpt-3.5-turbo", chat_reply("API is working")).await;
    mount_image(&server, image_reply("https://images.example.com/circle.png")).await;
    mount_chat(&server, "gpt-4", chat_reply("GPT-4 is working.")).await;

    let mut checker = checker(&server);
    assert!(checker.run(Some(TEST_API_KEY.to_string())).await);
    assert_eq!(checker.stage(), Stage::Done);

    assert_eq!(
        recorded_calls(&server).await,
        vec![
            ("/v1/chat/completions".to_string(), "gpt-3.5-turbo".to_string()),
            ("/v1/images/generations".to_string(), "dall-e-3".to_string()),
            ("/v1/chat/completions".to_string(), "gpt-4".to_string()),
        ]
    );

    let text = report(checker);
    assert!(text.starts_with("OpenAI API Test Script\n"));
    assert!(text.contains("✅ API key found: sk-test12..."));
    assert!(text.contains("✅ Authentication successful!\nResponse: API is working"));
    assert!(text.contains("✅ DALL-E API working!\nImage URL: https://images.example.com/circle.png"));
    assert!(text.contains("✅ GPT-4 API working!\nResponse: GPT-4 is working."));
    assert!(text.contains("🎉 All OpenAI API tests passed!"));
    assert!(text.contains("Test completed at: "));
    assert!(!text.contains("❌"));
}

#[tokio::test]
async fn chat_failure_skips_remaining_probes() {
    let server = MockServer::start().await;
    let error_body = r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#;
    mount_chat(
        &server,
        "gpt-3.5-turbo",
        ResponseTemplate::new(401).set_body_string(error_body),
    )
    .await;
    mount_image(&server, image_reply("https://images.example.com/circle.png")).await;
    mount_chat(&server, "gpt-4", chat_reply("GPT-4 is working.")).await;

    let mut checker = checker(&server);
    assert!(!checker.run(Some(TEST_API_KEY.to_string())).await);
    assert_eq!(checker.stage(), Stage::Failed { at: Step::Chat });
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    let text = report(checker);
    assert!(text.contains("❌ Authentication failed! Status code: 401"));
    assert!(text.contains(&format!("Error: {error_body}")));
    assert!(!text.contains("2. Testing DALL-E API"));
    assert!(!text.contains("🎉"));
}

#[tokio::test]
async fn gpt4_failure_after_two_successes() {
    let server = MockServer::start().await;
    mount_chat(&server, "gpt-3.5-turbo", chat_reply("API is working")).await;
    mount_image(&server, image_reply("https://images.example.com/circle.png")).await;
    mount_chat(
        &server,
        "gpt-4",
        ResponseTemplate::new(404).set_body_string("model_not_found"),
    )
    .await;

    let mut checker = checker(&server);
    assert!(!checker.run(Some(TEST_API_KEY.to_string())).await);
    assert_eq!(checker.stage(), Stage::Failed { at: Step::Gpt4 });

    assert_eq!(
        recorded_calls(&server).await,
        vec![
            ("/v1/chat/completions".to_string(), "gpt-3.5-turbo".to_string()),
            ("/v1/images/generations".to_string(), "dall-e-3".to_string()),
            ("/v1/chat/completions".to_string(), "gpt-4".to_string()),
        ]
    );

    let text = report(checker);
    assert!(text.contains("✅ Authentication successful!"));
    assert!(text.contains("✅ DALL-E API working!"));
    assert!(text.contains("❌ GPT-4 API failed! Status code: 404\nError: model_not_found"));
    assert!(!text.contains("🎉"));
}

#[tokio::test]
async fn non_ok_success_status_is_a_failure() {
    let server = MockServer::start().await;
    mount_chat(&server, "gpt-3.5-turbo", ResponseTemplate::new(202)).await;

    let mut checker = checker(&server);
    assert!(!checker.run(Some(TEST_API_KEY.to_string())).await);
    assert_eq!(checker.stage(), Stage::Failed { at: Step::Chat });
    assert!(report(checker).contains("❌ Authentication failed! Status code: 202"));
}

#[tokio::test]
async fn image_reply_without_url_is_a_failure() {
    let server = MockServer::start().await;
    mount_chat(&server, "gpt-3.5-turbo", chat_reply("API is working")).await;
    mount_image(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "created": 1700000000, "data": [] })),
    )
    .await;
    mount_chat(&server, "gpt-4", chat_reply("GPT-4 is working.")).await;

    let mut checker = checker(&server);
    assert!(!checker.run(Some(TEST_API_KEY.to_string())).await);
    assert_eq!(checker.stage(), Stage::Failed { at: Step::Image });
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    let text = report(checker);
    assert!(text.contains("❌ DALL-E connection error: "));
    assert!(text.contains("response did not contain data[0].url"));
}

#[tokio::test]
async fn malformed_json_is_a_failure() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        "gpt-3.5-turbo",
        ResponseTemplate::new(200).set_body_string("<html>gateway</html>"),
    )
    .await;

    let mut checker = checker(&server);
    assert!(!checker.run(Some(TEST_API_KEY.to_string())).await);
    assert_eq!(checker.stage(), Stage::Failed { at: Step::Chat });
    assert!(report(checker).contains("❌ Connection error: "));
}

#[tokio::test]
async fn transport_error_is_reported() {
    // Nothing listens on port 1, so the connection is refused.
    let base_url = Url::parse("http://127.0.0.1:1/v1/").unwrap();

    let mut checker = ConnectivityChecker::with_writer(Vec::new()).with_base_url(base_url);
    assert!(!checker.run(Some(TEST_API_KEY.to_string())).await);
    assert_eq!(checker.stage(), Stage::Failed { at: Step::Chat });

    let text = report(checker);
    assert!(text.contains("❌ Connection error: client invocation error"));
    assert!(text.contains("failed to perform request to 'http://127.0.0.1:1/v1/chat/completions'"));
    assert!(!text.contains("2. Testing DALL-E API"));
}

#[tokio::test]
async fn empty_key_sends_nothing() {
    let server = MockServer::start().await;

    let mut checker = checker(&server);
    assert!(!checker.run(Some(String::new())).await);
    assert_eq!(
        checker.stage(),
        Stage::Failed {
            at: Step::Credential
        }
    );
    assert!(server.received_requests().await.unwrap().is_empty());

    let text = report(checker);
    assert!(text.contains("❌ OPENAI_API_KEY environment variable not set!"));
    assert!(text.ends_with("\nPlease set your OpenAI API key and try again.\n"));
    assert!(!text.contains("🔍"));
}

#[tokio::test]
async fn missing_key_sends_nothing() {
    let server = MockServer::start().await;

    let mut checker = checker(&server);
    assert!(!checker.run(None).await);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_key_sends_nothing() {
    let server = MockServer::start().await;

    let mut checker = checker(&server);
    assert!(!checker.run(Some("abc1234567".to_string())).await);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(report(checker).contains("❌ Invalid API key format! Should start with 'sk-'"));
}
