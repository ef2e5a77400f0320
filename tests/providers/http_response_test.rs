//! HTTP response sanitization and the OpenAI provider against a local socket.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use lawlord::providers::openai::OpenAiProvider;
use lawlord::providers::{
    check_http_response, sanitize_http_error_body, CompletionRequest, LlmProvider, Message,
    ProviderError,
};

async fn serve_once(status_line: &str, body: &str) -> String {
    let listener_result = TcpListener::bind("127.0.0.1:0").await;
    assert!(listener_result.is_ok());
    let listener = match listener_result {
        Ok(listener) => listener,
        Err(err) => panic!("listener should bind: {err}"),
    };

    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(err) => panic!("listener should expose local addr: {err}"),
    };

    let status_line_owned = status_line.to_owned();
    let body_owned = body.to_owned();
    tokio::spawn(async move {
        let accepted = listener.accept().await;
        if let Ok((mut socket, _)) = accepted {
            let mut read_buf = [0_u8; 8192];
            let _ = socket.read(&mut read_buf).await;

            let response = format!(
                "HTTP/1.1 {status_line_owned}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body_owned}",
                body_owned.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}/")
}

fn json_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::user("I was arrested")],
        system: Some("Respond in JSON.".to_owned()),
        max_tokens: Some(64),
        temperature: Some(0.3),
        json_output: true,
    }
}

#[tokio::test]
async fn check_http_response_redacts_api_keys() {
    let raw_key = "sk-proj-abcdefghijklmnopqrstuvwxyz1234";
    let body = format!("{{\"error\": \"Incorrect API key provided: {raw_key}\"}}");
    let url = serve_once("401 Unauthorized", &body).await;

    let response = match reqwest::get(url).await {
        Ok(response) => response,
        Err(err) => panic!("request should complete: {err}"),
    };

    match check_http_response(response).await {
        Err(ProviderError::HttpStatus { status, body }) => {
            assert_eq!(status, 401);
            assert!(!body.contains(raw_key));
            assert!(body.contains("[REDACTED]"));
        }
        Err(other) => panic!("expected http status error, got: {other}"),
        Ok(_) => panic!("response should fail on non-success status"),
    }
}

#[test]
fn sanitize_truncates_long_error_body() {
    let sanitized = sanitize_http_error_body(&"x".repeat(400));
    assert!(sanitized.ends_with("...[truncated]"));
    assert_eq!(sanitized.chars().count(), 256 + "...[truncated]".len());
}

#[test]
fn sanitize_collapses_whitespace() {
    assert_eq!(sanitize_http_error_body("bad\n\n  request\t"), "bad request");
}

#[tokio::test]
async fn openai_provider_parses_successful_completion() {
    let body = r#"{"model":"gpt-4o-mini","choices":[{"message":{"content":"{\"response\":\"ok\"}"}}],"usage":{"prompt_tokens":12,"completion_tokens":4}}"#;
    let url = serve_once("200 OK", body).await;

    let mut provider = OpenAiProvider::new(
        "openai/gpt-4o-mini".to_owned(),
        "gpt-4o-mini".to_owned(),
        "sk-test".to_owned(),
    );
    provider.endpoint = url;

    match provider.complete(json_request()).await {
        Ok(response) => {
            assert_eq!(response.text, "{\"response\":\"ok\"}");
            assert_eq!(response.usage.input_tokens, 12);
            assert_eq!(response.usage.output_tokens, 4);
        }
        Err(err) => panic!("completion should succeed: {err}"),
    }
}

#[tokio::test]
async fn openai_provider_surfaces_server_errors() {
    let url = serve_once("500 Internal Server Error", "upstream exploded").await;

    let mut provider = OpenAiProvider::new(
        "openai/gpt-4o-mini".to_owned(),
        "gpt-4o-mini".to_owned(),
        "sk-test".to_owned(),
    );
    provider.endpoint = url;

    let err = provider
        .complete(json_request())
        .await
        .expect_err("server error should fail the call");
    assert!(matches!(err, ProviderError::HttpStatus { status: 500, .. }));
}
