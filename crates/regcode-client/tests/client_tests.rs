// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attempt-loop behaviour of `CodeClient` against a mock backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use regcode_audit::{Action, LogLevel};
use regcode_client::{AttemptError, CodeClient, CodeOutcome, InvalidResponse, RetryPolicy};
use regcode_core::types::{Request, UserRef};
use regcode_test_utils::MemorySink;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy() -> RetryPolicy {
    RetryPolicy::default().with_uniform_delay(Duration::from_millis(1))
}

fn client(base_url: &str, sink: &Arc<MemorySink>) -> CodeClient {
    CodeClient::new(
        base_url,
        Duration::from_secs(2),
        fast_policy(),
        MemorySink::logger(sink),
    )
    .expect("client should build")
}

fn request() -> Request {
    Request::new(UserRef::new("123456789", "alice"))
}

fn valid_body(code: &str) -> serde_json::Value {
    json!({
        "code": code,
        "expiresAt": (Utc::now() + chrono::Duration::minutes(10)).to_rfc3339(),
        "reused": false,
    })
}

#[tokio::test]
async fn first_attempt_success_emits_one_success_event() {
    let server = MockServer::start().await;
    let request = request();

    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .and(header("x-request-id", request.id.as_str()))
        .and(body_partial_json(json!({
            "discordId": "123456789",
            "username": "alice",
            "requestId": request.id.as_str(),
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(valid_body("ABC123")))
        .expect(1)
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let outcome = client(&server.uri(), &sink)
        .request_code(&request)
        .await
        .expect("request should build");

    match outcome {
        CodeOutcome::Issued { result, attempts } => {
            assert_eq!(result.code, "ABC123");
            assert!(!result.reused);
            assert!(result.expires_at.is_some());
            assert_eq!(attempts, 1);
        }
        other => panic!("expected Issued, got {other:?}"),
    }

    assert_eq!(sink.actions().await, vec![Action::Success]);
    let event = sink.find(Action::Success).await.unwrap();
    assert_eq!(event.request_id.as_ref(), Some(&request.id));
    assert_eq!(event.code.as_deref(), Some("ABC123"));
    assert_eq!(event.api.as_ref().and_then(|a| a.status), Some(200));
}

#[tokio::test]
async fn trailing_slash_in_base_url_hits_the_same_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "XYZ"})))
        .expect(1)
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let base = format!("{}/", server.uri());
    let outcome = client(&base, &sink).request_code(&request()).await.unwrap();
    assert!(matches!(outcome, CodeOutcome::Issued { .. }));
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(valid_body("RETRY1")))
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let outcome = client(&server.uri(), &sink)
        .request_code(&request())
        .await
        .unwrap();

    match outcome {
        CodeOutcome::Issued { result, attempts } => {
            assert_eq!(result.code, "RETRY1");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected Issued, got {other:?}"),
    }

    assert_eq!(
        sink.actions().await,
        vec![Action::ApiError, Action::ApiError, Action::Success]
    );
    let error = sink.find(Action::ApiError).await.unwrap();
    assert_eq!(error.level, LogLevel::Warn);
    assert_eq!(error.attempts, Some(1));
    let api = error.api.unwrap();
    assert_eq!(api.status, Some(500));
    assert_eq!(api.body.as_deref(), Some("boom"));
}

#[tokio::test]
async fn rate_limit_stops_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "slow down"})))
        .expect(1)
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let outcome = client(&server.uri(), &sink)
        .request_code(&request())
        .await
        .unwrap();

    assert_eq!(outcome, CodeOutcome::RateLimited { attempts: 1 });
    assert_eq!(sink.actions().await, vec![Action::Api429]);
}

#[tokio::test]
async fn persistent_server_errors_exhaust_the_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let outcome = client(&server.uri(), &sink)
        .request_code(&request())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CodeOutcome::Exhausted {
            attempts: 3,
            last_error: AttemptError::Status(503),
        }
    );
    assert_eq!(sink.count(Action::ApiError).await, 3);
}

#[tokio::test]
async fn expired_code_is_retried() {
    let server = MockServer::start().await;
    let past = (Utc::now() - chrono::Duration::minutes(1)).to_rfc3339();

    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": "OLD", "expiresAt": past})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(valid_body("NEW")))
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let outcome = client(&server.uri(), &sink)
        .request_code(&request())
        .await
        .unwrap();

    match outcome {
        CodeOutcome::Issued { result, attempts } => {
            assert_eq!(result.code, "NEW");
            assert_eq!(attempts, 2);
        }
        other => panic!("expected Issued, got {other:?}"),
    }
    let expired = sink.find(Action::ApiReturnedExpiredCode).await.unwrap();
    assert_eq!(expired.code.as_deref(), Some("OLD"));
    assert_eq!(expired.attempts, Some(1));
}

#[tokio::test]
async fn missing_code_exhausts_with_missing_code_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reused": true})))
        .expect(3)
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let outcome = client(&server.uri(), &sink)
        .request_code(&request())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CodeOutcome::Exhausted {
            attempts: 3,
            last_error: AttemptError::Invalid(InvalidResponse::MissingCode),
        }
    );
    assert_eq!(sink.count(Action::ApiMissingCode).await, 3);
}

#[tokio::test]
async fn non_json_success_body_counts_as_missing_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(valid_body("FINE")))
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let outcome = client(&server.uri(), &sink)
        .request_code(&request())
        .await
        .unwrap();

    assert!(matches!(outcome, CodeOutcome::Issued { attempts: 2, .. }));
    assert_eq!(
        sink.actions().await,
        vec![Action::ApiMissingCode, Action::Success]
    );
}

#[tokio::test]
async fn unreachable_backend_reports_transport_failures() {
    // Nothing listens on port 1.
    let sink = MemorySink::new();
    let outcome = client("http://127.0.0.1:1", &sink)
        .request_code(&request())
        .await
        .unwrap();

    match outcome {
        CodeOutcome::Exhausted {
            attempts,
            last_error: AttemptError::Transport(_),
        } => assert_eq!(attempts, 3),
        other => panic!("expected transport exhaustion, got {other:?}"),
    }

    let events = sink.events().await;
    assert_eq!(events.len(), 3);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.action, Action::ApiFetchError);
        assert_eq!(event.attempts, Some(i as u32 + 1));
        assert_eq!(event.api.as_ref().and_then(|a| a.status), None);
        assert!(event.error_stack.is_some());
    }
}

/// Reads one HTTP/1.1 request (headers plus `Content-Length` body).
async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.expect("read request");
        assert!(n > 0, "client closed before sending a request");
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < end + 4 + body_len {
            let n = stream.read(&mut chunk).await.expect("read body");
            assert!(n > 0, "client closed mid-body");
            buf.extend_from_slice(&chunk[..n]);
        }
        return buf;
    }
}

#[tokio::test]
async fn dropped_connection_is_absorbed_by_transport_retry() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));

    let seen = Arc::clone(&connections);
    let body = valid_body("RETRY1").to_string();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                // First connection is reset without a response.
                drop(stream);
                continue;
            }
            read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    let sink = MemorySink::new();
    let outcome = client(&format!("http://{addr}"), &sink)
        .request_code(&request())
        .await
        .unwrap();

    match outcome {
        CodeOutcome::Issued { result, attempts } => {
            assert_eq!(result.code, "RETRY1");
            assert_eq!(attempts, 1);
        }
        other => panic!("expected Issued, got {other:?}"),
    }
    assert_eq!(sink.actions().await, vec![Action::Success]);
    assert_eq!(connections.load(Ordering::SeqCst), 2);
}
