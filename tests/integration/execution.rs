//! Retry, failure and context-override behavior shared by every endpoint.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::common::{Harness, ACCESS_KEY};
use docgen_api::{file, template, ConnectionContext, Endpoint, ErrorKind, RetryConfig};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_not_found_is_returned_not_raised() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/getTemplate"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({ "shortMsg": "Not Found" })),
            )
            .expect(1),
    );

    let response = template::get(harness.environment(3).context())
        .template_name("missing.docx")
        .execute()
        .unwrap();

    assert!(!response.has_succeeded());
    assert_eq!(response.status(), 404);
    assert_eq!(response.short_msg(), Some("Not Found"));
    assert_eq!(response.tries(), 1);
    assert!(response.previous_failure().is_none());
    assert!(!response.has_document());
    harness.verify();
}

#[test]
fn test_server_errors_use_every_try() {
    let harness = Harness::start();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/listTemplates"))
            .respond_with(move |_: &wiremock::Request| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                ResponseTemplate::new(500).set_body_json(serde_json::json!({
                    "shortMsg": format!("Internal error {n}"),
                    "longMsg": "render farm unavailable"
                }))
            })
            .expect(4),
    );

    let started = Instant::now();
    let response = template::list(harness.environment(4).context())
        .execute()
        .unwrap();

    // Three fixed 10ms pauses between four tries.
    assert!(started.elapsed() >= Duration::from_millis(30));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(!response.has_succeeded());
    assert_eq!(response.status(), 500);
    assert_eq!(response.tries(), 4);
    assert_eq!(response.short_msg(), Some("Internal error 4"));
    assert!(response.templates().is_empty());

    let previous = response.previous_failure().unwrap();
    assert_eq!(previous.status, Some(500));
    assert_eq!(previous.short_msg.as_deref(), Some("Internal error 3"));
    assert_eq!(previous.long_msg.as_deref(), Some("render farm unavailable"));
    harness.verify();
}

#[test]
fn test_recovers_after_bad_gateway() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/listFiles"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .up_to_n_times(1)
            .expect(1),
    );
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/listFiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "fileList": [{ "name": "out.pdf" }]
            })))
            .expect(1),
    );

    let response = file::list(harness.environment(3).context()).execute().unwrap();

    assert!(response.has_succeeded());
    assert_eq!(response.tries(), 2);
    assert_eq!(response.files().len(), 1);
    let previous = response.previous_failure().unwrap();
    assert_eq!(previous.status, Some(502));
    assert_eq!(previous.long_msg.as_deref(), Some("Bad Gateway"));
    harness.verify();
}

#[test]
fn test_client_errors_are_not_retried() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/deleteFiles"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "shortMsg": "Unauthorized",
                "longMsg": "Invalid accessKey=test-key"
            })))
            .expect(1),
    );

    let response = file::delete(harness.environment(5).context())
        .file_name("out.pdf")
        .execute()
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(response.tries(), 1);
    assert_eq!(response.short_msg(), Some("Unauthorized"));
    assert!(!response.long_msg().unwrap().contains(ACCESS_KEY));
    harness.verify();
}

#[test]
fn test_key_override_leaves_shared_context_alone() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/listFiles"))
            .and(body_string_contains("tenant-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1),
    );
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/listFiles"))
            .and(body_string_contains(ACCESS_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1),
    );

    let env = harness.environment(3);
    let overridden = file::list(env.context()).execute_with_key("tenant-key").unwrap();
    assert!(overridden.has_succeeded());

    assert_eq!(env.context().access_key(), ACCESS_KEY);
    let default = file::list(env.context()).execute().unwrap();
    assert!(default.has_succeeded());
    harness.verify();
}

#[test]
fn test_cleanup_is_idempotent() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/getFile"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 64 * 1024], "application/pdf"))
            .expect(1),
    );

    let mut response = file::get(harness.environment(3).context())
        .file_name("big.pdf")
        .execute()
        .unwrap();

    assert!(response.has_document());
    response.cleanup();
    assert!(response.is_closed());
    assert!(!response.has_document());
    response.cleanup();
    assert!(response.is_closed());

    let mut sink = Vec::new();
    assert_eq!(response.send_document_to_writer(&mut sink).unwrap(), 0);
    harness.verify();
}

#[test]
fn test_unreachable_service_exhausts_tries() {
    // Bind then drop a listener so the port is known to be closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let context = ConnectionContext::builder(format!("http://127.0.0.1:{port}/api"), ACCESS_KEY)
        .with_retry(
            RetryConfig::default()
                .with_max_tries(2)
                .with_retry_delay(Duration::from_millis(10)),
        )
        .build()
        .unwrap();

    let err = file::list(Arc::new(context)).execute().unwrap_err();

    assert!(matches!(err.kind, ErrorKind::RetriesExhausted { attempts: 2, .. }));
    assert!(std::error::Error::source(&err).is_some());
}
