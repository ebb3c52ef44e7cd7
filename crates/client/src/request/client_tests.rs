// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the request client module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::backoff::FixedJitter;
use super::client::{interpret_response, join_url, ResilientRequestClient};
use super::error::RequestError;
use super::options::RequestOptions;
use super::transport::{HttpResponse, TransportError};
use super::transport_tests::ScriptedTransport;
use crate::test_helpers::{settle, RecordingScheduler};
use serde_json::{json, Value};
use tether_core::{ApiResponse, RequestDescriptor};
use yare::parameterized;

const BASE: &str = "http://backend.test/api";

fn make_client(transport: &ScriptedTransport) -> ResilientRequestClient<ScriptedTransport> {
    ResilientRequestClient::builder(BASE, transport.clone())
        .jitter(FixedJitter(0.0))
        .build()
}

fn make_recorded_client(
    transport: &ScriptedTransport,
    jitter: f64,
) -> (ResilientRequestClient<ScriptedTransport>, RecordingScheduler) {
    let scheduler = RecordingScheduler::new();
    let client = ResilientRequestClient::builder(BASE, transport.clone())
        .scheduler(scheduler.clone())
        .jitter(FixedJitter(jitter))
        .build();
    (client, scheduler)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// Response interpretation

#[parameterized(
    envelope_ok = { 200, r#"{"code":0,"message":"ok","data":[1,2]}"#, json!([1, 2]) },
    envelope_without_data = { 200, r#"{"code":0}"#, Value::Null },
    plain_json = { 200, r#"{"items":[]}"#, json!({"items": []}) },
    string_zero_code = { 200, r#"{"code":"0","data":1}"#, json!(1) },
    empty_body = { 204, "", Value::Null },
    whitespace_body = { 200, "  \n", Value::Null },
)]
fn interpret_success(status: u16, body: &str, expected: Value) {
    assert_eq!(
        interpret_response(HttpResponse::new(status, body)),
        Ok(expected)
    );
}

#[test]
fn interpret_business_error() {
    let result = interpret_response(HttpResponse::new(
        200,
        r#"{"code":1001,"message":"device busy"}"#,
    ));
    assert_eq!(
        result,
        Err(RequestError::Business {
            code: 1001,
            message: "device busy".into()
        })
    );
}

#[parameterized(
    null_message = { r#"{"code":1001,"message":null,"data":null}"#, 1001 },
    missing_message = { r#"{"code":1001,"data":{}}"#, 1001 },
    non_integer_code = { r#"{"code":"x","data":1}"#, ApiResponse::UNKNOWN_CODE },
    null_code = { r#"{"code":null}"#, ApiResponse::UNKNOWN_CODE },
)]
fn interpret_business_error_without_message(body: &str, code: i64) {
    assert_eq!(
        interpret_response(HttpResponse::new(200, body)),
        Err(RequestError::Business {
            code,
            message: ApiResponse::DEFAULT_MESSAGE.into()
        })
    );
}

#[test]
fn interpret_unauthorized() {
    let result = interpret_response(HttpResponse::new(401, "expired"));
    assert_eq!(result, Err(RequestError::AuthenticationExpired));
}

#[test]
fn interpret_status_error_keeps_body() {
    let result = interpret_response(HttpResponse::new(503, "busy"));
    assert_eq!(
        result,
        Err(RequestError::Status {
            status: 503,
            body: "busy".into()
        })
    );
}

#[test]
fn interpret_invalid_json() {
    let result = interpret_response(HttpResponse::new(200, "<html>"));
    assert!(matches!(result, Err(RequestError::Decode(_))));
}

#[parameterized(
    leading_slash = { "http://h/api", "/devices", "http://h/api/devices" },
    trailing_slash_base = { "http://h/api/", "/devices", "http://h/api/devices" },
    relative_target = { "http://h/api", "devices", "http://h/api/devices" },
    absolute_target = { "http://h/api", "https://other/x", "https://other/x" },
)]
fn url_joining(base: &str, target: &str, expected: &str) {
    assert_eq!(join_url(base, target), expected);
}

// Retry behaviour

#[tokio::test(start_paused = true)]
async fn test_success_without_retry() {
    let transport = ScriptedTransport::new();
    transport.respond_ok(json!([]));
    let client = make_client(&transport);

    let result = client.execute(RequestDescriptor::get("/devices")).await;

    assert_eq!(result, Ok(json!([])));
    assert_eq!(transport.urls(), vec!["http://backend.test/api/devices"]);
    assert_eq!(client.in_flight_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_then_success_resolves() {
    let transport = ScriptedTransport::new();
    transport
        .respond(503, "busy")
        .fail(TransportError::Timeout)
        .respond(500, "oops")
        .respond_ok(json!({"id": 7}));
    let client = make_client(&transport);
    let descriptor = RequestDescriptor::get("/devices/7");

    let result = client.execute(descriptor.clone()).await;

    assert_eq!(result, Ok(json!({"id": 7})));
    assert_eq!(transport.request_count(), 4);
    assert!(client.retry_state(&descriptor).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_reject_with_last_error() {
    let transport = ScriptedTransport::new();
    transport
        .respond(503, "first")
        .respond(502, "second")
        .respond(504, "third");
    let client = make_client(&transport);
    let descriptor = RequestDescriptor::get("/devices");

    let retries = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&retries);
    let options = RequestOptions::default()
        .retry_count(2)
        .on_retry(move |attempt, error| {
            seen.lock().unwrap().push((attempt, error.status()));
        });

    let result = client.execute_with(descriptor.clone(), options).await;

    assert_eq!(
        result,
        Err(RequestError::Status {
            status: 504,
            body: "third".into()
        })
    );
    assert_eq!(transport.request_count(), 3);
    assert_eq!(
        *retries.lock().unwrap(),
        vec![(1, Some(503)), (2, Some(502))]
    );
    assert!(client.retry_state(&descriptor).is_none());
    assert_eq!(client.in_flight_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_delays_follow_policy() {
    let transport = ScriptedTransport::new();
    transport
        .respond(503, "")
        .respond(503, "")
        .respond_ok(json!([]));
    let (client, scheduler) = make_recorded_client(&transport, 0.0);
    let options = RequestOptions::default()
        .retry_count(2)
        .retry_delay(ms(100));

    let result = client
        .execute_with(RequestDescriptor::get("/api/devices"), options)
        .await;

    assert_eq!(result, Ok(json!([])));
    assert_eq!(scheduler.delays(), vec![ms(100), ms(200)]);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_adds_jitter_and_caps() {
    let transport = ScriptedTransport::new();
    for _ in 0..6 {
        transport.respond(500, "");
    }
    let (client, scheduler) = make_recorded_client(&transport, 0.5);
    let options = RequestOptions::default().retry_count(5);

    let result = client
        .execute_with(RequestDescriptor::get("/slow"), options)
        .await;

    assert!(result.is_err());
    assert_eq!(
        scheduler.delays(),
        vec![ms(1_500), ms(2_500), ms(4_500), ms(8_500), ms(10_000)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_zero_retry_count_fails_fast() {
    let transport = ScriptedTransport::new();
    transport.respond(503, "");
    let (client, scheduler) = make_recorded_client(&transport, 0.0);

    let result = client
        .execute_with(
            RequestDescriptor::get("/x"),
            RequestOptions::default().retry_count(0),
        )
        .await;

    assert_eq!(result.unwrap_err().status(), Some(503));
    assert_eq!(transport.request_count(), 1);
    assert!(scheduler.delays().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_non_transient_status_is_not_retried() {
    for status in [400, 403, 404, 409] {
        let transport = ScriptedTransport::new();
        transport.respond(status, "");
        let client = make_client(&transport);

        let result = client.execute(RequestDescriptor::get("/x")).await;

        assert_eq!(result.unwrap_err().status(), Some(status));
        assert_eq!(transport.request_count(), 1, "status {status}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_business_error_is_terminal() {
    let transport = ScriptedTransport::new();
    transport.respond(200, r#"{"code":1001,"message":"device busy"}"#);
    let client = make_client(&transport);

    let result = client.execute(RequestDescriptor::post("/devices")).await;

    assert!(matches!(result, Err(RequestError::Business { code: 1001, .. })));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_predicate_overrides_default() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, r#"{"code":1001,"message":"device busy"}"#)
        .respond_ok(json!("done"));
    let client = make_client(&transport);
    let options = RequestOptions::default()
        .should_retry(|e| matches!(e, RequestError::Business { code: 1001, .. }));

    let result = client
        .execute_with(RequestDescriptor::post("/devices"), options)
        .await;

    assert_eq!(result, Ok(json!("done")));
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_predicate_can_refuse_transient_errors() {
    let transport = ScriptedTransport::new();
    transport.respond(503, "");
    let client = make_client(&transport);
    let options = RequestOptions::default().should_retry(|_| false);

    let result = client
        .execute_with(RequestDescriptor::get("/x"), options)
        .await;

    assert!(result.is_err());
    assert_eq!(transport.request_count(), 1);
}

// De-duplication

#[tokio::test(start_paused = true)]
async fn test_concurrent_identical_calls_share_one_chain() {
    let transport = ScriptedTransport::new();
    transport.respond(503, "").respond_ok(json!([1]));
    let client = make_client(&transport);
    let descriptor = RequestDescriptor::get("/devices").param("page", 1);

    let retries = Arc::new(Mutex::new(0u32));
    let counted = Arc::clone(&retries);
    let options = RequestOptions::default().on_retry(move |_, _| {
        *counted.lock().unwrap() += 1;
    });

    let first = tokio::spawn({
        let client = client.clone();
        let descriptor = descriptor.clone();
        async move { client.execute_with(descriptor, options).await }
    });
    settle().await;
    let second = tokio::spawn({
        let client = client.clone();
        let descriptor = descriptor.clone();
        async move { client.execute(descriptor).await }
    });

    settle().await;
    assert_eq!(client.in_flight_count(), 1);
    let state = client.retry_state(&descriptor).unwrap();
    assert_eq!(state.attempts, 1);
    assert_eq!(state.last_error.as_ref().and_then(|e| e.status()), Some(503));
    assert_eq!(state.descriptor, descriptor);

    assert_eq!(first.await.unwrap(), Ok(json!([1])));
    assert_eq!(second.await.unwrap(), Ok(json!([1])));
    assert_eq!(transport.request_count(), 2);
    assert_eq!(*retries.lock().unwrap(), 1);
    assert!(client.retry_state(&descriptor).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_joined_callers_share_failure() {
    let transport = ScriptedTransport::new();
    transport.respond(404, "missing");
    let client = make_client(&transport);
    let descriptor = RequestDescriptor::get("/devices/9");

    let (a, b) = tokio::join!(
        client.execute(descriptor.clone()),
        client.execute(descriptor.clone())
    );

    assert_eq!(a, b);
    assert_eq!(a.unwrap_err().status(), Some(404));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_different_bodies_are_not_joined() {
    let transport = ScriptedTransport::new();
    transport.respond_ok(json!(1)).respond_ok(json!(2));
    let client = make_client(&transport);

    let (a, b) = tokio::join!(
        client.execute(RequestDescriptor::post("/x").body(json!({"n": 1}))),
        client.execute(RequestDescriptor::post("/x").body(json!({"n": 2})))
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_retry_state_restarts_count() {
    let transport = ScriptedTransport::new();
    transport
        .respond(503, "")
        .respond(503, "")
        .respond_ok(json!("ok"));
    let client = make_client(&transport);
    let descriptor = RequestDescriptor::get("/flaky");

    let handle = tokio::spawn({
        let client = client.clone();
        let descriptor = descriptor.clone();
        async move {
            client
                .execute_with(descriptor, RequestOptions::default().retry_count(1))
                .await
        }
    });

    settle().await;
    assert_eq!(client.retry_state(&descriptor).unwrap().attempts, 1);
    assert!(client.reset_retry_state(&descriptor));
    assert!(client.retry_state(&descriptor).is_none());

    assert_eq!(handle.await.unwrap(), Ok(json!("ok")));
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_clear_retry_states() {
    let transport = ScriptedTransport::new();
    transport.respond(503, "").respond(503, "");
    let client = make_client(&transport);

    let a = tokio::spawn({
        let client = client.clone();
        async move { client.execute(RequestDescriptor::get("/a")).await }
    });
    let b = tokio::spawn({
        let client = client.clone();
        async move { client.execute(RequestDescriptor::get("/b")).await }
    });
    settle().await;

    assert_eq!(client.in_flight_count(), 2);
    assert!(client.retry_state(&RequestDescriptor::get("/a")).is_some());
    client.clear_retry_states();
    assert!(client.retry_state(&RequestDescriptor::get("/a")).is_none());
    assert!(client.retry_state(&RequestDescriptor::get("/b")).is_none());

    transport.respond_ok(json!("a")).respond_ok(json!("b"));
    assert!(a.await.unwrap().is_ok());
    assert!(b.await.unwrap().is_ok());
}

// Offline queue

#[tokio::test(start_paused = true)]
async fn test_offline_calls_replay_in_fifo_order() {
    let transport = ScriptedTransport::new();
    let client = make_client(&transport);
    client.connectivity_lost();
    assert!(!client.is_online());

    let mut handles = Vec::new();
    for target in ["/a", "/b", "/c"] {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.execute(RequestDescriptor::get(target)).await
        }));
        settle().await;
    }

    assert_eq!(client.pending_offline(), 3);
    assert_eq!(transport.request_count(), 0);

    transport
        .respond_ok(json!("a"))
        .respond(503, "")
        .respond_ok(json!("b"))
        .respond_ok(json!("c"));
    let replayed = client.connectivity_restored().await;

    assert_eq!(replayed, 3);
    assert_eq!(client.pending_offline(), 0);
    assert_eq!(
        transport.urls(),
        vec![
            "http://backend.test/api/a",
            "http://backend.test/api/b",
            "http://backend.test/api/b",
            "http://backend.test/api/c",
        ]
    );

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }
    assert_eq!(results, vec![json!("a"), json!("b"), json!("c")]);
}

#[tokio::test(start_paused = true)]
async fn test_restore_with_empty_queue() {
    let transport = ScriptedTransport::new();
    let client = make_client(&transport);
    client.connectivity_lost();

    assert_eq!(client.connectivity_restored().await, 0);
    assert!(client.is_online());
}

#[tokio::test(start_paused = true)]
async fn test_connectivity_lost_mid_replay_keeps_rest_queued() {
    let transport = ScriptedTransport::new();
    let client = make_client(&transport);
    client.connectivity_lost();

    let mut handles = Vec::new();
    for target in ["/a", "/b", "/c"] {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.execute(RequestDescriptor::get(target)).await
        }));
        settle().await;
    }

    transport.respond(503, "").respond_ok(json!("a"));
    let restore = tokio::spawn({
        let client = client.clone();
        async move { client.connectivity_restored().await }
    });

    // "/a" is waiting on its first backoff.
    settle().await;
    client.connectivity_lost();

    assert_eq!(restore.await.unwrap(), 1);
    let queued: Vec<_> = client
        .offline_descriptors()
        .into_iter()
        .map(|d| d.target)
        .collect();
    assert_eq!(queued, vec!["/b", "/c"]);

    let first = handles.remove(0);
    assert_eq!(first.await.unwrap(), Ok(json!("a")));
}

#[tokio::test(start_paused = true)]
async fn test_restore_during_replay_keeps_fifo_order() {
    let transport = ScriptedTransport::new().with_latency(ms(100));
    let client = make_client(&transport);
    client.connectivity_lost();

    let mut handles = Vec::new();
    for target in ["/a", "/b"] {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.execute(RequestDescriptor::get(target)).await
        }));
        settle().await;
    }

    transport
        .respond_ok(json!("a"))
        .respond_ok(json!("b"))
        .respond_ok(json!("c"));
    let first_restore = tokio::spawn({
        let client = client.clone();
        async move { client.connectivity_restored().await }
    });

    // "/a" is on the wire when connectivity flaps.
    settle().await;
    client.connectivity_lost();
    handles.push(tokio::spawn({
        let client = client.clone();
        async move { client.execute(RequestDescriptor::get("/c")).await }
    }));
    settle().await;
    assert_eq!(client.pending_offline(), 2);

    assert_eq!(client.connectivity_restored().await, 0);
    assert_eq!(first_restore.await.unwrap(), 3);

    assert_eq!(
        transport.urls(),
        vec![
            "http://backend.test/api/a",
            "http://backend.test/api/b",
            "http://backend.test/api/c",
        ]
    );
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }
    assert_eq!(results, vec![json!("a"), json!("b"), json!("c")]);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_replay_keeps_queue_and_callers() {
    let transport = ScriptedTransport::new().with_latency(ms(100));
    let client = make_client(&transport);
    client.connectivity_lost();

    let mut handles = Vec::new();
    for target in ["/a", "/b"] {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.execute(RequestDescriptor::get(target)).await
        }));
        settle().await;
    }

    transport.respond_ok(json!("a")).respond_ok(json!("b"));
    let restore = tokio::spawn({
        let client = client.clone();
        async move { client.connectivity_restored().await }
    });
    settle().await;
    restore.abort();
    settle().await;

    // "/a" was already dispatched; "/b" never left the queue.
    assert_eq!(client.pending_offline(), 1);
    let first = handles.remove(0);
    assert_eq!(first.await.unwrap(), Ok(json!("a")));

    assert_eq!(client.connectivity_restored().await, 1);
    assert_eq!(handles.remove(0).await.unwrap(), Ok(json!("b")));
}

// Credentials

#[tokio::test(start_paused = true)]
async fn test_missing_token_fails_without_network() {
    let transport = ScriptedTransport::new();
    let client = make_client(&transport);
    client.connectivity_lost();

    let result = client
        .execute(RequestDescriptor::get("/me").with_credentials())
        .await;

    assert_eq!(result, Err(RequestError::NotAuthenticated));
    assert_eq!(client.pending_offline(), 0);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_token_attached_as_bearer() {
    let transport = ScriptedTransport::new();
    transport.respond_ok(json!({"name": "admin"}));
    let client = make_client(&transport);
    client.set_token("abc123");

    let result = client
        .execute(RequestDescriptor::get("/me").with_credentials())
        .await;

    assert!(result.is_ok());
    let request = &transport.requests()[0];
    assert_eq!(request.header("Authorization"), Some("Bearer abc123"));
    assert_eq!(request.header("Content-Type"), Some("application/json"));
}

#[tokio::test(start_paused = true)]
async fn test_unauthorized_clears_token_and_is_not_retried() {
    let transport = ScriptedTransport::new();
    transport.respond(401, "");
    let client = make_client(&transport);
    client.set_token("stale");

    let result = client
        .execute(RequestDescriptor::get("/me").with_credentials())
        .await;

    assert_eq!(result, Err(RequestError::AuthenticationExpired));
    assert!(!client.tokens().is_set());
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_requests_without_credentials_omit_authorization() {
    let transport = ScriptedTransport::new();
    transport.respond_ok(json!(null));
    let client = make_client(&transport);
    client.set_token("abc123");

    client
        .execute(RequestDescriptor::get("/public"))
        .await
        .unwrap();

    assert_eq!(transport.requests()[0].header("Authorization"), None);
}

// Request shape

#[tokio::test(start_paused = true)]
async fn test_query_and_body_forwarded() {
    let transport = ScriptedTransport::new();
    transport.respond_ok(json!(null));
    let client = make_client(&transport);
    let descriptor = RequestDescriptor::put("/devices/3")
        .param("force", true)
        .param("note", "x")
        .param("skip", Value::Null)
        .body(json!({"name": "edge-3"}));

    client.execute(descriptor).await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.method, tether_core::Method::Put);
    assert_eq!(
        request.query,
        vec![
            ("force".to_string(), "true".to_string()),
            ("note".to_string(), "x".to_string()),
        ]
    );
    assert_eq!(request.body, Some(json!({"name": "edge-3"})));
}

#[tokio::test(start_paused = true)]
async fn test_execute_as_decodes() {
    let transport = ScriptedTransport::new();
    transport.respond_ok(json!([1, 2, 3])).respond_ok(json!("nope"));
    let client = make_client(&transport);

    let ids: Vec<u32> = client
        .execute_as(RequestDescriptor::get("/ids"), RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(ids, vec![1, 2, 3]);

    let bad: Result<Vec<u32>, _> = client
        .execute_as(RequestDescriptor::get("/ids"), RequestOptions::default())
        .await;
    assert!(matches!(bad, Err(RequestError::Decode(_))));
}

// Cache

#[tokio::test(start_paused = true)]
async fn test_cached_get_served_without_network() {
    let transport = ScriptedTransport::new();
    transport.respond_ok(json!([1])).respond_ok(json!([2]));
    let client = make_client(&transport);
    let descriptor = RequestDescriptor::get("/devices");
    let options = RequestOptions::default().cached();

    let first = client.execute_with(descriptor.clone(), options.clone()).await;
    let second = client.execute_with(descriptor.clone(), options.clone()).await;

    assert_eq!(first, Ok(json!([1])));
    assert_eq!(second, Ok(json!([1])));
    assert_eq!(transport.request_count(), 1);
    assert_eq!(client.cached_responses(), 1);

    assert!(client.invalidate(&descriptor));
    let third = client.execute_with(descriptor, options).await;
    assert_eq!(third, Ok(json!([2])));
}

#[tokio::test(start_paused = true)]
async fn test_cache_expires() {
    let transport = ScriptedTransport::new();
    transport.respond_ok(json!(1)).respond_ok(json!(2));
    let client = make_client(&transport);
    let descriptor = RequestDescriptor::get("/stats");
    let options = RequestOptions::default().cache_ttl(Duration::from_secs(5));

    client
        .execute_with(descriptor.clone(), options.clone())
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(6)).await;
    assert_eq!(client.purge_cache(), 1);

    let result = client.execute_with(descriptor, options).await;
    assert_eq!(result, Ok(json!(2)));
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_non_get_results_are_not_cached() {
    let transport = ScriptedTransport::new();
    transport.respond_ok(json!(1)).respond_ok(json!(2));
    let client = make_client(&transport);
    let options = RequestOptions::default().cached();

    client
        .execute_with(RequestDescriptor::post("/jobs"), options.clone())
        .await
        .unwrap();
    let second = client
        .execute_with(RequestDescriptor::post("/jobs"), options)
        .await;

    assert_eq!(second, Ok(json!(2)));
    assert_eq!(client.cached_responses(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_not_cached() {
    let transport = ScriptedTransport::new();
    transport.respond(404, "").respond_ok(json!("found"));
    let client = make_client(&transport);
    let options = RequestOptions::default().cached();

    let first = client
        .execute_with(RequestDescriptor::get("/x"), options.clone())
        .await;
    assert!(first.is_err());
    assert_eq!(client.cached_responses(), 0);

    client.clear_cache();
    let second = client
        .execute_with(RequestDescriptor::get("/x"), options)
        .await;
    assert_eq!(second, Ok(json!("found")));
}
