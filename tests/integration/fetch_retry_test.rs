// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hrefcount::engines::retry::{fetch_with_attempts, fetch_with_retry};
use hrefcount::infrastructure::cache::cache_strategy::MemoryCacheBackend;
use hrefcount::infrastructure::cache::content_cache::ContentCache;
use hrefcount::utils::errors::{FetchError, FetchFailure};
use hrefcount::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::test_http_client;

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

/// 两次 5xx 之后成功，共发出 3 次请求
#[tokio::test]
async fn test_server_errors_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Success after retries"))
        .mount(&server)
        .await;

    let client = test_http_client(Duration::from_secs(2));
    let result = fetch_with_retry(
        client.as_ref(),
        &format!("{}/flaky", server.uri()),
        &RetryPolicy::immediate(3),
    )
    .await;

    assert_eq!(result.unwrap(), "Success after retries");
    assert_eq!(request_count(&server).await, 3);
}

/// 持续失败时共尝试 max_retries + 1 次
#[tokio::test]
async fn test_persistent_server_error_exhausts_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_http_client(Duration::from_secs(2));
    let (result, attempts) = fetch_with_attempts(
        client.as_ref(),
        &format!("{}/down", server.uri()),
        &RetryPolicy::immediate(3),
    )
    .await;

    match result {
        Err(FetchError::Exhausted {
            attempts: count,
            cause,
            ..
        }) => {
            assert_eq!(count, 4);
            assert_eq!(cause, FetchFailure::ServerStatus(500));
        }
        other => panic!("expected exhausted error, got {:?}", other),
    }
    assert_eq!(attempts.len(), 4);
    assert_eq!(request_count(&server).await, 4);
}

/// 4xx 直接返回正文，不重试
#[tokio::test]
async fn test_client_error_body_returned_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("<a href='https://x.test'>not found</a>"),
        )
        .mount(&server)
        .await;

    let client = test_http_client(Duration::from_secs(2));
    let body = fetch_with_retry(
        client.as_ref(),
        &format!("{}/gone", server.uri()),
        &RetryPolicy::immediate(3),
    )
    .await
    .unwrap();

    assert!(body.contains("not found"));
    assert_eq!(request_count(&server).await, 1);
}

/// 响应慢于请求超时时按瞬时故障重试
#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let client = test_http_client(Duration::from_millis(200));
    let err = fetch_with_retry(
        client.as_ref(),
        &format!("{}/slow", server.uri()),
        &RetryPolicy::immediate(1),
    )
    .await
    .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(err.cause(), &FetchFailure::Timeout);
}

/// 同一地址在有效期内只抓取一次
#[tokio::test]
async fn test_cache_serves_second_call_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>cached</html>"))
        .mount(&server)
        .await;

    let client = test_http_client(Duration::from_secs(2));
    let cache = ContentCache::new(
        Arc::new(MemoryCacheBackend::new()),
        client.clone(),
        RetryPolicy::immediate(3),
        Duration::from_secs(60),
    );
    let address = format!("{}/page", server.uri());

    let first = cache.get_or_fetch(&address).await.unwrap();
    let second = cache.get_or_fetch(&address).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(request_count(&server).await, 1);
    assert_eq!(client.sessions_created(), 1);
}
