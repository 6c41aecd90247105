// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hrefcount::domain::models::analysis_result::FailureKind;
use hrefcount::infrastructure::cache::sqlite_backend::SqliteCacheBackend;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::time::Instant;

use super::helpers::site::start_test_site;
use super::helpers::{build_stack, build_stack_with_backend};

/// 超时目标不影响其他目标，结果按输入顺序返回
#[tokio::test]
async fn test_timed_out_target_is_isolated() {
    let site = start_test_site().await;
    let stack = build_stack(
        vec![site.url("/two"), site.url("/slow"), site.url("/three")],
        Duration::from_millis(300),
    );

    let batch = stack.analyzer.analyze_all().await;

    assert_eq!(batch.processed_count, 3);
    assert_eq!(batch.data[0].count, Some(2));
    assert_eq!(batch.data[1].count, None);
    assert_eq!(
        batch.data[1].error.as_ref().map(|e| e.kind),
        Some(FailureKind::Transient)
    );
    assert_eq!(batch.data[2].count, Some(3));
    assert_eq!(batch.total_count(), 5);

    stack.analyzer.shutdown().await;
    assert!(!stack.http.is_open().await);
}

/// 第二次批量分析由缓存提供
#[tokio::test]
async fn test_repeated_batch_is_served_from_cache() {
    let site = start_test_site().await;
    let stack = build_stack(
        vec![site.url("/two"), site.url("/three")],
        Duration::from_secs(2),
    );

    let first = stack.analyzer.analyze_all().await;
    let second = stack.analyzer.analyze_all().await;

    assert_eq!(first.total_count(), 5);
    assert_eq!(second.total_count(), 5);
    assert_eq!(site.hits(), 2);
    assert_eq!(stack.cache.stats().hits, 2);
}

/// 截止时间到达后批量立即返回，会话仍可独立关闭
#[tokio::test]
async fn test_batch_deadline_abandons_in_flight_fetch() {
    let site = start_test_site().await;
    let stack = build_stack(
        vec![site.url("/slow"), site.url("/two")],
        Duration::from_secs(30),
    );

    let started = Instant::now();
    let batch = stack
        .analyzer
        .analyze_all_within(Instant::now() + Duration::from_millis(500))
        .await;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(
        batch.data[0].error.as_ref().map(|e| e.kind),
        Some(FailureKind::Deadline)
    );
    assert_eq!(batch.data[1].count, Some(2));

    stack.analyzer.shutdown().await;
    stack.analyzer.shutdown().await;
    assert!(!stack.http.is_open().await);
}

/// 地址非法或协议不支持时立即失败
#[tokio::test]
async fn test_fatal_addresses_fail_without_network() {
    let stack = build_stack(
        vec!["not a url".to_string(), "ftp://files.test/x".to_string()],
        Duration::from_secs(2),
    );

    let batch = stack.analyzer.analyze_all().await;

    for result in &batch.data {
        assert_eq!(result.count, None);
        assert_eq!(result.error.as_ref().map(|e| e.kind), Some(FailureKind::Fatal));
    }
    assert_eq!(stack.http.sessions_created(), 0);
}

/// 持久化缓存在进程重启后仍然命中
#[tokio::test]
async fn test_persistent_cache_across_stacks() {
    let site = start_test_site().await;
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.sqlite");

    let first = build_stack_with_backend(
        vec![site.url("/two")],
        Duration::from_secs(2),
        Arc::new(SqliteCacheBackend::open(&path).await.unwrap()),
    );
    assert_eq!(first.analyzer.analyze_one(0).await.unwrap().count, Some(2));
    first.analyzer.shutdown().await;

    let second = build_stack_with_backend(
        vec![site.url("/two")],
        Duration::from_secs(2),
        Arc::new(SqliteCacheBackend::open(&path).await.unwrap()),
    );
    assert_eq!(second.analyzer.analyze_one(0).await.unwrap().count, Some(2));

    assert_eq!(site.hits(), 1);
    assert_eq!(second.http.sessions_created(), 0);
}
