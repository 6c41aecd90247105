// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.


use hrefcount::domain::services::tag_analyzer::TagAnalyzer;
use hrefcount::domain::services::tag_counter::TagCounter;
use hrefcount::engines::http_client::{HttpClient, HttpClientConfig};
use hrefcount::infrastructure::cache::cache_strategy::{CacheBackend, MemoryCacheBackend};
use hrefcount::infrastructure::cache::content_cache::ContentCache;
use hrefcount::infrastructure::repositories::web_repository_impl::CachedWebRepository;
use hrefcount::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

/// 组装好的测试栈
#[allow(dead_code)]
pub struct TestStack {
    pub http: Arc<HttpClient>,
    pub cache: Arc<ContentCache>,
    pub analyzer: TagAnalyzer,
}

/// 请求超时较短的HTTP客户端
pub fn test_http_client(timeout: Duration) -> Arc<HttpClient> {
    Arc::new(HttpClient::new(HttpClientConfig {
        timeout,
        ..HttpClientConfig::default()
    }))
}

/// 使用内存缓存与无等待重试组装完整的分析栈
pub fn build_stack(addresses: Vec<String>, request_timeout: Duration) -> TestStack {
    build_stack_with_backend(
        addresses,
        request_timeout,
        Arc::new(MemoryCacheBackend::new()),
    )
}

pub fn build_stack_with_backend(
    addresses: Vec<String>,
    request_timeout: Duration,
    backend: Arc<dyn CacheBackend>,
) -> TestStack {
    let http = test_http_client(request_timeout);
    let cache = Arc::new(ContentCache::new(
        backend,
        http.clone(),
        RetryPolicy::immediate(1),
        Duration::from_secs(60),
    ));
    let repository = Arc::new(CachedWebRepository::new(http.clone(), cache.clone()));
    let analyzer = TagAnalyzer::new(repository, addresses, TagCounter::default(), 4).unwrap();

    TestStack {
        http,
        cache,
        analyzer,
    }
}
