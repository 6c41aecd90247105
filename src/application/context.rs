// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::info;

use crate::config::settings::Settings;
use crate::domain::services::tag_analyzer::TagAnalyzer;
use crate::domain::services::tag_counter::TagCounter;
use crate::engines::http_client::{HttpClient, HttpClientConfig};
use crate::infrastructure::cache::content_cache::ContentCache;
use crate::infrastructure::cache::create_cache_backend;
use crate::infrastructure::repositories::web_repository_impl::CachedWebRepository;
use crate::utils::retry_policy::RetryPolicy;

/// 应用上下文
///
/// 持有进程内共享的组件，由调用方显式传递，不使用全局状态
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub http: Arc<HttpClient>,
    pub cache: Arc<ContentCache>,
    pub analyzer: Arc<TagAnalyzer>,
}

impl AppContext {
    /// 根据配置组装全部组件
    ///
    /// 正则非法、并发数为 0 或持久化缓存无法打开时返回错误
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let counter = TagCounter::new(&settings.analyzer.pattern)?;

        let http = Arc::new(HttpClient::new(HttpClientConfig::from_settings(
            &settings.http,
        )));

        let backend = create_cache_backend(&settings.cache).await?;
        let cache = Arc::new(
            ContentCache::new(
                backend,
                http.clone(),
                RetryPolicy::from_settings(&settings.retry),
                settings.cache.ttl(),
            )
            .with_single_flight(settings.cache.single_flight),
        );

        let repository = Arc::new(CachedWebRepository::new(http.clone(), cache.clone()));
        let analyzer = TagAnalyzer::new(
            repository,
            settings.analyzer.urls.clone(),
            counter,
            settings.analyzer.max_concurrency,
        )?
        .with_batch_timeout(settings.analyzer.batch_timeout());

        info!(
            "Analyzer ready with {} targets (max concurrency {})",
            analyzer.targets().len(),
            analyzer.max_concurrency()
        );

        Ok(Self {
            settings: Arc::new(settings),
            http,
            cache,
            analyzer: Arc::new(analyzer),
        })
    }

    /// 释放共享会话，可重复调用
    pub async fn shutdown(&self) {
        self.analyzer.shutdown().await;
    }
}
