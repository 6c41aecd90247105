// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 提供内容缓存及其可插拔后端（内存、SQLite 单文件）
pub mod cache_strategy;
pub mod content_cache;
pub mod sqlite_backend;

use std::sync::Arc;
use tracing::info;

use crate::config::settings::{CacheBackendKind, CacheSettings};
use crate::utils::errors::CacheError;
use cache_strategy::{CacheBackend, MemoryCacheBackend};
use sqlite_backend::SqliteCacheBackend;

/// 根据配置创建缓存后端
pub async fn create_cache_backend(
    settings: &CacheSettings,
) -> Result<Arc<dyn CacheBackend>, CacheError> {
    let backend: Arc<dyn CacheBackend> = match settings.backend {
        CacheBackendKind::Memory => Arc::new(MemoryCacheBackend::new()),
        CacheBackendKind::Persistent => Arc::new(SqliteCacheBackend::open(&settings.path).await?),
    };

    info!(
        "Using {} cache backend (ttl {}s)",
        backend.name(),
        settings.ttl_secs
    );
    Ok(backend)
}
