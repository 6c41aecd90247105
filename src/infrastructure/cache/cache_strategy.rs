// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::utils::errors::CacheError;

/// 缓存条目
///
/// 不变式：`expires_at = fetched_at + ttl`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// 目标地址
    pub key: String,
    /// 响应正文
    pub body: String,
    /// 抓取时间
    pub fetched_at: DateTime<Utc>,
    /// 过期时间
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        key: impl Into<String>,
        body: impl Into<String>,
        ttl: Duration,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| fetched_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            key: key.into(),
            body: body.into(),
            fetched_at,
            expires_at,
        }
    }

    /// 当 `now` 晚于过期时间时视为不存在
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// 缓存后端接口
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 获取条目，不做过期判断
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// 写入条目，已存在时覆盖
    async fn set(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// 删除条目
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// 仅当存储的条目仍以 `expires_at` 过期时删除，已被新写入覆盖的条目保留
    async fn remove_expired(&self, key: &str, expires_at: DateTime<Utc>)
        -> Result<(), CacheError>;

    /// 清空缓存
    async fn clear(&self) -> Result<(), CacheError>;

    /// 条目数量（含已过期但尚未被读到的条目）
    async fn len(&self) -> Result<usize, CacheError>;

    /// 后端名称
    fn name(&self) -> &'static str;
}

/// 内存缓存后端
#[derive(Default)]
pub struct MemoryCacheBackend {
    cache: DashMap<String, CacheEntry>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.cache.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        debug!(
            "Stored {} bytes in memory cache for key: {}",
            entry.body.len(),
            entry.key
        );
        self.cache.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.remove(key);
        debug!("Deleted cache entry for key: {}", key);
        Ok(())
    }

    async fn remove_expired(
        &self,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        if self
            .cache
            .remove_if(key, |_, entry| entry.expires_at == expires_at)
            .is_some()
        {
            debug!("Removed expired cache entry for key: {}", key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.cache.clear();
        info!("Cleared all memory cache entries");
        Ok(())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(self.cache.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
