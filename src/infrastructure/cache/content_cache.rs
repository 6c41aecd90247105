// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use dashmap::DashMap;
use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::engines::retry::fetch_with_retry;
use crate::engines::traits::PageFetcher;
use crate::infrastructure::cache::cache_strategy::{CacheBackend, CacheEntry};
use crate::utils::errors::{CacheError, FetchError};
use crate::utils::retry_policy::RetryPolicy;

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub backend_errors: u64,
}

impl CacheStats {
    /// 缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total_requests = self.hits + self.misses;
        if total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / total_requests as f64
        }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CacheStats {{ hit_rate: {:.2}%, hits: {}, misses: {}, stores: {}, backend_errors: {} }}",
            self.hit_rate() * 100.0,
            self.hits,
            self.misses,
            self.stores,
            self.backend_errors
        )
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    backend_errors: AtomicU64,
}

/// 内容缓存
///
/// 未过期命中时直接返回缓存正文；未命中或过期时通过重试抓取并写入新的有效期。
/// 过期在读取时惰性判断，不做后台清理。后端故障降级为未命中。
pub struct ContentCache {
    backend: Arc<dyn CacheBackend>,
    fetcher: Arc<dyn PageFetcher>,
    retry: RetryPolicy,
    ttl: Duration,
    /// 每个键的抓取锁，仅在启用 single-flight 时存在
    flights: Option<DashMap<String, Arc<Mutex<()>>>>,
    counters: Counters,
}

impl ContentCache {
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        fetcher: Arc<dyn PageFetcher>,
        retry: RetryPolicy,
        ttl: Duration,
    ) -> Self {
        Self {
            backend,
            fetcher,
            retry,
            ttl,
            flights: None,
            counters: Counters::default(),
        }
    }

    /// 同一键的并发未命中只触发一次抓取
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.flights = enabled.then(DashMap::new);
        self
    }

    /// 获取地址内容，必要时抓取并缓存
    pub async fn get_or_fetch(&self, address: &str) -> Result<String, FetchError> {
        if let Some(body) = self.lookup(address, true).await {
            return Ok(body);
        }

        let Some(flights) = &self.flights else {
            return self.fetch_and_store(address).await;
        };

        let flight = flights.entry(address.to_string()).or_default().clone();
        let result = {
            let _guard = flight.lock().await;
            // 等待期间可能已有其他调用方写入
            match self.lookup(address, false).await {
                Some(body) => Ok(body),
                None => self.fetch_and_store(address).await,
            }
        };

        drop(flight);
        flights.remove_if(address, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    /// 使某个地址的缓存失效
    pub async fn invalidate(&self, address: &str) {
        if let Err(e) = self.backend.delete(address).await {
            self.record_backend_error("delete", address, &e);
        }
    }

    /// 清空缓存
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.backend.clear().await
    }

    /// 获取缓存统计信息
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            stores: self.counters.stores.load(Ordering::Relaxed),
            backend_errors: self.counters.backend_errors.load(Ordering::Relaxed),
        }
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn lookup(&self, address: &str, record: bool) -> Option<String> {
        let found = match self.backend.get(address).await {
            Ok(Some(entry)) if !entry.is_expired(Utc::now()) => Some(entry.body),
            Ok(Some(entry)) => {
                debug!("Cache entry expired for {}", address);
                // A concurrent store may have replaced the entry since it was read
                if let Err(e) = self.backend.remove_expired(address, entry.expires_at).await {
                    self.record_backend_error("delete", address, &e);
                }
                None
            }
            Ok(None) => None,
            Err(e) => {
                self.record_backend_error("read", address, &e);
                None
            }
        };

        if record {
            if found.is_some() {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                counter!("hrefcount_cache_hits_total").increment(1);
                debug!("Cache hit for {}", address);
            } else {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                counter!("hrefcount_cache_misses_total").increment(1);
                debug!("Cache miss for {}", address);
            }
        }
        found
    }

    async fn fetch_and_store(&self, address: &str) -> Result<String, FetchError> {
        let body = fetch_with_retry(self.fetcher.as_ref(), address, &self.retry).await?;

        let entry = CacheEntry::new(address, body.clone(), self.ttl, Utc::now());
        match self.backend.set(entry).await {
            Ok(()) => {
                self.counters.stores.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => self.record_backend_error("write", address, &e),
        }

        Ok(body)
    }

    fn record_backend_error(&self, operation: &str, address: &str, err: &CacheError) {
        warn!(
            "Cache {} failed for {} on {} backend: {}",
            operation,
            address,
            self.backend.name(),
            err
        );
        self.counters.backend_errors.fetch_add(1, Ordering::Relaxed);
        counter!("hrefcount_cache_backend_errors_total").increment(1);
    }
}

#[cfg(test)]
#[path = "content_cache_test.rs"]
mod tests;
