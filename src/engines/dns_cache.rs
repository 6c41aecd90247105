// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// DNS解析错误
#[derive(Error, Debug)]
#[error("failed to resolve {host}: {reason}")]
pub struct DnsLookupError {
    pub host: String,
    pub reason: String,
}

/// 缓存的解析结果
#[derive(Clone)]
struct CachedLookup {
    addrs: Vec<SocketAddr>,
    resolved_at: Instant,
}

/// DNS缓存
///
/// 在有效期内复用主机名解析结果
pub struct DnsCache {
    ttl: Duration,
    entries: DashMap<String, CachedLookup>,
}

impl DnsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// 解析主机名，优先使用未过期的缓存
    pub async fn lookup(&self, host: &str) -> Result<Vec<SocketAddr>, DnsLookupError> {
        if let Some(cached) = self.entries.get(host) {
            if cached.resolved_at.elapsed() <= self.ttl {
                return Ok(cached.addrs.clone());
            }
        }

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| DnsLookupError {
                host: host.to_string(),
                reason: e.to_string(),
            })?
            .collect();

        if addrs.is_empty() {
            return Err(DnsLookupError {
                host: host.to_string(),
                reason: "no addresses returned".to_string(),
            });
        }

        debug!("Resolved {} to {} addresses", host, addrs.len());
        self.entries.insert(
            host.to_string(),
            CachedLookup {
                addrs: addrs.clone(),
                resolved_at: Instant::now(),
            },
        );
        Ok(addrs)
    }

    /// 清空缓存
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 供 reqwest 使用的缓存解析器
#[derive(Clone)]
pub struct CachingResolver(Arc<DnsCache>);

impl CachingResolver {
    pub fn new(cache: Arc<DnsCache>) -> Self {
        Self(cache)
    }
}

impl Resolve for CachingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let cache = self.0.clone();
        Box::pin(async move {
            let addrs = cache.lookup(name.as_str()).await?;
            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok(addrs)
        })
    }
}
