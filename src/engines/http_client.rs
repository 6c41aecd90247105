// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use metrics::gauge;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::error::Error as StdError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::config::settings::HttpSettings;
use crate::engines::dns_cache::{CachingResolver, DnsCache, DnsLookupError};
use crate::engines::traits::{FetchOutcome, PageFetcher};
use crate::utils::errors::FetchFailure;

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml";

/// HTTP客户端配置
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// 每个主机的最大空闲连接数
    pub max_connections: usize,
    /// DNS缓存有效期
    pub dns_ttl: Duration,
    /// 单次请求超时
    pub timeout: Duration,
    /// User-Agent 请求头
    pub user_agent: String,
    /// Accept 请求头
    pub accept: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_connections: 200,
            dns_ttl: Duration::from_secs(600),
            timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0 (compatible; hrefcount/1.0)".to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self {
            max_connections: settings.max_connections,
            dns_ttl: settings.dns_ttl(),
            timeout: settings.timeout(),
            user_agent: settings.user_agent.clone(),
            accept: DEFAULT_ACCEPT.to_string(),
        }
    }
}

/// 共享HTTP客户端
///
/// 惰性创建带连接池的会话，进程内同一时刻只有一个存活会话。
/// 关闭后再次使用会重新创建。
pub struct HttpClient {
    config: HttpClientConfig,
    session: RwLock<Option<reqwest::Client>>,
    dns: Arc<DnsCache>,
    sessions_created: AtomicU64,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Self {
        let dns = Arc::new(DnsCache::new(config.dns_ttl));
        Self {
            config,
            session: RwLock::new(None),
            dns,
            sessions_created: AtomicU64::new(0),
        }
    }

    /// 获取共享会话
    ///
    /// 已存在时直接返回；否则在写锁内再次检查后创建，避免并发首用时重复构建
    pub async fn acquire(&self) -> Result<reqwest::Client, FetchFailure> {
        if let Some(client) = self.session.read().await.as_ref() {
            return Ok(client.clone());
        }

        let mut session = self.session.write().await;
        if let Some(client) = session.as_ref() {
            return Ok(client.clone());
        }

        let client = self.build_session()?;
        let generation = self.sessions_created.fetch_add(1, Ordering::SeqCst) + 1;
        info!("HTTP session created (generation {})", generation);
        *session = Some(client.clone());
        Ok(client)
    }

    /// 关闭会话
    ///
    /// 没有会话或重复调用时不做任何事。进行中的请求持有各自的句柄，不受影响。
    pub async fn shutdown(&self) {
        let mut session = self.session.write().await;
        if session.take().is_some() {
            self.dns.clear();
            info!("HTTP session closed");
        }
    }

    /// 当前是否存在会话
    pub async fn is_open(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// 已创建的会话数量
    pub fn sessions_created(&self) -> u64 {
        self.sessions_created.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn build_session(&self) -> Result<reqwest::Client, FetchFailure> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent)
                .map_err(|e| FetchFailure::Client(format!("invalid user agent: {}", e)))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&self.config.accept)
                .map_err(|e| FetchFailure::Client(format!("invalid accept header: {}", e)))?,
        );

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.config.timeout)
            .pool_max_idle_per_host(self.config.max_connections)
            .dns_resolver(Arc::new(CachingResolver::new(self.dns.clone())))
            .build()
            .map_err(|e| FetchFailure::Client(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    /// 执行一次HTTP GET
    ///
    /// # 参数
    ///
    /// * `address` - 目标地址
    ///
    /// # 返回值
    ///
    /// 已分类的抓取结果
    async fn fetch_once(&self, address: &str) -> FetchOutcome {
        let url = match validate_address(address) {
            Ok(url) => url,
            Err(failure) => return FetchOutcome::Fatal(failure),
        };

        let client = match self.acquire().await {
            Ok(client) => client,
            Err(failure) => return FetchOutcome::Fatal(failure),
        };

        let _in_flight = InFlightGuard::new();
        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        // Server errors are worth another attempt; anything else is counted as-is
        if status.is_server_error() {
            return FetchOutcome::Transient(FetchFailure::ServerStatus(status.as_u16()));
        }

        match response.text().await {
            Ok(body) => {
                debug!("Fetched {} ({}, {} bytes)", address, status, body.len());
                FetchOutcome::Success(body)
            }
            Err(e) if e.is_timeout() => FetchOutcome::Transient(FetchFailure::Timeout),
            Err(e) => FetchOutcome::Transient(FetchFailure::Body(error_chain(&e))),
        }
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

/// 校验地址格式与协议
pub fn validate_address(address: &str) -> Result<Url, FetchFailure> {
    let url = Url::parse(address)
        .map_err(|e| FetchFailure::MalformedAddress(format!("{}: {}", address, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(FetchFailure::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(FetchFailure::MalformedAddress(format!(
            "{}: missing host",
            address
        )));
    }

    Ok(url)
}

/// 将 reqwest 错误分类为瞬时或不可重试
fn classify_error(err: &reqwest::Error) -> FetchOutcome {
    let message = error_chain(err);

    if err.is_timeout() {
        FetchOutcome::Transient(FetchFailure::Timeout)
    } else if err.is_builder() {
        FetchOutcome::Fatal(FetchFailure::MalformedAddress(message))
    } else if err.is_redirect() {
        FetchOutcome::Fatal(FetchFailure::Connection(message))
    } else if is_dns_failure(err) {
        FetchOutcome::Transient(FetchFailure::Dns(message))
    } else if err.is_body() || err.is_decode() {
        FetchOutcome::Transient(FetchFailure::Body(message))
    } else {
        FetchOutcome::Transient(FetchFailure::Connection(message))
    }
}

fn is_dns_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.downcast_ref::<DnsLookupError>().is_some() {
            return true;
        }
        source = cause.source();
    }
    error_chain(err).contains("dns error")
}

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// 进行中请求计数
struct InFlightGuard;

impl InFlightGuard {
    fn new() -> Self {
        gauge!("hrefcount_fetches_in_flight").increment(1.0);
        Self
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("hrefcount_fetches_in_flight").decrement(1.0);
    }
}

#[cfg(test)]
#[path = "http_client_test.rs"]
mod tests;
