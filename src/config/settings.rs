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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::services::tag_counter::DEFAULT_ANCHOR_PATTERN;

/// 默认分析目标
pub const DEFAULT_URLS: [&str; 10] = [
    "https://www.lapatilla.com",
    "https://www.paradigmadigital.com",
    "https://www.realpython.com",
    "https://www.facebook.com",
    "https://www.instagram.com",
    "https://www.youtube.com",
    "https://www.mozilla.org",
    "https://www.github.com",
    "https://www.google.com",
    "https://www.holachamo.com",
];

/// 应用程序配置设置
///
/// 包含服务器、分析器、HTTP客户端、重试、缓存和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 分析器配置
    pub analyzer: AnalyzerSettings,
    /// HTTP客户端配置
    pub http: HttpSettings,
    /// 重试配置
    pub retry: RetrySettings,
    /// 缓存配置
    pub cache: CacheSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 分析器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerSettings {
    /// 目标地址列表，编号即列表下标
    pub urls: Vec<String>,
    /// 计数正则
    pub pattern: String,
    /// 最大并发抓取数
    pub max_concurrency: usize,
    /// 批量分析的整体超时（秒）
    pub batch_timeout_secs: u64,
}

/// HTTP客户端配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    /// 每个主机的最大空闲连接数
    pub max_connections: usize,
    /// DNS缓存有效期（秒）
    pub dns_ttl_secs: u64,
    /// User-Agent 请求头
    pub user_agent: String,
}

/// 重试配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// 最大重试次数
    pub max_retries: u32,
    /// 退避基数（毫秒）
    pub base_backoff_ms: u64,
    /// 抖动上限（毫秒）
    pub max_jitter_ms: u64,
    /// 退避上限（毫秒）
    pub max_backoff_ms: u64,
}

/// 缓存后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// 进程内存
    Memory,
    /// 单文件 SQLite
    Persistent,
}

/// 缓存配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// 后端类型 (memory, persistent)
    pub backend: CacheBackendKind,
    /// 条目有效期（秒）
    pub ttl_secs: u64,
    /// 持久化文件路径 (当 backend=persistent 时使用)
    pub path: String,
    /// 是否对同一键的并发未命中做合并
    pub single_flight: bool,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("HREFCOUNT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("analyzer.urls")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 仅使用内置默认值构建配置
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let urls: Vec<String> = DEFAULT_URLS.iter().map(|u| u.to_string()).collect();
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            // Analyzer
            .set_default("analyzer.urls", urls)?
            .set_default("analyzer.pattern", DEFAULT_ANCHOR_PATTERN)?
            .set_default("analyzer.max_concurrency", 10)?
            .set_default("analyzer.batch_timeout_secs", 60)?
            // HTTP client
            .set_default("http.timeout_secs", 10)?
            .set_default("http.max_connections", 200)?
            .set_default("http.dns_ttl_secs", 600)?
            .set_default("http.user_agent", "Mozilla/5.0 (compatible; hrefcount/1.0)")?
            // Retry
            .set_default("retry.max_retries", 3)?
            .set_default("retry.base_backoff_ms", 1000)?
            .set_default("retry.max_jitter_ms", 100)?
            .set_default("retry.max_backoff_ms", 30_000)?
            // Cache
            .set_default("cache.backend", "memory")?
            .set_default("cache.ttl_secs", 300)?
            .set_default("cache.path", "hrefcount_cache.sqlite")?
            .set_default("cache.single_flight", false)?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}

impl AnalyzerSettings {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn dns_ttl(&self) -> Duration {
        Duration::from_secs(self.dns_ttl_secs)
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
