// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 单次抓取失败的原因
///
/// 只描述"发生了什么"，是否可重试由 `FetchOutcome` 的分支决定
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("dns resolution failed: {0}")]
    Dns(String),

    #[error("server responded with HTTP {0}")]
    ServerStatus(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("malformed address: {0}")]
    MalformedAddress(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("http client unavailable: {0}")]
    Client(String),
}

/// 抓取错误
///
/// 一次逻辑抓取（含重试）最终失败时返回
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 可重试错误耗尽了重试预算
    #[error("fetching {address} failed after {attempts} attempts: {cause}")]
    Exhausted {
        address: String,
        attempts: u32,
        cause: FetchFailure,
    },

    /// 不可重试错误，立即失败
    #[error("fetching {address} failed: {cause}")]
    Fatal {
        address: String,
        cause: FetchFailure,
    },
}

impl FetchError {
    /// 判断错误是否来自可重试（瞬时）故障
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Exhausted { .. })
    }

    /// 最后一次失败的原因
    pub fn cause(&self) -> &FetchFailure {
        match self {
            FetchError::Exhausted { cause, .. } | FetchError::Fatal { cause, .. } => cause,
        }
    }
}

/// 缓存后端错误
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 分析器错误
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// 请求的目标编号不在配置范围内
    #[error("target id {id} is out of range (configured targets: {len})")]
    OutOfRange { id: usize, len: usize },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("pattern must contain at least one capture group")]
    MissingCaptureGroup,

    #[error("max concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),
}
