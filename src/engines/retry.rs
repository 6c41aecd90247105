// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::time::Duration;
use tracing::{debug, warn};

use crate::engines::traits::{FetchOutcome, PageFetcher};
use crate::utils::errors::{FetchError, FetchFailure};
use crate::utils::retry_policy::RetryPolicy;

/// 单次尝试的记录
///
/// 只在一次逻辑抓取内有效
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    /// 尝试序号（从 1 开始）
    pub attempt_number: u32,
    /// 该次失败后的退避时间，最后一次尝试为零
    pub backoff_delay: Duration,
    /// 失败原因，成功时为空
    pub error: Option<FetchFailure>,
}

/// 带重试的抓取
///
/// 瞬时故障按退避策略重试，尝试次数超过 `max_retries` 后返回 `FetchError::Exhausted`；
/// 不可重试故障立即返回 `FetchError::Fatal`，不消耗重试预算。
pub async fn fetch_with_retry<F>(
    fetcher: &F,
    address: &str,
    policy: &RetryPolicy,
) -> Result<String, FetchError>
where
    F: PageFetcher + ?Sized,
{
    fetch_with_attempts(fetcher, address, policy).await.0
}

/// 带重试的抓取，同时返回每次尝试的记录
pub async fn fetch_with_attempts<F>(
    fetcher: &F,
    address: &str,
    policy: &RetryPolicy,
) -> (Result<String, FetchError>, Vec<FetchAttempt>)
where
    F: PageFetcher + ?Sized,
{
    let mut attempts = Vec::new();
    let mut attempt_number = 0u32;

    loop {
        attempt_number += 1;

        match fetcher.fetch_once(address).await {
            FetchOutcome::Success(body) => {
                if attempt_number > 1 {
                    debug!(
                        "Fetched {} via {} after {} attempts",
                        address,
                        fetcher.name(),
                        attempt_number
                    );
                }
                attempts.push(FetchAttempt {
                    attempt_number,
                    backoff_delay: Duration::ZERO,
                    error: None,
                });
                return (Ok(body), attempts);
            }
            FetchOutcome::Fatal(cause) => {
                warn!("Fatal failure fetching {}: {}", address, cause);
                counter!("hrefcount_fetch_failures_total", "kind" => "fatal").increment(1);
                attempts.push(FetchAttempt {
                    attempt_number,
                    backoff_delay: Duration::ZERO,
                    error: Some(cause.clone()),
                });
                let err = FetchError::Fatal {
                    address: address.to_string(),
                    cause,
                };
                return (Err(err), attempts);
            }
            FetchOutcome::Transient(cause) => {
                if !policy.should_retry(attempt_number) {
                    warn!(
                        "Giving up on {} after {} attempts: {}",
                        address, attempt_number, cause
                    );
                    counter!("hrefcount_fetch_failures_total", "kind" => "transient").increment(1);
                    attempts.push(FetchAttempt {
                        attempt_number,
                        backoff_delay: Duration::ZERO,
                        error: Some(cause.clone()),
                    });
                    let err = FetchError::Exhausted {
                        address: address.to_string(),
                        attempts: attempt_number,
                        cause,
                    };
                    return (Err(err), attempts);
                }

                let backoff_delay = policy.calculate_backoff(attempt_number);
                warn!(
                    attempt = attempt_number,
                    backoff_ms = backoff_delay.as_millis() as u64,
                    "Transient failure fetching {}: {}, retrying",
                    address,
                    cause
                );
                counter!("hrefcount_fetch_retries_total").increment(1);
                attempts.push(FetchAttempt {
                    attempt_number,
                    backoff_delay,
                    error: Some(cause),
                });

                tokio::time::sleep(backoff_delay).await;
            }
        }
    }
}
