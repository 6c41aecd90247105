// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use crate::config::settings::RetrySettings;

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数
    pub max_retries: u32,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间（不含抖动）
    pub max_backoff: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 抖动上限，实际抖动在 [0, max_jitter) 内均匀分布
    pub max_jitter: Duration,
    /// 是否启用抖动
    pub enable_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            max_jitter: Duration::from_millis(100),
            enable_jitter: true,
        }
    }
}

impl RetryPolicy {
    /// 创建标准重试策略
    pub fn standard() -> Self {
        Self::default()
    }

    /// 创建快速重试策略（更短的退避时间）
    pub fn fast() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            max_jitter: Duration::from_millis(20),
            enable_jitter: true,
        }
    }

    /// 不等待的重试策略
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            backoff_multiplier: 2.0,
            max_jitter: Duration::ZERO,
            enable_jitter: false,
        }
    }

    /// 根据配置创建重试策略
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_millis(settings.base_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
            backoff_multiplier: 2.0,
            max_jitter: Duration::from_millis(settings.max_jitter_ms),
            enable_jitter: settings.max_jitter_ms > 0,
        }
    }

    /// 计算第 `attempt` 次失败后的退避时间
    ///
    /// `attempt` 从 1 开始：`initial * multiplier^(attempt-1)`，限制在 `max_backoff` 内，再加抖动
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let backoff_secs =
            self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);

        // 限制最大退避时间
        let capped_backoff = backoff_secs.min(self.max_backoff.as_secs_f64());

        let jitter = if self.enable_jitter && !self.max_jitter.is_zero() {
            rand::random_range(0.0..self.max_jitter.as_secs_f64())
        } else {
            0.0
        };

        Duration::from_secs_f64(capped_backoff + jitter)
    }

    /// 第 `attempts` 次失败后是否还能重试
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts <= self.max_retries
    }

    /// 一次逻辑抓取最多执行的尝试次数
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
