// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::utils::errors::FetchError;

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 瞬时故障，重试预算已耗尽
    Transient,
    /// 不可重试的故障
    Fatal,
    /// 批量整体超时，任务被放弃
    Deadline,
    /// 任务异常终止
    Internal,
}

/// 单个目标的失败标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TargetFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&FetchError> for TargetFailure {
    fn from(err: &FetchError) -> Self {
        let kind = if err.is_transient() {
            FailureKind::Transient
        } else {
            FailureKind::Fatal
        };
        TargetFailure::new(kind, err.to_string())
    }
}

/// 单个目标的分析结果
///
/// 每次编排只产生一次，之后不再修改。`count` 与 `error` 恰有一个存在。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// 目标编号
    #[serde(rename = "id")]
    pub target_id: usize,
    /// 目标地址
    #[serde(rename = "url")]
    pub address: String,
    /// 计数，失败时为空
    pub count: Option<usize>,
    /// 该目标耗时
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// 失败标记
    pub error: Option<TargetFailure>,
}

impl AnalysisResult {
    pub fn success(target_id: usize, address: String, count: usize, elapsed: Duration) -> Self {
        Self {
            target_id,
            address,
            count: Some(count),
            elapsed,
            error: None,
        }
    }

    pub fn failure(
        target_id: usize,
        address: String,
        error: TargetFailure,
        elapsed: Duration,
    ) -> Self {
        Self {
            target_id,
            address,
            count: None,
            elapsed,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// 一次批量分析的结果
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisBatch {
    /// 按输入顺序排列的结果
    pub data: Vec<AnalysisResult>,
    /// 整个批次的总耗时
    #[serde(serialize_with = "serialize_secs")]
    pub total_time: Duration,
    /// 处理的目标数
    #[serde(rename = "urls_processed")]
    pub processed_count: usize,
}

impl AnalysisBatch {
    pub fn new(data: Vec<AnalysisResult>, total_time: Duration) -> Self {
        let processed_count = data.len();
        Self {
            data,
            total_time,
            processed_count,
        }
    }

    /// 成功目标数
    pub fn succeeded(&self) -> usize {
        self.data.iter().filter(|r| r.is_success()).count()
    }

    /// 所有成功目标的计数之和
    pub fn total_count(&self) -> usize {
        self.data.iter().filter_map(|r| r.count).sum()
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
