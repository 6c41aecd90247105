// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::FutureExt;
use metrics::counter;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::models::analysis_result::{
    AnalysisBatch, AnalysisResult, FailureKind, TargetFailure,
};
use crate::domain::models::target::Target;
use crate::domain::repositories::web_repository::WebRepository;
use crate::domain::services::tag_counter::TagCounter;
use crate::utils::errors::AnalyzerError;

const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(60);

/// 约 30 年，用于无法表示的截止时间
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// 标签分析服务
///
/// 对配置的目标并发抓取并计数。并发数受信号量限制，结果按输入顺序返回，
/// 单个目标的失败只记录在它自己的结果里。
pub struct TagAnalyzer {
    repository: Arc<dyn WebRepository>,
    targets: Arc<[Target]>,
    counter: Arc<TagCounter>,
    max_concurrency: usize,
    batch_timeout: Duration,
}

impl TagAnalyzer {
    /// 创建新的标签分析服务实例
    ///
    /// # 参数
    ///
    /// * `repository` - 网页内容仓库
    /// * `addresses` - 目标地址列表，编号按位置分配
    /// * `counter` - 预编译的计数器
    /// * `max_concurrency` - 最大并发抓取数，至少为 1
    ///
    /// # 返回值
    ///
    /// * `Ok(TagAnalyzer)` - 分析服务
    /// * `Err(AnalyzerError::InvalidConcurrency)` - 并发数为 0
    pub fn new(
        repository: Arc<dyn WebRepository>,
        addresses: Vec<String>,
        counter: TagCounter,
        max_concurrency: usize,
    ) -> Result<Self, AnalyzerError> {
        if max_concurrency == 0 {
            return Err(AnalyzerError::InvalidConcurrency(max_concurrency));
        }

        Ok(Self {
            repository,
            targets: Target::from_addresses(addresses).into(),
            counter: Arc::new(counter),
            max_concurrency,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
        })
    }

    /// 设置批量分析的整体超时
    pub fn with_batch_timeout(mut self, batch_timeout: Duration) -> Self {
        self.batch_timeout = batch_timeout;
        self
    }

    /// 配置的目标列表
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// 分析单个目标
    ///
    /// 编号不在 `[0, len)` 内时返回 `AnalyzerError::OutOfRange`
    pub async fn analyze_one(&self, id: usize) -> Result<AnalysisResult, AnalyzerError> {
        let target = self
            .targets
            .get(id)
            .cloned()
            .ok_or(AnalyzerError::OutOfRange {
                id,
                len: self.targets.len(),
            })?;

        let started = Instant::now();
        let address = target.address.clone();
        let work = analyze_target(self.repository.clone(), self.counter.clone(), target, None);

        let result = match tokio::time::timeout(self.batch_timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Analysis of {} exceeded {:?}", address, self.batch_timeout);
                AnalysisResult::failure(
                    id,
                    address,
                    TargetFailure::new(FailureKind::Deadline, "deadline exceeded"),
                    started.elapsed(),
                )
            }
        };

        record_outcome(&result);
        Ok(result)
    }

    /// 使用配置的整体超时分析全部目标
    pub async fn analyze_all(&self) -> AnalysisBatch {
        let now = Instant::now();
        // Oversized timeouts saturate to a far-future deadline
        let deadline = now
            .checked_add(self.batch_timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        self.analyze_all_within(deadline).await
    }

    /// 在给定截止时间前分析全部目标
    ///
    /// 截止时间到达后未完成的目标被放弃并标记为 `Deadline`，
    /// 返回的结果数量始终等于目标数量
    pub async fn analyze_all_within(&self, deadline: Instant) -> AnalysisBatch {
        let started = Instant::now();
        let total = self.targets.len();
        if total == 0 {
            return AnalysisBatch::new(Vec::new(), started.elapsed());
        }

        let limiter = Arc::new(Semaphore::new(total.min(self.max_concurrency)));
        let mut tasks = JoinSet::new();

        for (position, target) in self.targets.iter().cloned().enumerate() {
            let repository = self.repository.clone();
            let counter = self.counter.clone();
            let limiter = limiter.clone();

            tasks.spawn(async move {
                let id = target.id;
                let address = target.address.clone();
                let task_started = Instant::now();

                let result = AssertUnwindSafe(analyze_target(
                    repository,
                    counter,
                    target,
                    Some(limiter),
                ))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    AnalysisResult::failure(
                        id,
                        address,
                        TargetFailure::new(FailureKind::Internal, "analysis task panicked"),
                        task_started.elapsed(),
                    )
                });

                (position, result)
            });
        }

        let mut slots: Vec<Option<AnalysisResult>> = vec![None; total];
        let mut deadline_hit = false;

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((position, result)))) => slots[position] = Some(result),
                Ok(Some(Err(e))) => warn!("Analysis task did not complete: {}", e),
                Ok(None) => break,
                Err(_) => {
                    deadline_hit = true;
                    warn!(
                        "Batch deadline reached with {} of {} targets unfinished",
                        tasks.len(),
                        total
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        let elapsed = started.elapsed();
        let data: Vec<AnalysisResult> = slots
            .into_iter()
            .zip(self.targets.iter())
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| {
                    let failure = if deadline_hit {
                        TargetFailure::new(FailureKind::Deadline, "batch deadline exceeded")
                    } else {
                        TargetFailure::new(FailureKind::Internal, "analysis task was cancelled")
                    };
                    AnalysisResult::failure(target.id, target.address.clone(), failure, elapsed)
                })
            })
            .collect();

        data.iter().for_each(record_outcome);

        let batch = AnalysisBatch::new(data, elapsed);
        info!(
            "Analyzed {} targets in {:?}: {} succeeded, {} total words",
            batch.processed_count,
            batch.total_time,
            batch.succeeded(),
            batch.total_count()
        );
        batch
    }

    /// 释放底层资源
    ///
    /// 可重复调用，也可在进行中的任务被取消后调用
    pub async fn shutdown(&self) {
        self.repository.cleanup().await;
        info!("Tag analyzer shut down");
    }
}

/// 分析单个目标，所有失败都写入结果而不是向上传播
async fn analyze_target(
    repository: Arc<dyn WebRepository>,
    counter: Arc<TagCounter>,
    target: Target,
    limiter: Option<Arc<Semaphore>>,
) -> AnalysisResult {
    let started = Instant::now();

    let fetched = {
        let _permit = match limiter {
            Some(limiter) => match limiter.acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    return AnalysisResult::failure(
                        target.id,
                        target.address,
                        TargetFailure::new(FailureKind::Internal, "concurrency limiter closed"),
                        started.elapsed(),
                    );
                }
            },
            None => None,
        };
        repository.get_content(&target.address).await
    };

    let body = match fetched {
        Ok(body) => body,
        Err(e) => {
            warn!("Target {} ({}) failed: {}", target.id, target.address, e);
            return AnalysisResult::failure(
                target.id,
                target.address,
                TargetFailure::from(&e),
                started.elapsed(),
            );
        }
    };

    match tokio::task::spawn_blocking(move || counter.count(&body)).await {
        Ok(count) => {
            debug!("Target {} ({}) counted {} words", target.id, target.address, count);
            AnalysisResult::success(target.id, target.address, count, started.elapsed())
        }
        Err(e) => AnalysisResult::failure(
            target.id,
            target.address,
            TargetFailure::new(FailureKind::Internal, format!("counting failed: {}", e)),
            started.elapsed(),
        ),
    }
}

fn record_outcome(result: &AnalysisResult) {
    let outcome = if result.is_success() {
        "success"
    } else {
        "failure"
    };
    counter!("hrefcount_targets_analyzed_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
#[path = "tag_analyzer_test.rs"]
mod tests;
