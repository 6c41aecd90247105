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

use crate::utils::errors::FetchFailure;

/// 单次抓取的结果
///
/// 由抓取方完成分类，重试循环只根据分支决定是否重试
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 成功，携带响应正文
    Success(String),
    /// 瞬时故障（超时、连接、DNS），消耗重试预算
    Transient(FetchFailure),
    /// 不可重试故障（地址非法、协议不支持）
    Fatal(FetchFailure),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// 页面抓取特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 执行一次抓取，不做重试
    async fn fetch_once(&self, address: &str) -> FetchOutcome;

    /// 抓取器名称
    fn name(&self) -> &'static str;
}
