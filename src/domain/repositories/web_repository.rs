// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::utils::errors::FetchError;

/// 网页内容仓库特质
///
/// 定义分析器获取网页内容的接口
#[async_trait]
pub trait WebRepository: Send + Sync {
    /// 获取地址对应的网页内容
    async fn get_content(&self, address: &str) -> Result<String, FetchError>;

    /// 释放仓库持有的资源，可重复调用
    async fn cleanup(&self);
}
