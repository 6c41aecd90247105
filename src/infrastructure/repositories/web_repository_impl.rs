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
use std::sync::Arc;

use crate::domain::repositories::web_repository::WebRepository;
use crate::engines::http_client::HttpClient;
use crate::infrastructure::cache::content_cache::ContentCache;
use crate::utils::errors::FetchError;

/// 带缓存的网页内容仓库实现
pub struct CachedWebRepository {
    /// 共享HTTP客户端，清理时关闭其会话
    http: Arc<HttpClient>,
    /// 内容缓存，未命中时通过 `http` 抓取
    cache: Arc<ContentCache>,
}

impl CachedWebRepository {
    /// 创建新的网页内容仓库实例
    ///
    /// # 参数
    ///
    /// * `http` - 共享HTTP客户端
    /// * `cache` - 以同一客户端为抓取方的内容缓存
    pub fn new(http: Arc<HttpClient>, cache: Arc<ContentCache>) -> Self {
        Self { http, cache }
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }
}

#[async_trait]
impl WebRepository for CachedWebRepository {
    async fn get_content(&self, address: &str) -> Result<String, FetchError> {
        self.cache.get_or_fetch(address).await
    }

    async fn cleanup(&self) {
        self.http.shutdown().await;
    }
}
