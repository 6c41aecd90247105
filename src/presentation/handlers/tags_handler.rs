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

use axum::{
    extract::{Extension, Json, Path},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::domain::models::analysis_result::AnalysisBatch;
use crate::domain::services::tag_analyzer::TagAnalyzer;
use crate::presentation::errors::AppError;

/// 路由索引
pub async fn index() -> impl IntoResponse {
    Json(json!({ "data": "/v1/tags | /v1/tags/{id} | /healthcheck" }))
}

/// 健康检查端点
pub async fn healthcheck() -> impl IntoResponse {
    Json(json!({ "data": "Ok!" }))
}

/// 分析全部目标
pub async fn get_tags(Extension(analyzer): Extension<Arc<TagAnalyzer>>) -> Json<AnalysisBatch> {
    let batch = analyzer.analyze_all().await;
    Json(batch)
}

/// 分析单个目标
///
/// 编号越界时返回 422
pub async fn get_tag(
    Extension(analyzer): Extension<Arc<TagAnalyzer>>,
    Path(id): Path<usize>,
) -> Result<impl IntoResponse, AppError> {
    let started = Instant::now();
    let result = analyzer.analyze_one(id).await?;
    let time = started.elapsed().as_secs_f64();

    info!("Target {} analyzed in {:.3}s", id, time);
    Ok(Json(json!({ "data": [result], "time": time })))
}
