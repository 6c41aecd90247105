// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::services::tag_analyzer::TagAnalyzer;
use crate::presentation::handlers::tags_handler;

/// 创建应用路由
///
/// # 参数
///
/// * `analyzer` - 共享的标签分析服务
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(analyzer: Arc<TagAnalyzer>) -> Router {
    Router::new()
        .route("/", get(tags_handler::index))
        .route("/healthcheck", get(tags_handler::healthcheck))
        .route("/v1/tags", get(tags_handler::get_tags))
        .route("/v1/tags/{id}", get(tags_handler::get_tag))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(analyzer))
}
