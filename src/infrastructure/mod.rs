// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，为领域层的抽象接口提供具体实现。
///
/// 包含的子模块：
/// - 缓存（cache）：内容缓存及内存、SQLite 后端
/// - 指标（metrics）：Prometheus 导出器
/// - 仓库实现（repositories）：网页内容仓库的具体实现
pub mod cache;
pub mod metrics;
pub mod repositories;
