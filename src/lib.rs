// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 把配置、基础设施与领域服务组装成运行上下文
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含分析目标、结果模型、计数与编排服务以及仓库接口
pub mod domain;

/// 引擎模块
///
/// 共享HTTP会话、DNS缓存与带重试的抓取
pub mod engines;

/// 基础设施模块
///
/// 提供内容缓存、指标导出与仓库实现
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 工具模块
///
/// 提供错误类型、重试策略和日志初始化
pub mod utils;
