// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 分析目标（target）：来自配置的地址及其编号
/// - 分析结果（analysis_result）：单个目标的计数或失败标记，以及批量汇总
pub mod analysis_result;
pub mod target;
