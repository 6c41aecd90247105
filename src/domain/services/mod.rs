// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 标签分析（tag_analyzer）：并发抓取目标并按输入顺序汇总结果
/// - 标签计数（tag_counter）：统计锚文本中的单词数
pub mod tag_analyzer;
pub mod tag_counter;
