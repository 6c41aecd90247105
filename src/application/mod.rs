// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 负责把配置、基础设施与领域服务组装成可运行的上下文
pub mod context;
