// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化日志订阅器
///
/// 未设置 `RUST_LOG` 时默认输出 `info`，本 crate 输出 `debug`
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hrefcount=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
