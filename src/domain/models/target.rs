// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 分析目标
///
/// 来自配置的不可变地址，编号即它在配置列表中的位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// 目标编号
    pub id: usize,
    /// 目标地址
    pub address: String,
}

impl Target {
    pub fn new(id: usize, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
        }
    }

    /// 按位置为地址列表分配编号
    pub fn from_addresses<I, S>(addresses: I) -> Vec<Target>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        addresses
            .into_iter()
            .enumerate()
            .map(|(id, address)| Target::new(id, address))
            .collect()
    }
}
