// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::errors::AnalyzerError;

/// 默认计数正则
///
/// 捕获 href 以 http/https 开头的锚点元素的内部文本，忽略大小写，允许跨行
pub const DEFAULT_ANCHOR_PATTERN: &str =
    r#"(?is)<a\s+[^>]*href\s*=\s*["'](?:http|https)://[^"']*["'][^>]*>(.*?)</a>"#;

static DEFAULT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_ANCHOR_PATTERN).expect("Failed to compile anchor regex"));

/// 标签计数器
///
/// 对每个匹配，按第一个捕获组内以空白分隔的单词数累加，而不是每个匹配计 1。
/// 纯函数，无副作用。
#[derive(Debug, Clone)]
pub struct TagCounter {
    pattern: Regex,
}

impl TagCounter {
    /// 使用自定义正则创建计数器
    ///
    /// # 参数
    ///
    /// * `pattern` - 至少包含一个捕获组的正则
    ///
    /// # 返回值
    ///
    /// * `Ok(TagCounter)` - 编译成功
    /// * `Err(AnalyzerError)` - 正则无效或缺少捕获组
    pub fn new(pattern: &str) -> Result<Self, AnalyzerError> {
        let pattern = Regex::new(pattern)?;
        // captures_len includes the implicit whole-match group
        if pattern.captures_len() < 2 {
            return Err(AnalyzerError::MissingCaptureGroup);
        }
        Ok(Self { pattern })
    }

    /// 统计文本中匹配到的单词数
    pub fn count(&self, text: &str) -> usize {
        count_words(text, &self.pattern)
    }

    /// 当前使用的正则
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for TagCounter {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_REGEX.clone(),
        }
    }
}

/// 按第一个捕获组统计单词数
pub fn count_words(text: &str, pattern: &Regex) -> usize {
    if text.is_empty() {
        return 0;
    }

    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|group| group.as_str().split_whitespace().count())
        .sum()
}
