//! 解析結果キャッシュモジュール
//!
//! 画像のキャッシュキー（Data URL先頭 or アップロードURL）をキーにして
//! 解析結果を保持し、同じ画像の再解析をスキップする。
//! プロセス内メモリのみで、上限・有効期限はない。

use super::types::AnalysisResult;
use crate::normalizer::CacheKey;
use std::collections::HashMap;

/// 解析結果キャッシュ
///
/// 無効時は `get` が常に `None`、`put` は何もしない
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    enabled: bool,
    entries: HashMap<CacheKey, AnalysisResult>,
}

impl ResultCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// キャッシュをルックアップ
    pub fn get(&self, key: &CacheKey) -> Option<&AnalysisResult> {
        if !self.enabled {
            return None;
        }
        self.entries.get(key)
    }

    /// キャッシュに追加（同じキーは上書き）
    pub fn put(&mut self, key: CacheKey, result: AnalysisResult) {
        if self.enabled {
            self.entries.insert(key, result);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// キャッシュ件数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
