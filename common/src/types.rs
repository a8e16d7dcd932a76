//! 解析結果の型定義
//!
//! CLIと他のフロントエンドで共有される型:
//! - RawModelOutput: モデルが返した生の出力
//! - SectionSummary: 髪・肌セクションの要約
//! - AnalysisResult: パーサーの最終出力

use serde::{Deserialize, Serialize};

/// モデルの生出力
///
/// テキストのまま返る場合と、`text`/`result`フィールドを持つ
/// JSONで返る場合がある。スキーマは保証されない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawModelOutput {
    Text(String),
    Structured(serde_json::Value),
}

impl RawModelOutput {
    /// パース対象のテキストに変換
    ///
    /// 優先順位:
    /// 1. `text` フィールド
    /// 2. `result` フィールド
    /// 3. 値全体（文字列以外はJSON文字列化）
    pub fn to_text(&self) -> String {
        match self {
            RawModelOutput::Text(text) => text.clone(),
            RawModelOutput::Structured(value) => {
                let picked = ["text", "result"]
                    .iter()
                    .filter_map(|key| value.get(*key))
                    .find(|v| is_truthy(v))
                    .unwrap_or(value);

                match picked {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                }
            }
        }
    }
}

impl From<String> for RawModelOutput {
    fn from(text: String) -> Self {
        RawModelOutput::Text(text)
    }
}

impl From<&str> for RawModelOutput {
    fn from(text: &str) -> Self {
        RawModelOutput::Text(text.to_string())
    }
}

impl From<serde_json::Value> for RawModelOutput {
    fn from(value: serde_json::Value) -> Self {
        RawModelOutput::Structured(value)
    }
}

// 空文字列・null・false は「フィールドなし」として扱う
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// 髪・肌セクションの要約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub summary: String,
}

impl SectionSummary {
    pub fn new(summary: impl Into<String>) -> Self {
        Self { summary: summary.into() }
    }
}

/// AI解析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 特徴フレーズ（出現順、空もあり得る）
    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hair: Option<SectionSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<SectionSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,

    /// 診断用に保持するモデルの生出力
    pub raw: RawModelOutput,
}

impl AnalysisResult {
    /// 生出力のみを持つ空の結果
    pub fn empty(raw: RawModelOutput) -> Self {
        Self {
            features: Vec::new(),
            hair: None,
            skin: None,
            recommendations: None,
            raw,
        }
    }

    /// 商品検索用のクエリ文字列
    pub fn search_query(&self) -> String {
        self.features.join(" ")
    }

    /// 構造化フィールドが1つも取れなかったか
    pub fn is_unstructured(&self) -> bool {
        self.features.is_empty()
            && self.hair.is_none()
            && self.skin.is_none()
            && self.recommendations.is_none()
    }
}
