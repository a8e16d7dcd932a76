//! モデルレスポンスパーサー
//!
//! モデルの出力形式は保証されないため、パターンマッチで取れる範囲だけ
//! 構造化する。どのパターンにも一致しなくてもエラーにはしない。
//!
//! 抽出対象:
//! 1. 特徴フレーズ（カンマ区切り → 箇条書き の順で試行）
//! 2. `Hair Analysis:` / `Skin Analysis:` セクション
//! 3. `Recommendations:` セクション（行・文単位に分割）

use crate::types::{AnalysisResult, RawModelOutput, SectionSummary};
use regex::Regex;

/// モデル出力を解析結果に変換
///
/// 失敗しない。一致しなかった項目は空（None）になり、
/// 生出力は常に `raw` に保持される。
///
/// # Examples
/// ```
/// use selfie_ai_common::{parse_response, RawModelOutput};
///
/// let result = parse_response(RawModelOutput::from("Curly Hair, Oily Skin, Oval Face"));
/// assert_eq!(result.features, vec!["Curly Hair", "Oily Skin", "Oval Face"]);
/// ```
pub fn parse_response(output: RawModelOutput) -> AnalysisResult {
    let text = output.to_text();

    AnalysisResult {
        features: extract_features(&text),
        hair: extract_hair(&text).map(SectionSummary::new),
        skin: extract_skin(&text).map(SectionSummary::new),
        recommendations: extract_recommendations(&text),
        raw: output,
    }
}

/// 特徴フレーズを抽出
///
/// 抽出優先順位:
/// 1. 行頭のカンマ区切りリスト（`Key Features:` ラベル可）
/// 2. 行頭の `-` 箇条書き
/// 3. 空
pub fn extract_features(text: &str) -> Vec<String> {
    lazy_static::lazy_static! {
        // 1行に収まるカンマ区切りリスト
        static ref COMMA_LIST_RE: Regex = Regex::new(
            r#"(?im)^(?:Key Features:)?\s*(["'\w \t\-]+(?:,[ \t]*["'\w \t\-]+)+)"#
        ).unwrap();
        // 連続する "- xxx" 行
        static ref BULLET_LIST_RE: Regex = Regex::new(
            r#"(?im)^(?:Key Features:)?\s*((?:-[ \t]*["'\w \t\-]+\r?\n?)+)"#
        ).unwrap();
    }

    if let Some(list) = COMMA_LIST_RE.captures(text).and_then(|c| c.get(1)) {
        let features: Vec<String> = list
            .as_str()
            .split(',')
            .map(strip_phrase)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if !features.is_empty() {
            return features;
        }
    }

    if let Some(list) = BULLET_LIST_RE.captures(text).and_then(|c| c.get(1)) {
        return list
            .as_str()
            .lines()
            .map(strip_phrase)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
    }

    Vec::new()
}

/// 髪セクションの本文
pub fn extract_hair(text: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref HAIR_RE: Regex = Regex::new(
            r"(?is)Hair Analysis:(.*?)(?:Skin Analysis:|Guidelines:|Recommendations?:|\z)"
        ).unwrap();
    }
    capture_section(&HAIR_RE, text)
}

/// 肌セクションの本文
pub fn extract_skin(text: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref SKIN_RE: Regex = Regex::new(
            r"(?is)Skin Analysis:(.*?)(?:Hair Analysis:|Guidelines:|Recommendations?:|\z)"
        ).unwrap();
    }
    capture_section(&SKIN_RE, text)
}

/// おすすめセクションを行・文単位で抽出
pub fn extract_recommendations(text: &str) -> Option<Vec<String>> {
    lazy_static::lazy_static! {
        static ref REC_RE: Regex = Regex::new(
            r"(?is)Recommendations?:(.*?)(?:Hair Analysis:|Skin Analysis:|Guidelines:|\z)"
        ).unwrap();
    }

    let block = REC_RE.captures(text)?.get(1)?.as_str();
    let lines: Vec<String> = block
        .split(['\n', '.', '!', '?'])
        .map(|line| line.trim().trim_start_matches(['-', '*']).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}

fn capture_section(re: &Regex, text: &str) -> Option<String> {
    let body = re.captures(text)?.get(1)?.as_str().trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

// 前後の引用符・ダッシュ・空白を除去
fn strip_phrase(phrase: &str) -> &str {
    phrase.trim_matches(|c: char| c == '"' || c == '\'' || c == '-' || c.is_whitespace())
}
