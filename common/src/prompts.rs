//! プロンプト生成モジュール
//!
//! - AnalysisMode: 解析モード
//! - DEFAULT_PROMPT: 髪・肌の特徴を3〜4個の短いフレーズで返させる固定プロンプト
//! - resolve_prompt: モードとカスタムプロンプトから送信するプロンプトを決定

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 既定の解析プロンプト
pub const DEFAULT_PROMPT: &str = "I want you to examine the person in this picture and analyze \
their hair's features like length, colour, health and tone, and their skin's type and tone. \
Then describe them using only 3-4 short descriptions such as: \"Curly Hair\", \"Oily Skin\", etc. \
ONLY RETURN THE 3-4 SHORT DESCRIPTIONS SEPARATED BY A COMMA";

const HAIR_PROMPT: &str = "Examine the person in this picture and analyze only their hair: \
length, texture, colour and health. Describe it using only 3-4 short descriptions such as: \
\"Curly Hair\", \"Dry Ends\", etc. ONLY RETURN THE 3-4 SHORT DESCRIPTIONS SEPARATED BY A COMMA";

const SKIN_PROMPT: &str = "Examine the person in this picture and analyze only their skin: \
type, tone and visible concerns. Describe it using only 3-4 short descriptions such as: \
\"Oily Skin\", \"Warm Undertone\", etc. ONLY RETURN THE 3-4 SHORT DESCRIPTIONS SEPARATED BY A COMMA";

const QUICK_PROMPT: &str = "Give the 3 most noticeable hair and skin characteristics of the \
person in this picture as short descriptions such as: \"Curly Hair\", \"Oily Skin\". \
ONLY RETURN THE SHORT DESCRIPTIONS SEPARATED BY A COMMA";

/// 解析モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// 髪と肌（既定）
    #[default]
    Comprehensive,
    Hair,
    Skin,
    Quick,
    /// 呼び出し側のプロンプトをそのまま使う
    Custom,
}

impl AnalysisMode {
    /// モード固有のプロンプト（Customはなし）
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            AnalysisMode::Comprehensive => Some(DEFAULT_PROMPT),
            AnalysisMode::Hair => Some(HAIR_PROMPT),
            AnalysisMode::Skin => Some(SKIN_PROMPT),
            AnalysisMode::Quick => Some(QUICK_PROMPT),
            AnalysisMode::Custom => None,
        }
    }
}

impl std::str::FromStr for AnalysisMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "comprehensive" | "full" => Ok(AnalysisMode::Comprehensive),
            "hair" => Ok(AnalysisMode::Hair),
            "skin" => Ok(AnalysisMode::Skin),
            "quick" => Ok(AnalysisMode::Quick),
            "custom" => Ok(AnalysisMode::Custom),
            _ => Err(Error::Config(format!(
                "Unknown mode: {}. Use comprehensive, hair, skin, quick, or custom",
                s
            ))),
        }
    }
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisMode::Comprehensive => write!(f, "comprehensive"),
            AnalysisMode::Hair => write!(f, "hair"),
            AnalysisMode::Skin => write!(f, "skin"),
            AnalysisMode::Quick => write!(f, "quick"),
            AnalysisMode::Custom => write!(f, "custom"),
        }
    }
}

/// 送信するプロンプトを決定
///
/// 空でないカスタムプロンプトはモードに関係なく優先される。
/// Customモードでカスタムプロンプトがなければ既定プロンプトを使う。
pub fn resolve_prompt(mode: AnalysisMode, custom_prompt: Option<&str>) -> String {
    match custom_prompt.map(str::trim).filter(|p| !p.is_empty()) {
        Some(custom) => custom.to_string(),
        None => mode.prompt().unwrap_or(DEFAULT_PROMPT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_asks_for_comma_list() {
        assert!(DEFAULT_PROMPT.contains("3-4 short descriptions"));
        assert!(DEFAULT_PROMPT.contains("SEPARATED BY A COMMA"));
        assert_eq!(AnalysisMode::default().prompt(), Some(DEFAULT_PROMPT));
    }

    #[test]
    fn test_resolve_prompt_default() {
        let prompt = resolve_prompt(AnalysisMode::Comprehensive, None);
        assert_eq!(prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn test_resolve_prompt_custom_overrides_mode() {
        let prompt = resolve_prompt(AnalysisMode::Hair, Some("  Describe the eyebrows  "));
        assert_eq!(prompt, "Describe the eyebrows");
    }

    #[test]
    fn test_resolve_prompt_blank_custom_falls_back() {
        let prompt = resolve_prompt(AnalysisMode::Skin, Some("   "));
        assert_eq!(prompt, SKIN_PROMPT);
    }

    #[test]
    fn test_resolve_prompt_custom_mode_without_prompt_uses_default() {
        assert_eq!(resolve_prompt(AnalysisMode::Custom, None), DEFAULT_PROMPT);
        assert_eq!(resolve_prompt(AnalysisMode::Custom, Some("  ")), DEFAULT_PROMPT);
        assert_eq!(resolve_prompt(AnalysisMode::Custom, Some("Describe the eyebrows")), "Describe the eyebrows");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("HAIR".parse::<AnalysisMode>().unwrap(), AnalysisMode::Hair);
        assert_eq!("full".parse::<AnalysisMode>().unwrap(), AnalysisMode::Comprehensive);
        assert!("makeup".parse::<AnalysisMode>().is_err());
    }
}
