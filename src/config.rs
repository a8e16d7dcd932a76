use crate::analyzer::{AnalyzerOptions, FalSettings};
use crate::analyzer::fal::{DEFAULT_MODEL_BASE_URL, DEFAULT_UPLOAD_URL, FAL_MODEL_ID};
use crate::error::{Result, SelfieAiError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// APIキーを読む環境変数
pub const FAL_KEY_ENV: &str = "FAL_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub model_base_url: String,
    pub upload_url: String,
    pub cache_responses: bool,
    pub timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SelfieAiError::Configuration("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("selfie-ai").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            api_key: None,
            model: FAL_MODEL_ID.into(),
            model_base_url: DEFAULT_MODEL_BASE_URL.into(),
            upload_url: DEFAULT_UPLOAD_URL.into(),
            cache_responses: false,
            timeout_seconds: None,
        }
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        resolve_api_key(std::env::var(FAL_KEY_ENV).ok(), self.api_key.as_deref())
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn fal_settings(&self) -> FalSettings {
        FalSettings {
            model: self.model.clone(),
            model_base_url: self.model_base_url.clone(),
            upload_url: self.upload_url.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }

    /// Analyzer構築用オプション（APIキー必須）
    pub fn analyzer_options(&self) -> Result<AnalyzerOptions> {
        Ok(AnalyzerOptions {
            api_key: Some(self.get_api_key()?),
            cache_responses: self.cache_responses,
            progress_callback: None,
            fal: self.fal_settings(),
        })
    }
}

/// 環境変数 → 設定ファイル の順でAPIキーを決定（空文字は未設定扱い）
pub fn resolve_api_key(env_value: Option<String>, file_value: Option<&str>) -> Result<String> {
    env_value
        .filter(|key| !key.trim().is_empty())
        .or_else(|| {
            file_value
                .filter(|key| !key.trim().is_empty())
                .map(str::to_string)
        })
        .map(|key| key.trim().to_string())
        .ok_or(SelfieAiError::MissingApiKey)
}
