use selfie_ai_common::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelfieAiError {
    #[error("設定エラー: {0}")]
    Configuration(String),

    #[error("APIキーが設定されていません。環境変数 FAL_KEY を設定するか `selfie-ai config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("画像検証エラー: {0}")]
    Validation(#[from] ValidationError),

    #[error("画像アップロードエラー: {0}")]
    Upload(String),

    #[error("AI解析リクエストエラー: {0}")]
    Remote(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] selfie_ai_common::Error),
}

impl SelfieAiError {
    /// 呼び出し側が再試行すれば成功し得るエラーか
    pub fn is_retryable(&self) -> bool {
        matches!(self, SelfieAiError::Upload(_) | SelfieAiError::Remote(_))
    }
}

pub type Result<T> = std::result::Result<T, SelfieAiError>;
