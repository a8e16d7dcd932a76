//! エラー型定義

use thiserror::Error;

/// 画像入力の検証エラー
///
/// 決定的なエラーなので再試行しても結果は変わらない
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid format: expected data:image/<type>;base64,<payload>")]
    InvalidFormat,

    #[error("unsupported format: {0} (allowed: JPG, JPEG, PNG, WebP, GIF, AVIF)")]
    UnsupportedFormat(String),

    #[error("too large: {size} bytes (max {limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    #[error("invalid input type")]
    InvalidInputType,
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
