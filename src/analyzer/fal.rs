//! Fal AI連携モジュール
//!
//! - 画像解析: `fal-ai/bagel/understand` に画像URLとプロンプトをPOST
//! - アップロード: ストレージへmultipartでPOSTしてURLを得る
//!
//! 認証は `Authorization: Key <FAL_KEY>`。再試行はしない。

use super::types::AnalysisRequest;
use crate::ai_provider::{ImageUploader, ModelClient};
use crate::error::{Result, SelfieAiError};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use selfie_ai_common::RawModelOutput;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const FAL_MODEL_ID: &str = "fal-ai/bagel/understand";
pub const DEFAULT_MODEL_BASE_URL: &str = "https://fal.run";
pub const DEFAULT_UPLOAD_URL: &str = "https://fal.run/upload";

// エラーメッセージに含めるレスポンス本文の上限
const ERROR_BODY_LIMIT: usize = 512;

/// Fal API接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FalSettings {
    pub model: String,
    pub model_base_url: String,
    pub upload_url: String,
    /// 未指定ならタイムアウトなし
    pub timeout_seconds: Option<u64>,
}

impl Default for FalSettings {
    fn default() -> Self {
        Self {
            model: FAL_MODEL_ID.into(),
            model_base_url: DEFAULT_MODEL_BASE_URL.into(),
            upload_url: DEFAULT_UPLOAD_URL.into(),
            timeout_seconds: None,
        }
    }
}

impl FalSettings {
    /// モデルのエンドポイントURL
    pub fn model_url(&self) -> String {
        format!(
            "{}/{}",
            self.model_base_url.trim_end_matches('/'),
            self.model.trim_start_matches('/')
        )
    }
}

#[derive(Serialize)]
struct UnderstandInput<'a> {
    image_url: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(alias = "access_url")]
    url: Option<String>,
}

/// Fal AIクライアント（モデル呼び出しとアップロードの両方を担う）
pub struct FalClient {
    http: reqwest::Client,
    api_key: String,
    settings: FalSettings,
}

impl FalClient {
    pub fn new(api_key: impl Into<String>, settings: FalSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| SelfieAiError::Configuration(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            settings,
        })
    }

    pub fn settings(&self) -> &FalSettings {
        &self.settings
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.api_key)
    }
}

#[async_trait]
impl ModelClient for FalClient {
    async fn invoke(&self, request: &AnalysisRequest) -> Result<RawModelOutput> {
        let url = self.settings.model_url();
        debug!(%url, prompt_len = request.prompt.len(), "Fal AIへリクエスト送信");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.auth_header())
            .json(&UnderstandInput {
                image_url: &request.image_url,
                prompt: &request.prompt,
            })
            .send()
            .await
            .map_err(|e| SelfieAiError::Remote(format!("Fal AI request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SelfieAiError::Remote(format!("Fal AI response read failed: {}", e)))?;

        if !status.is_success() {
            warn!(%status, "Fal AIがエラーを返しました");
            return Err(SelfieAiError::Remote(http_error_message(status, Some(&body))));
        }

        debug!(len = body.len(), "Fal AIレスポンス受信");
        Ok(parse_output_body(body))
    }
}

#[async_trait]
impl ImageUploader for FalClient {
    async fn upload(&self, bytes: &[u8], mime_type: &str) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(upload_file_name(mime_type))
            .mime_str(mime_type)
            .map_err(|e| SelfieAiError::Upload(format!("不正なMIMEタイプ {}: {}", mime_type, e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.settings.upload_url)
            .header(AUTHORIZATION, self.auth_header())
            .multipart(form)
            .send()
            .await
            .map_err(|e| SelfieAiError::Upload(format!("Image upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "アップロードが失敗しました");
            let body = match response.text().await {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(error = %e, "エラーレスポンス本文の読み込みに失敗");
                    None
                }
            };
            return Err(SelfieAiError::Upload(http_error_message(status, body.as_deref())));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| SelfieAiError::Upload(format!("Upload response parse failed: {}", e)))?;

        uploaded
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| SelfieAiError::Upload("Upload response has no url".into()))
    }
}

/// レスポンス本文をモデル出力に変換
///
/// JSONなら構造化出力、そうでなければテキストとして扱う
pub fn parse_output_body(body: String) -> RawModelOutput {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => RawModelOutput::Structured(value),
        Err(_) => RawModelOutput::Text(body),
    }
}

/// 非2xx応答のエラーメッセージ（本文が読めなければステータスのみ）
fn http_error_message(status: reqwest::StatusCode, body: Option<&str>) -> String {
    match body {
        Some(body) => format!("HTTP {}: {}", status, truncate(body, ERROR_BODY_LIMIT)),
        None => format!("HTTP {}", status),
    }
}

fn upload_file_name(mime_type: &str) -> String {
    let ext = mime_type
        .rsplit('/')
        .next()
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin");
    format!("selfie.{}", ext)
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    }
}
