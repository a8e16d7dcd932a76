//! 解析ファサード
//!
//! 正規化 → キャッシュ確認 → モデル呼び出し → パース → キャッシュ保存
//! を1回の `analyze` にまとめる。どの段階でも最初のエラーで中断し、
//! 部分的な結果は返さない。

pub mod cache;
pub mod fal;
mod types;

pub use cache::ResultCache;
pub use fal::{FalClient, FalSettings};
pub use types::{AnalysisRequest, AnalysisResult, AnalyzeRequest, RawModelOutput, SectionSummary};

use crate::ai_provider::{ImageUploader, ModelClient};
use crate::error::{Result, SelfieAiError};
use crate::normalizer::{self, CanonicalImageRef};
use selfie_ai_common::{parse_response, resolve_prompt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 進捗コールバック（0.0〜1.0）
pub type ProgressCallback = Box<dyn Fn(f32) + Send + Sync>;

/// 送信開始時の進捗
pub const PROGRESS_SUBMITTED: f32 = 0.2;
/// モデル応答受信時の進捗
pub const PROGRESS_RECEIVED: f32 = 0.7;
/// 完了
pub const PROGRESS_DONE: f32 = 1.0;

/// Analyzerの構築オプション
#[derive(Default)]
pub struct AnalyzerOptions {
    /// Fal APIキー（必須）
    pub api_key: Option<String>,
    /// 解析結果をキャッシュするか（既定: しない）
    pub cache_responses: bool,
    pub progress_callback: Option<ProgressCallback>,
    pub fal: FalSettings,
}

impl AnalyzerOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_responses = enabled;
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }
}

/// セルフィー解析器
///
/// キャッシュはインスタンスごとに持ち、他のインスタンスとは共有しない。
/// `analyze` は `&mut self` を取るため、同一インスタンスへの同時呼び出しはできない。
pub struct Analyzer {
    client: Arc<dyn ModelClient>,
    uploader: Arc<dyn ImageUploader>,
    cache: ResultCache,
    progress: Option<ProgressCallback>,
}

impl Analyzer {
    /// Fal AIクライアントで構築
    pub fn new(options: AnalyzerOptions) -> Result<Self> {
        let api_key = require_api_key(options.api_key.as_deref())?;
        let fal = Arc::new(FalClient::new(api_key, options.fal.clone())?);
        Ok(Self::assemble(options, fal.clone(), fal))
    }

    /// 任意のモデル・ストレージ実装で構築
    pub fn with_backends(
        options: AnalyzerOptions,
        client: Arc<dyn ModelClient>,
        uploader: Arc<dyn ImageUploader>,
    ) -> Result<Self> {
        require_api_key(options.api_key.as_deref())?;
        Ok(Self::assemble(options, client, uploader))
    }

    fn assemble(
        options: AnalyzerOptions,
        client: Arc<dyn ModelClient>,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        Self {
            client,
            uploader,
            cache: ResultCache::new(options.cache_responses),
            progress: options.progress_callback,
        }
    }

    /// セルフィー画像を解析
    pub async fn analyze(&mut self, request: AnalyzeRequest) -> Result<AnalysisResult> {
        let AnalyzeRequest { image, mode, custom_prompt } = request;

        let CanonicalImageRef { url, cache_key } =
            normalizer::normalize(image, self.uploader.as_ref()).await?;

        if let Some(cached) = self.cache.get(&cache_key) {
            debug!(key_len = cache_key.as_str().len(), "キャッシュヒット");
            return Ok(cached.clone());
        }

        self.report_progress(PROGRESS_SUBMITTED);
        debug!(%mode, "モデル呼び出し開始");

        let request = AnalysisRequest {
            image_url: url,
            prompt: resolve_prompt(mode, custom_prompt.as_deref()),
        };
        let raw = self.client.invoke(&request).await.map_err(|e| {
            warn!(error = %e, "モデル呼び出し失敗");
            match e {
                SelfieAiError::Remote(_) => e,
                other => SelfieAiError::Remote(other.to_string()),
            }
        })?;

        self.report_progress(PROGRESS_RECEIVED);

        let result = parse_response(raw);
        info!(features = result.features.len(), "解析完了");

        self.cache.put(cache_key, result.clone());
        self.report_progress(PROGRESS_DONE);

        Ok(result)
    }

    /// キャッシュを削除
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    fn report_progress(&self, value: f32) {
        if let Some(callback) = &self.progress {
            callback(value);
        }
    }
}

fn require_api_key(api_key: Option<&str>) -> Result<&str> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| SelfieAiError::Configuration("FAL_KEY is required for Analyzer".into()))
}
