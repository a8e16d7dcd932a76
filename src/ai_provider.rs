//! AIプロバイダとの境界
//!
//! - ModelClient: 画像参照とプロンプトをモデルに送る
//! - ImageUploader: バイナリ画像をストレージに上げてURLを得る
//!
//! 本番実装は `analyzer::fal::FalClient`。テストでは差し替える。

use crate::analyzer::AnalysisRequest;
use crate::error::Result;
use async_trait::async_trait;
use selfie_ai_common::RawModelOutput;

/// リモートの画像解析モデル
///
/// 1回の呼び出しにつきネットワーク往復は1回。再試行はしない。
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, request: &AnalysisRequest) -> Result<RawModelOutput>;
}

/// リモートのオブジェクトストレージ
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// アップロードしてモデルから参照できるURLを返す
    async fn upload(&self, bytes: &[u8], mime_type: &str) -> Result<String>;
}
