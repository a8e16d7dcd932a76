use crate::normalizer::ImageInput;
use selfie_ai_common::AnalysisMode;

pub use selfie_ai_common::{AnalysisResult, RawModelOutput, SectionSummary};

/// モデルへ送るリクエスト（1回の呼び出しごとに作って捨てる）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub image_url: String,   // Data URL またはアップロード先URL
    pub prompt: String,
}

/// 呼び出し側から受け取る解析依頼
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub image: ImageInput,
    pub mode: AnalysisMode,
    pub custom_prompt: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(image: ImageInput) -> Self {
        Self {
            image,
            mode: AnalysisMode::default(),
            custom_prompt: None,
        }
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_custom_prompt(mut self, prompt: Option<String>) -> Self {
        self.custom_prompt = prompt;
        self
    }
}
