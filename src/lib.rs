//! selfie-ai-rust
//!
//! セルフィー画像をFal AIのビジョンモデルに送り、髪・肌の特徴フレーズを
//! 構造化して返す解析パイプライン

pub mod ai_provider;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod normalizer;

pub use analyzer::{AnalysisResult, Analyzer, AnalyzerOptions, AnalyzeRequest};
pub use error::{Result, SelfieAiError};
pub use normalizer::ImageInput;
