//! Selfie AI Common Library
//!
//! CLIと各フロントエンドで共有される型・検証・プロンプト・パーサー

pub mod types;
pub mod error;
pub mod data_url;
pub mod prompts;
pub mod parser;

pub use types::{AnalysisResult, RawModelOutput, SectionSummary};
pub use error::{Error, Result, ValidationError};
pub use data_url::{
    ALLOWED_MIME_TYPES, MAX_IMAGE_BYTES, CACHE_KEY_LEN, DataUrl,
    is_allowed_mime, parse_data_url, validate_data_url, validate_binary,
    data_url_cache_key, build_data_url,
};
pub use prompts::{AnalysisMode, DEFAULT_PROMPT, resolve_prompt};
pub use parser::parse_response;
