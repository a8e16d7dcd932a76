//! 画像入力の正規化モジュール
//!
//! 2種類の画像表現を、モデルに渡せる参照URLとキャッシュキーに変換する。
//!
//! ## 処理フロー
//! 1. Data URL: 形式・サイズ検証 → そのまま参照URLに（キー = 先頭100文字）
//! 2. バイナリ: MIME・サイズ検証 → ストレージへアップロード（キー = URL）

use crate::ai_provider::ImageUploader;
use crate::error::{Result, SelfieAiError};
use base64::Engine;
use selfie_ai_common::{
    build_data_url, data_url_cache_key, validate_binary, validate_data_url, ValidationError,
};
use std::path::Path;
use tracing::debug;

/// 画像入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// `data:image/<type>;base64,<payload>` 形式の文字列
    Inline(String),
    /// MIMEタイプ付きのバイナリ
    Binary { mime_type: String, bytes: Vec<u8> },
}

impl ImageInput {
    pub fn inline(data_url: impl Into<String>) -> Self {
        ImageInput::Inline(data_url.into())
    }

    pub fn binary(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageInput::Binary {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// 型なしのペイロードから入力種別を判定
    ///
    /// - `data:` で始まる → Data URL
    /// - MIMEタイプ指定あり、またはマジックバイトから判定できる → バイナリ
    /// - それ以外 → `InvalidInputType`
    pub fn detect(bytes: Vec<u8>, mime_type: Option<&str>) -> Result<Self> {
        if bytes.starts_with(b"data:") {
            let text = String::from_utf8(bytes).map_err(|_| ValidationError::InvalidFormat)?;
            return Ok(ImageInput::Inline(text.trim().to_string()));
        }

        let mime_type = match mime_type.map(str::trim).filter(|m| !m.is_empty()) {
            Some(mime) => mime.to_ascii_lowercase(),
            None => sniff_mime_type(&bytes).ok_or(ValidationError::InvalidInputType)?,
        };

        Ok(ImageInput::Binary { mime_type, bytes })
    }

    /// ローカルファイルから読み込み
    pub fn from_file(path: &Path, mime_type: Option<&str>) -> Result<Self> {
        if !path.is_file() {
            return Err(SelfieAiError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        Self::detect(bytes, mime_type)
    }

    /// バイナリをData URLに変換（アップロードを省略したい場合）
    ///
    /// 変換前にMIMEタイプとサイズを検証する
    pub fn into_inline(self) -> Result<Self> {
        match self {
            ImageInput::Inline(data_url) => Ok(ImageInput::Inline(data_url)),
            ImageInput::Binary { mime_type, bytes } => {
                validate_binary(&mime_type, bytes.len())?;
                let payload = base64::engine::general_purpose::STANDARD.encode(&bytes);
                Ok(ImageInput::Inline(build_data_url(&mime_type, &payload)))
            }
        }
    }

    /// 入力のバイト長（Data URLは文字列長）
    pub fn len(&self) -> usize {
        match self {
            ImageInput::Inline(data_url) => data_url.len(),
            ImageInput::Binary { bytes, .. } => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// キャッシュキー
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        CacheKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// モデルに渡せる画像参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalImageRef {
    /// Data URL またはアップロード先URL
    pub url: String,
    pub cache_key: CacheKey,
}

/// 画像入力を検証して参照URLとキャッシュキーを得る
///
/// 検証エラー時はアップロードしない。再試行もしない。
pub async fn normalize(image: ImageInput, uploader: &dyn ImageUploader) -> Result<CanonicalImageRef> {
    match image {
        ImageInput::Inline(data_url) => {
            validate_data_url(&data_url)?;
            let cache_key = CacheKey(data_url_cache_key(&data_url));
            debug!(len = data_url.len(), "Data URL検証OK");
            Ok(CanonicalImageRef { url: data_url, cache_key })
        }
        ImageInput::Binary { mime_type, bytes } => {
            validate_binary(&mime_type, bytes.len())?;
            debug!(%mime_type, size = bytes.len(), "アップロード開始");

            let url = uploader
                .upload(&bytes, &mime_type)
                .await
                .map_err(|e| match e {
                    SelfieAiError::Upload(_) => e,
                    other => SelfieAiError::Upload(other.to_string()),
                })?;

            debug!(%url, "アップロード完了");
            Ok(CanonicalImageRef {
                cache_key: CacheKey(url.clone()),
                url,
            })
        }
    }
}

// マジックバイトからMIMEタイプを推定
fn sniff_mime_type(bytes: &[u8]) -> Option<String> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use selfie_ai_common::{CACHE_KEY_LEN, MAX_IMAGE_BYTES};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";

    #[derive(Default)]
    struct CountingUploader {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ImageUploader for CountingUploader {
        async fn upload(&self, _bytes: &[u8], mime_type: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SelfieAiError::Remote("connection reset".into()));
            }
            Ok(format!("https://storage.example/{}/{}", n, mime_type))
        }
    }

    #[test]
    fn test_detect_data_url() {
        let input = ImageInput::detect(b"data:image/png;base64,AAAA\n".to_vec(), None).unwrap();
        assert_eq!(input, ImageInput::inline("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_detect_sniffs_mime() {
        let input = ImageInput::detect(PNG_MAGIC.to_vec(), None).unwrap();
        assert!(matches!(input, ImageInput::Binary { ref mime_type, .. } if mime_type == "image/png"));

        let input = ImageInput::detect(JPEG_MAGIC.to_vec(), None).unwrap();
        assert!(matches!(input, ImageInput::Binary { ref mime_type, .. } if mime_type == "image/jpeg"));
    }

    #[test]
    fn test_detect_explicit_mime_wins() {
        let input = ImageInput::detect(PNG_MAGIC.to_vec(), Some(" Image/WebP ")).unwrap();
        assert!(matches!(input, ImageInput::Binary { ref mime_type, .. } if mime_type == "image/webp"));
    }

    #[test]
    fn test_detect_unknown_payload() {
        let result = ImageInput::detect(b"hello world".to_vec(), None);
        assert!(matches!(
            result,
            Err(SelfieAiError::Validation(ValidationError::InvalidInputType))
        ));
    }

    #[test]
    fn test_into_inline() {
        let input = ImageInput::binary("image/png", vec![0, 1, 2]).into_inline().unwrap();
        assert_eq!(input, ImageInput::inline("data:image/png;base64,AAEC"));

        let rejected = ImageInput::binary("image/bmp", vec![0]).into_inline();
        assert!(matches!(
            rejected,
            Err(SelfieAiError::Validation(ValidationError::UnsupportedFormat(_)))
        ));
    }

    #[tokio::test]
    async fn test_normalize_inline() {
        let uploader = CountingUploader::default();
        let data_url = format!("data:image/jpeg;base64,{}", "QUJD".repeat(50));

        let image_ref = normalize(ImageInput::inline(data_url.clone()), &uploader).await.unwrap();
        assert_eq!(image_ref.url, data_url);
        assert_eq!(image_ref.cache_key.as_str(), &data_url[..CACHE_KEY_LEN]);
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_normalize_inline_invalid_format() {
        let uploader = CountingUploader::default();
        let result = normalize(ImageInput::inline("data:image/tiff;base64,AAAA"), &uploader).await;
        assert!(matches!(
            result,
            Err(SelfieAiError::Validation(ValidationError::InvalidFormat))
        ));
    }

    #[tokio::test]
    async fn test_normalize_binary_uploads() {
        let uploader = CountingUploader::default();
        let image_ref = normalize(ImageInput::binary("image/png", PNG_MAGIC.to_vec()), &uploader)
            .await
            .unwrap();

        assert_eq!(image_ref.url, "https://storage.example/0/image/png");
        assert_eq!(image_ref.cache_key.as_str(), image_ref.url);
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_normalize_binary_unsupported_never_uploads() {
        let uploader = CountingUploader::default();
        for mime in ["image/bmp", "image/tiff", "application/pdf", ""] {
            let result = normalize(ImageInput::binary(mime, vec![0; 16]), &uploader).await;
            assert!(matches!(
                result,
                Err(SelfieAiError::Validation(ValidationError::UnsupportedFormat(_)))
            ));
        }
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_normalize_binary_too_large() {
        let uploader = CountingUploader::default();
        let bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
        let result = normalize(ImageInput::binary("image/jpeg", bytes), &uploader).await;
        assert!(matches!(
            result,
            Err(SelfieAiError::Validation(ValidationError::TooLarge { .. }))
        ));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_normalize_upload_failure_is_upload_error() {
        let uploader = CountingUploader { fail: true, ..Default::default() };
        let result = normalize(ImageInput::binary("image/gif", vec![0; 8]), &uploader).await;
        match result {
            Err(SelfieAiError::Upload(msg)) => assert!(msg.contains("connection reset")),
            other => panic!("Expected Upload error, got {:?}", other),
        }
    }
}
