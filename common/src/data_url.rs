//! 画像入力の検証
//!
//! Data URLとバイナリ画像の形式・サイズチェック、キャッシュキー生成

use crate::error::ValidationError;
use regex::Regex;

/// 受け付けるMIMEタイプ
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/avif",
];

/// 画像サイズ上限（5MiB）
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Data URLから作るキャッシュキーの文字数
pub const CACHE_KEY_LEN: usize = 100;

/// 検証済みのData URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub mime_type: &'a str,
    pub payload: &'a str,
}

impl DataUrl<'_> {
    /// デコード後のおおよそのバイト数
    pub fn decoded_len(&self) -> usize {
        let padding = self.payload.chars().rev().take_while(|&c| c == '=').count();
        (self.payload.len() / 4 * 3).saturating_sub(padding)
    }
}

/// MIMEタイプが許可リストに含まれるか
pub fn is_allowed_mime(mime_type: &str) -> bool {
    let normalized = mime_type.trim().to_ascii_lowercase();
    ALLOWED_MIME_TYPES.contains(&normalized.as_str())
}

/// Data URLをパース
///
/// `data:image/<type>;base64,<payload>` 形式のみ受け付ける
///
/// # Examples
/// ```
/// use selfie_ai_common::parse_data_url;
///
/// let url = parse_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
/// assert_eq!(url.mime_type, "image/png");
/// ```
pub fn parse_data_url(data_url: &str) -> Result<DataUrl<'_>, ValidationError> {
    lazy_static::lazy_static! {
        static ref DATA_URL_RE: Regex = Regex::new(
            r"^data:(image/(?:jpeg|jpg|png|webp|gif|avif));base64,([A-Za-z0-9+/]+={0,2})$"
        ).unwrap();
    }

    let caps = DATA_URL_RE
        .captures(data_url)
        .ok_or(ValidationError::InvalidFormat)?;

    match (caps.get(1), caps.get(2)) {
        (Some(mime), Some(payload)) => Ok(DataUrl {
            mime_type: mime.as_str(),
            payload: payload.as_str(),
        }),
        _ => Err(ValidationError::InvalidFormat),
    }
}

/// Data URLの形式とサイズを検証
pub fn validate_data_url(data_url: &str) -> Result<DataUrl<'_>, ValidationError> {
    let parsed = parse_data_url(data_url)?;
    let size = parsed.decoded_len();
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge { size, limit: MAX_IMAGE_BYTES });
    }
    Ok(parsed)
}

/// バイナリ画像のMIMEタイプとサイズを検証
///
/// MIMEタイプを先に判定する
pub fn validate_binary(mime_type: &str, size: usize) -> Result<(), ValidationError> {
    if !is_allowed_mime(mime_type) {
        return Err(ValidationError::UnsupportedFormat(mime_type.to_string()));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge { size, limit: MAX_IMAGE_BYTES });
    }
    Ok(())
}

/// Data URLのキャッシュキー（先頭100文字）
pub fn data_url_cache_key(data_url: &str) -> String {
    data_url.chars().take(CACHE_KEY_LEN).collect()
}

/// Base64ペイロードからData URLを組み立て
pub fn build_data_url(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime_type.trim().to_ascii_lowercase(), base64_payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    #[test]
    fn test_parse_data_url_all_types() {
        for ext in ["jpeg", "jpg", "png", "webp", "gif", "avif"] {
            let url = format!("data:image/{};base64,AAAA", ext);
            let parsed = parse_data_url(&url).unwrap();
            assert_eq!(parsed.mime_type, format!("image/{}", ext));
            assert_eq!(parsed.payload, "AAAA");
        }
    }

    #[test]
    fn test_parse_data_url_rejects_bad_input() {
        let cases = [
            "",
            "not a data url",
            "data:image/bmp;base64,AAAA",
            "data:image/png;base64,",
            "data:image/png,AAAA",
            "data:text/plain;base64,AAAA",
            "data:image/png;base64,AA AA",
            "https://example.com/selfie.png",
        ];
        for case in cases {
            assert_eq!(parse_data_url(case), Err(ValidationError::InvalidFormat), "{}", case);
        }
    }

    #[test]
    fn test_decoded_len() {
        let parsed = parse_data_url("data:image/png;base64,AAAA").unwrap();
        assert_eq!(parsed.decoded_len(), 3);
        let parsed = parse_data_url("data:image/png;base64,AAA=").unwrap();
        assert_eq!(parsed.decoded_len(), 2);
        let parsed = parse_data_url("data:image/png;base64,AA==").unwrap();
        assert_eq!(parsed.decoded_len(), 1);
    }

    #[test]
    fn test_validate_data_url_too_large() {
        let payload = "A".repeat((MAX_IMAGE_BYTES / 3 + 1) * 4);
        let url = build_data_url("image/jpeg", &payload);
        assert!(matches!(
            validate_data_url(&url),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_binary() {
        assert!(validate_binary("image/jpeg", 1024).is_ok());
        assert!(validate_binary("IMAGE/PNG", MAX_IMAGE_BYTES).is_ok());
        assert_eq!(
            validate_binary("image/bmp", 10),
            Err(ValidationError::UnsupportedFormat("image/bmp".into()))
        );
        assert!(matches!(
            validate_binary("image/png", MAX_IMAGE_BYTES + 1),
            Err(ValidationError::TooLarge { size, .. }) if size == MAX_IMAGE_BYTES + 1
        ));
    }

    #[test]
    fn test_data_url_cache_key() {
        let key = data_url_cache_key(PNG_URL);
        assert_eq!(key.len(), CACHE_KEY_LEN);
        assert_eq!(key, &PNG_URL[..CACHE_KEY_LEN]);

        let short = "data:image/png;base64,AAAA";
        assert_eq!(data_url_cache_key(short), short);
    }

    #[test]
    fn test_build_data_url() {
        assert_eq!(build_data_url("Image/JPEG", "AAAA"), "data:image/jpeg;base64,AAAA");
    }
}
