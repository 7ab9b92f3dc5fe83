//! アップロードファイルの検証と送信用変換
//!
//! 上限サイズ超過・未対応形式はここで弾き、API呼び出しまで到達させない。

use crate::error::{Result, VastuError};
use base64::Engine;
use image::ImageFormat;
use sha2::{Digest, Sha256};
use std::path::Path;
use vastu_common::{AnalysisRequest, EntranceDirection, PropertyType};

pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "application/pdf"];

/// 読み込み済みのアップロードファイル
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// ファイルを検証して読み込む
    ///
    /// サイズはメタデータで先に確認し、上限超過なら読み込まない。
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        if !path.is_file() {
            return Err(VastuError::FileNotFound(path.display().to_string()));
        }

        let size = std::fs::metadata(path)?.len();
        if size > max_bytes {
            return Err(VastuError::FileTooLarge { size, limit: max_bytes });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let bytes = std::fs::read(path)?;

        Self::from_bytes(file_name, bytes, max_bytes)
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>, max_bytes: u64) -> Result<Self> {
        let file_name = file_name.into();
        let size = bytes.len() as u64;
        if size > max_bytes {
            return Err(VastuError::FileTooLarge { size, limit: max_bytes });
        }
        if bytes.is_empty() {
            return Err(VastuError::UnsupportedFileType(format!("{} is empty", file_name)));
        }

        let mime_type = detect_mime_type(&file_name, &bytes)
            .ok_or_else(|| VastuError::UnsupportedFileType(file_name.clone()))?;

        Ok(Self {
            file_name,
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    pub fn into_request(self, direction: EntranceDirection, property_type: PropertyType) -> AnalysisRequest {
        AnalysisRequest {
            base64_image: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
            mime_type: self.mime_type,
            entrance_direction: direction,
            property_type,
        }
    }
}

fn mime_from_extension(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// MIMEタイプ判定（拡張子 → 内容の順）
pub fn detect_mime_type(file_name: &str, bytes: &[u8]) -> Option<&'static str> {
    mime_from_extension(file_name).or_else(|| sniff_mime(bytes))
}

/// 解析依頼の識別用ハッシュ（ログ出力用、先頭16桁）
pub fn request_fingerprint(request: &AnalysisRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.base64_image.as_bytes());
    hasher.update(request.mime_type.as_bytes());
    hasher.update(request.entrance_direction.as_str().as_bytes());
    hasher.update(request.property_type.as_str().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}
