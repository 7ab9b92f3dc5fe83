//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// 応答からJSONを取り出せない
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
