//! AI解析サービス
//!
//! 状態機械はこのトレイト越しにAIを呼ぶ。本番は Gemini、テストは差し替え実装。

mod client;
mod wire;

pub use client::GeminiClient;

use crate::error::Result;
use async_trait::async_trait;
use vastu_common::{AnalysisRequest, Language, Report};

#[async_trait]
pub trait VastuService: Send + Sync {
    /// 間取り図を解析して基準言語のレポートを返す
    ///
    /// 間取り図でない場合は `NotFloorPlan`、それ以外の失敗は `AnalysisFailed`。
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Report>;

    /// 基準言語のレポートを翻訳する（失敗は `TranslationFailed`）
    async fn translate(&self, report: &Report, target: Language) -> Result<Report>;
}
