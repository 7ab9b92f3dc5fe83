//! セッションキャッシュ
//!
//! 直近の解析依頼と言語別レポートを2つの固定キーで保存する。
//! 起動時に1回読み込み、結果状態に遷移するたびに書き込む。

pub mod store;

pub use store::{FileStore, MemoryStore, SessionStore};

use crate::error::{Result, VastuError};
use vastu_common::{AnalysisRequest, ReportSet};

/// 言語別レポート `{en, hi}` のキー
pub const REPORTS_KEY: &str = "vastuReports";
/// 直近の解析依頼のキー
pub const REQUEST_KEY: &str = "lastAnalysisRequest";

/// 保存済みの依頼とレポート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub request: AnalysisRequest,
    pub reports: ReportSet,
}

/// 保存内容を読み込む
///
/// 両方のキーが揃っていない場合は `None`。内容が壊れている場合はエラー。
pub fn load_snapshot<S: SessionStore + ?Sized>(store: &S) -> Result<Option<SessionSnapshot>> {
    let (Some(reports), Some(request)) = (store.get(REPORTS_KEY)?, store.get(REQUEST_KEY)?) else {
        return Ok(None);
    };

    let reports: ReportSet = serde_json::from_str(&reports)
        .map_err(|e| VastuError::Session(format!("{} is corrupt: {}", REPORTS_KEY, e)))?;
    let request: AnalysisRequest = serde_json::from_str(&request)
        .map_err(|e| VastuError::Session(format!("{} is corrupt: {}", REQUEST_KEY, e)))?;

    if reports.base().is_none() {
        return Err(VastuError::Session(format!("{} has no base-language report", REPORTS_KEY)));
    }

    Ok(Some(SessionSnapshot { request, reports }))
}

pub fn save_snapshot<S: SessionStore + ?Sized>(
    store: &mut S,
    request: &AnalysisRequest,
    reports: &ReportSet,
) -> Result<()> {
    store.set(REPORTS_KEY, &serde_json::to_string(reports)?)?;
    store.set(REQUEST_KEY, &serde_json::to_string(request)?)?;
    Ok(())
}

pub fn clear_snapshot<S: SessionStore + ?Sized>(store: &mut S) -> Result<()> {
    store.remove(REPORTS_KEY)?;
    store.remove(REQUEST_KEY)?;
    Ok(())
}
