//! セッション保存のテスト
//!
//! ファイルストアへの保存・復元と、壊れた保存内容の扱いを検証

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;
use vastu_ai::app::{App, AppState};
use vastu_ai::error::{Result, VastuError};
use vastu_ai::session::{self, FileStore, SessionStore, REPORTS_KEY, REQUEST_KEY};
use vastu_common::{AnalysisRequest, EntranceDirection, Language, PropertyType, Report, ReportSet};

fn request() -> AnalysisRequest {
    AnalysisRequest {
        base64_image: "JVBERi0xLjc=".to_string(),
        mime_type: "application/pdf".to_string(),
        entrance_direction: EntranceDirection::West,
        property_type: PropertyType::Commercial,
    }
}

fn report() -> Report {
    Report {
        summary: "Entrance placement is favourable for business.".to_string(),
        findings: vec![],
    }
}

/// 未保存のキーは None
#[test]
fn test_file_store_missing_key() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileStore::new(dir.path());

    assert_eq!(store.get(REPORTS_KEY).unwrap(), None);
}

/// 保存・読み込み・削除
#[test]
fn test_file_store_set_get_remove() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::new(dir.path().join("nested"));

    store.set(REQUEST_KEY, "{\"a\":1}").unwrap();
    assert_eq!(store.get(REQUEST_KEY).unwrap().as_deref(), Some("{\"a\":1}"));
    assert!(dir.path().join("nested").join("lastAnalysisRequest.json").exists());

    store.remove(REQUEST_KEY).unwrap();
    assert_eq!(store.get(REQUEST_KEY).unwrap(), None);

    // 存在しないキーの削除はエラーにしない
    store.remove(REQUEST_KEY).unwrap();
}

/// 依頼とレポートの組を保存して復元する
#[test]
fn test_snapshot_roundtrip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::new(dir.path());
    let reports = ReportSet::with_base(report());

    session::save_snapshot(&mut store, &request(), &reports).unwrap();

    let reopened = FileStore::new(dir.path());
    let snapshot = session::load_snapshot(&reopened).unwrap().expect("snapshot");
    assert_eq!(snapshot.request, request());
    assert_eq!(snapshot.reports, reports);
}

/// 保存形式は `{en, hi}` と camelCase の依頼
#[test]
fn test_persisted_layout() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::new(dir.path());
    session::save_snapshot(&mut store, &request(), &ReportSet::with_base(report())).unwrap();

    let reports: serde_json::Value = serde_json::from_str(&store.get(REPORTS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(reports["en"]["overall_summary"], report().summary);
    assert!(reports["hi"].is_null());

    let request: serde_json::Value = serde_json::from_str(&store.get(REQUEST_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(request["mimeType"], "application/pdf");
    assert_eq!(request["entranceDirection"], "West");
    assert_eq!(request["propertyType"], "commercial");
}

/// 壊れた保存内容はエラーとして検出される
#[test]
fn test_corrupt_snapshot_is_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::new(dir.path());
    store.set(REPORTS_KEY, "{not json").unwrap();
    store.set(REQUEST_KEY, &serde_json::to_string(&request()).unwrap()).unwrap();

    let err = session::load_snapshot(&store).unwrap_err();
    assert!(matches!(err, VastuError::Session(_)));
}

/// 基準言語のレポートが無い保存内容は不正
#[test]
fn test_snapshot_without_base_report_is_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::new(dir.path());
    store.set(REPORTS_KEY, r#"{"en": null, "hi": null}"#).unwrap();
    store.set(REQUEST_KEY, &serde_json::to_string(&request()).unwrap()).unwrap();

    assert!(matches!(session::load_snapshot(&store), Err(VastuError::Session(_))));
}

/// 壊れたセッションからの起動は form になり、保存内容は消える
#[test]
fn test_restore_discards_corrupt_session() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::new(dir.path());
    store.set(REPORTS_KEY, "[]").unwrap();
    store.set(REQUEST_KEY, "{}").unwrap();

    let app = App::restore(store, Language::En);

    assert_eq!(app.state(), AppState::Form);
    assert_eq!(app.store().get(REPORTS_KEY).unwrap(), None);
    assert_eq!(app.store().get(REQUEST_KEY).unwrap(), None);
}

/// 読み込みがI/Oで失敗するストア。削除回数を数える
#[derive(Default)]
struct UnreadableStore {
    removes: Arc<AtomicUsize>,
}

impl SessionStore for UnreadableStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(VastuError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "session directory not readable",
        )))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&mut self, _key: &str) -> Result<()> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 一時的な読み込み失敗では form で起動し、保存内容は消さない
#[test]
fn test_restore_keeps_session_on_io_failure() {
    let store = UnreadableStore::default();
    let removes = store.removes.clone();

    let app = App::restore(store, Language::En);

    assert_eq!(app.state(), AppState::Form);
    assert_eq!(removes.load(Ordering::SeqCst), 0);
}

/// 文字化けした保存ファイルは破損として扱い消す
#[test]
fn test_restore_discards_non_utf8_session() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::new(dir.path());
    session::save_snapshot(&mut store, &request(), &ReportSet::with_base(report())).unwrap();
    std::fs::write(dir.path().join(format!("{}.json", REPORTS_KEY)), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    assert!(matches!(store.get(REPORTS_KEY), Err(VastuError::Session(_))));

    let app = App::restore(store, Language::En);
    assert_eq!(app.state(), AppState::Form);
    assert_eq!(app.store().get(REPORTS_KEY).unwrap(), None);
    assert_eq!(app.store().get(REQUEST_KEY).unwrap(), None);
}

/// ファイルストア経由でも result から復元される
#[test]
fn test_restore_from_file_store() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = FileStore::new(dir.path());
    session::save_snapshot(&mut store, &request(), &ReportSet::with_base(report())).unwrap();

    let mut app = App::restore(FileStore::new(dir.path()), Language::En);
    assert_eq!(app.state(), AppState::Result);
    assert_eq!(app.current_report(), Some(&report()));

    app.reset().unwrap();
    let app = App::restore(FileStore::new(dir.path()), Language::En);
    assert_eq!(app.state(), AppState::Form);
}
