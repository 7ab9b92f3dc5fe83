//! アプリケーション状態機械
//!
//! form → loading → result / error の遷移、セッションへの保存、
//! 表示言語の切り替えで翻訳を1回だけ取得する処理を担う。
//!
//! 呼び出しは3段階に分かれる:
//! 1. `begin_*` / `set_language`: 状態を loading にして `PendingCall` を返す
//! 2. `PendingCall::run`: AIサービスを呼ぶ（await は呼び出し側）
//! 3. `App::complete`: 結果を反映する。連番が古ければ捨てる
//!
//! reset・submit・翻訳開始のたびに連番が進むため、途中で破棄された依頼の
//! 応答が後から届いても状態は変わらない。

use crate::error::{Result, VastuError};
use crate::gemini::VastuService;
use crate::session::{self, SessionStore};
use crate::upload::{request_fingerprint, Upload};
use std::path::Path;
use tracing::{debug, warn};
use vastu_common::{AnalysisRequest, EntranceDirection, Language, PropertyType, Report, ReportSet};

/// 画面状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Form,
    Loading,
    Result,
    Error,
}

impl AppState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::Form => "form",
            AppState::Loading => "loading",
            AppState::Result => "result",
            AppState::Error => "error",
        }
    }
}

/// 発行済みで未完了のAI呼び出し
#[derive(Debug, Clone)]
pub struct PendingCall {
    seq: u64,
    kind: PendingKind,
}

#[derive(Debug, Clone)]
enum PendingKind {
    Analysis(AnalysisRequest),
    Translation { base: Report, target: Language },
}

impl PendingCall {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_translation(&self) -> bool {
        matches!(self.kind, PendingKind::Translation { .. })
    }

    /// AIサービスを呼び出す
    pub async fn run<V: VastuService + ?Sized>(self, service: &V) -> Completion {
        let kind = match self.kind {
            PendingKind::Analysis(request) => {
                let result = service.analyze(&request).await;
                CompletionKind::Analysis { request, result }
            }
            PendingKind::Translation { base, target } => {
                let result = service.translate(&base, target).await;
                CompletionKind::Translation { target, result }
            }
        };
        Completion { seq: self.seq, kind }
    }
}

/// AI呼び出しの結果
#[derive(Debug)]
pub struct Completion {
    seq: u64,
    kind: CompletionKind,
}

#[derive(Debug)]
enum CompletionKind {
    Analysis { request: AnalysisRequest, result: Result<Report> },
    Translation { target: Language, result: Result<Report> },
}

impl Completion {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

pub struct App<S: SessionStore> {
    state: AppState,
    language: Language,
    reports: ReportSet,
    last_request: Option<AnalysisRequest>,
    error_message: Option<String>,
    error_fixable: bool,
    seq: u64,
    store: S,
}

impl<S: SessionStore> App<S> {
    /// 空の状態（form）で開始
    pub fn new(store: S, language: Language) -> Self {
        Self {
            state: AppState::Form,
            language,
            reports: ReportSet::default(),
            last_request: None,
            error_message: None,
            error_fixable: false,
            seq: 0,
            store,
        }
    }

    /// 保存済みセッションがあれば result から開始
    ///
    /// 壊れた保存内容は削除して form から開始する。I/Oエラー時は削除せずに form から開始する。
    pub fn restore(store: S, language: Language) -> Self {
        let mut app = Self::new(store, language);

        match session::load_snapshot(&app.store) {
            Ok(Some(snapshot)) => {
                debug!("restored cached analysis from session");
                app.reports = snapshot.reports;
                app.last_request = Some(snapshot.request);
                app.state = AppState::Result;
            }
            Ok(None) => {}
            Err(e @ (VastuError::Session(_) | VastuError::JsonParse(_))) => {
                warn!(error = %e, "discarding corrupt session");
                if let Err(e) = session::clear_snapshot(&mut app.store) {
                    warn!(error = %e, "failed to clear session");
                }
            }
            // 一時的な読み込み失敗では保存内容を消さない
            Err(e) => warn!(error = %e, "session unavailable, starting without it"),
        }

        app
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn reports(&self) -> &ReportSet {
        &self.reports
    }

    pub fn last_request(&self) -> Option<&AnalysisRequest> {
        self.last_request.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// 直近のエラーが入力の修正で解決するものか（間取り図でない等）
    pub fn error_is_user_fixable(&self) -> bool {
        self.state == AppState::Error && self.error_fixable
    }

    /// 表示中の言語のレポート（result 状態のときのみ）
    pub fn current_report(&self) -> Option<&Report> {
        match self.state {
            AppState::Result => self.reports.get(self.language),
            _ => None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// キャッシュ（メモリ・保存先）を空にする
    fn clear_cache(&mut self) -> Result<()> {
        self.reports = ReportSet::default();
        self.last_request = None;
        self.error_message = None;
        self.error_fixable = false;
        session::clear_snapshot(&mut self.store)
    }

    /// 解析を開始（form / error から）
    pub fn begin_submit(&mut self, request: AnalysisRequest) -> Result<PendingCall> {
        if !matches!(self.state, AppState::Form | AppState::Error) {
            return Err(VastuError::InvalidTransition {
                action: "submit",
                state: self.state.as_str(),
            });
        }

        self.clear_cache()?;
        let seq = self.next_seq();
        self.state = AppState::Loading;
        debug!(seq, "analysis started");

        Ok(PendingCall {
            seq,
            kind: PendingKind::Analysis(request),
        })
    }

    /// error 状態からの再試行
    pub fn begin_retry(&mut self, request: AnalysisRequest) -> Result<PendingCall> {
        if self.state != AppState::Error {
            return Err(VastuError::InvalidTransition {
                action: "retry",
                state: self.state.as_str(),
            });
        }
        self.begin_submit(request)
    }

    /// 表示言語を切り替える
    ///
    /// result 状態で、切り替え先のレポートが無く基準言語のレポートがある場合のみ
    /// 翻訳呼び出しを返す。loading 中やキャッシュ済みなら何もしない。
    pub fn set_language(&mut self, language: Language) -> Option<PendingCall> {
        self.language = language;
        self.pending_translation()
    }

    /// 現在の言語で翻訳が必要なら開始する
    pub fn pending_translation(&mut self) -> Option<PendingCall> {
        if self.state != AppState::Result || self.reports.contains(self.language) {
            return None;
        }
        let base = self.reports.base()?.clone();

        let seq = self.next_seq();
        self.state = AppState::Loading;
        self.error_message = None;
        self.error_fixable = false;
        debug!(seq, language = %self.language, "translation started");

        Some(PendingCall {
            seq,
            kind: PendingKind::Translation {
                base,
                target: self.language,
            },
        })
    }

    /// AI呼び出しの結果を反映する
    ///
    /// 反映した場合は true。古い連番の結果は無視して false を返す。
    pub fn complete(&mut self, completion: Completion) -> bool {
        if completion.seq != self.seq || self.state != AppState::Loading {
            debug!(seq = completion.seq, current = self.seq, "ignoring stale completion");
            return false;
        }

        match completion.kind {
            CompletionKind::Analysis { request, result: Ok(report) } => {
                self.reports = ReportSet::with_base(report);
                self.last_request = Some(request);
                self.persist();
                self.state = AppState::Result;
            }
            CompletionKind::Translation { target, result: Ok(report) } => {
                self.reports.insert(target, report);
                self.persist();
                self.state = AppState::Result;
            }
            CompletionKind::Analysis { result: Err(e), .. }
            | CompletionKind::Translation { result: Err(e), .. } => {
                debug!(error = %e.detail(), "AI call failed");
                self.error_message = Some(e.user_message());
                self.error_fixable = e.is_user_fixable();
                self.state = AppState::Error;
            }
        }

        true
    }

    fn persist(&mut self) {
        let Some(request) = &self.last_request else {
            return;
        };
        if let Err(e) = session::save_snapshot(&mut self.store, request, &self.reports) {
            warn!(error = %e, "failed to persist session");
        }
    }

    /// 新しい解析へ（どの状態からでも form に戻る）
    pub fn reset(&mut self) -> Result<()> {
        self.next_seq();
        self.state = AppState::Form;
        self.clear_cache()
    }

    /// 解析し、表示言語が基準言語以外なら続けて翻訳する
    pub async fn submit<V: VastuService + ?Sized>(
        &mut self,
        service: &V,
        request: AnalysisRequest,
    ) -> Result<AppState> {
        let pending = self.begin_submit(request)?;
        self.drive(service, pending).await;
        Ok(self.state)
    }

    /// ファイルを検証してから解析する
    ///
    /// サイズ超過・未対応形式などの検証エラーは状態を変えずに返し、AIサービスは呼ばない。
    /// error 状態から呼べば再試行になる。
    pub async fn submit_file<V: VastuService + ?Sized>(
        &mut self,
        service: &V,
        path: &Path,
        max_bytes: u64,
        direction: EntranceDirection,
        property_type: PropertyType,
    ) -> Result<AppState> {
        let request = Upload::from_path(path, max_bytes)?.into_request(direction, property_type);
        debug!(
            fingerprint = %request_fingerprint(&request),
            %direction,
            %property_type,
            "submitting floor plan"
        );
        self.submit(service, request).await
    }

    pub async fn retry<V: VastuService + ?Sized>(
        &mut self,
        service: &V,
        request: AnalysisRequest,
    ) -> Result<AppState> {
        let pending = self.begin_retry(request)?;
        self.drive(service, pending).await;
        Ok(self.state)
    }

    /// 言語を切り替え、必要なら翻訳を取得する
    pub async fn switch_language<V: VastuService + ?Sized>(&mut self, service: &V, language: Language) -> AppState {
        if let Some(pending) = self.set_language(language) {
            self.drive(service, pending).await;
        }
        self.state
    }

    async fn drive<V: VastuService + ?Sized>(&mut self, service: &V, pending: PendingCall) {
        let completion = pending.run(service).await;
        if self.complete(completion) {
            if let Some(translation) = self.pending_translation() {
                let completion = translation.run(service).await;
                self.complete(completion);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use vastu_common::{EntranceDirection, PropertyType};

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            base64_image: "aGVsbG8=".to_string(),
            mime_type: "image/png".to_string(),
            entrance_direction: EntranceDirection::East,
            property_type: PropertyType::Residential,
        }
    }

    #[test]
    fn test_submit_only_from_form_or_error() {
        let mut app = App::new(MemoryStore::new(), Language::En);
        let _pending = app.begin_submit(request()).unwrap();
        assert_eq!(app.state(), AppState::Loading);

        let err = app.begin_submit(request()).unwrap_err();
        assert!(matches!(err, VastuError::InvalidTransition { action: "submit", state: "loading" }));
    }

    #[test]
    fn test_retry_requires_error_state() {
        let mut app = App::new(MemoryStore::new(), Language::En);
        assert!(matches!(app.begin_retry(request()), Err(VastuError::InvalidTransition { .. })));
    }

    #[test]
    fn test_no_translation_from_form() {
        let mut app = App::new(MemoryStore::new(), Language::En);
        assert!(app.set_language(Language::Hi).is_none());
        assert_eq!(app.language(), Language::Hi);
        assert_eq!(app.state(), AppState::Form);
    }

    #[test]
    fn test_reset_advances_sequence() {
        let mut app = App::new(MemoryStore::new(), Language::En);
        let pending = app.begin_submit(request()).unwrap();
        app.reset().unwrap();
        assert!(pending.seq() < app.seq);
        assert_eq!(app.state(), AppState::Form);
    }
}
