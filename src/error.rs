use thiserror::Error;

/// 汎用の「再試行してください」メッセージ（英語）
pub const GENERIC_ANALYSIS_MESSAGE: &str = "Failed to generate Vastu analysis. Please try again.";
pub const GENERIC_TRANSLATION_MESSAGE: &str = "Failed to translate the Vastu report. Please try again.";

#[derive(Error, Debug)]
pub enum VastuError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gemini API key is not set. Run `vastu-ai config --set-api-key YOUR_KEY` or set GEMINI_API_KEY")]
    MissingApiKey,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File is too large ({size} bytes). The limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// AIが間取り図ではないと判定（メッセージはそのまま利用者に見せる）
    #[error("{0}")]
    NotFloorPlan(String),

    #[error("Invalid response format from AI: {0}")]
    MalformedResponse(String),

    #[error("Invalid translation response format from AI: {0}")]
    MalformedTranslation(String),

    #[error("{}", GENERIC_ANALYSIS_MESSAGE)]
    AnalysisFailed(String),

    #[error("{}", GENERIC_TRANSLATION_MESSAGE)]
    TranslationFailed(String),

    #[error("API call failed: {0}")]
    ApiCall(String),

    #[error("Cannot {action} while the app is in the {state} state")]
    InvalidTransition { action: &'static str, state: &'static str },

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("PDF generation error: {0}")]
    PdfGeneration(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] vastu_common::Error),
}

impl VastuError {
    /// 利用者が入力を直せば解決するエラーか（入力検証 / 間取り図でない）
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            VastuError::FileNotFound(_)
                | VastuError::FileTooLarge { .. }
                | VastuError::UnsupportedFileType(_)
                | VastuError::MissingField(_)
                | VastuError::NotFloorPlan(_)
        )
    }

    /// 画面に出すメッセージ
    ///
    /// レスポンス不正・通信エラーは詳細を出さず再試行を促す。
    pub fn user_message(&self) -> String {
        match self {
            VastuError::MalformedResponse(_) | VastuError::ApiCall(_) => {
                GENERIC_ANALYSIS_MESSAGE.to_string()
            }
            VastuError::MalformedTranslation(_) => GENERIC_TRANSLATION_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// 内部詳細（ログ用）
    pub fn detail(&self) -> String {
        match self {
            VastuError::AnalysisFailed(detail) | VastuError::TranslationFailed(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VastuError>;
