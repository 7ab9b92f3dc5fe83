use crate::error::{Result, VastuError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vastu_common::Language;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// アップロード上限 4MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub analysis_temperature: f32,
    pub max_upload_bytes: u64,
    /// ヒンディー語PDFに必要なTrueTypeフォント
    pub pdf_font: Option<PathBuf>,
    pub default_language: Language,
    pub session_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_seconds: 120,
            analysis_temperature: 0.1,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            pdf_font: None,
            default_language: Language::BASE,
            session_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| VastuError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("vastu-ai").join("config.json"))
    }

    /// APIキー取得（環境変数を優先）
    pub fn get_api_key(&self) -> Result<String> {
        for var in ["GEMINI_API_KEY", "API_KEY"] {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    return Ok(key);
                }
            }
        }

        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(VastuError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    /// 表示言語（コマンドライン指定 > 設定ファイルの既定言語）
    pub fn resolve_language(&self, cli_override: Option<Language>) -> Language {
        cli_override.unwrap_or(self.default_language)
    }

    /// セッション保存先
    ///
    /// 優先順位: 引数 > VASTU_SESSION_DIR > 設定ファイル > キャッシュディレクトリ
    pub fn resolve_session_dir(&self, cli_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli_override {
            return Ok(dir);
        }
        if let Ok(dir) = std::env::var("VASTU_SESSION_DIR") {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        if let Some(dir) = &self.session_dir {
            return Ok(dir.clone());
        }
        let cache = dirs::cache_dir()
            .ok_or_else(|| VastuError::Config("cache directory not found".into()))?;
        Ok(cache.join("vastu-ai").join("session"))
    }
}
