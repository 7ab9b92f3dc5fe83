//! Vastu AI Common Library
//!
//! CLIとテストで共有される型・プロンプト・翻訳テーブル

pub mod types;
pub mod error;
pub mod schema;
pub mod prompts;
pub mod parser;
pub mod i18n;
pub mod export;

pub use types::{AnalysisRequest, Dosha, EntranceDirection, Language, PropertyType, Remedy, Report, ReportSet};
pub use error::{Error, Result};
pub use parser::{decode_analysis, decode_translation, extract_json, AnalysisOutcome};
pub use i18n::TranslationStore;
pub use export::report_layout::{paginate_report, wrap_text, LineStyle, PdfLayout, PdfPage, PlacedLine, ReportLabels};
