pub mod font;
pub mod pdf;

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use vastu_common::Language;

/// 出力先の決定
///
/// ディレクトリ（または拡張子なし）が指定された場合はその下に既定名で作成する。
pub fn output_path_for_report(output: &Path, language: Language, now: DateTime<Local>) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(default_file_name(language, now))
    } else {
        output.to_path_buf()
    }
}

pub fn default_file_name(language: Language, now: DateTime<Local>) -> String {
    format!("vastu-report-{}-{}.pdf", language.code(), now.format("%Y%m%d-%H%M"))
}

/// フッター用の生成日時
pub fn generated_at_text(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M").to_string()
}
