use crate::error::{Result, VastuError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vastu_common::{EntranceDirection, Language, PropertyType};

#[derive(Parser)]
#[command(name = "vastu-ai")]
#[command(about = "間取り図のヴァーストゥAI解析・PDFレポート生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 表示言語 (en/hi)。省略時は設定ファイルの既定言語
    #[arg(short, long, global = true)]
    pub lang: Option<Language>,

    /// セッション保存先ディレクトリ
    #[arg(long, global = true)]
    pub session_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 間取り図を解析してレポートを表示
    Analyze {
        /// 間取り図ファイル (PNG/JPG/WEBP/PDF, 4MBまで)
        #[arg(required = true)]
        file: PathBuf,

        /// 玄関の向き (north/northeast/.../n/ne/...)。省略時は対話入力
        #[arg(short, long)]
        direction: Option<EntranceDirection>,

        /// 物件種別 (residential/commercial)。省略時は対話入力
        #[arg(short, long)]
        property_type: Option<PropertyType>,

        /// 解析後にPDFを出力
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// 失敗時に再試行を確認しない
        #[arg(long)]
        no_retry: bool,
    },

    /// セッションに保存されたレポートを表示
    Show,

    /// 表示中の言語のレポートをPDF出力
    Export {
        /// 出力ファイル/ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// セッションを消去して新しい解析に備える
    Reset,

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// モデル名を設定
        #[arg(long)]
        set_model: Option<String>,

        /// PDF用TrueTypeフォントを設定
        #[arg(long)]
        set_font: Option<PathBuf>,

        /// 既定の表示言語を設定
        #[arg(long)]
        set_language: Option<Language>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 未指定の項目を対話入力で埋める
///
/// 端末でない場合はどの項目も同じく入力不足のエラーにする。
pub fn fill_missing<T>(
    value: Option<T>,
    field: &'static str,
    interactive: bool,
    prompt: impl FnOnce() -> Result<T>,
) -> Result<T> {
    match value {
        Some(value) => Ok(value),
        None if interactive => prompt(),
        None => Err(VastuError::MissingField(field)),
    }
}
