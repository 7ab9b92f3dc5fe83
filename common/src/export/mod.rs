//! レポート出力の共通処理

pub mod report_layout;
