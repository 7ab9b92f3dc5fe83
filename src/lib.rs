//! Vastu AI
//!
//! 間取り図をGeminiで解析し、ヴァーストゥ・シャーストラに基づくレポートを
//! 英語・ヒンディー語で表示・PDF出力するCLIのライブラリ部分。

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod gemini;
pub mod render;
pub mod session;
pub mod upload;
