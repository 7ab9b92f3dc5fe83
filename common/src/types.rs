//! 解析結果・入力の型定義
//!
//! CLIとテストで共有される型:
//! - Report / Dosha / Remedy: AIが返すVastu診断レポート
//! - AnalysisRequest: 1回の解析依頼（画像 + 入口方位 + 物件種別）
//! - ReportSet: 言語ごとのレポート（英語が基準、ヒンディー語は翻訳）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vastu診断レポート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Report {
    #[serde(rename = "overall_summary")]
    pub summary: String,

    #[serde(rename = "doshas")]
    pub findings: Vec<Dosha>,
}

/// 検出されたドーシャ（Vastu原則違反）1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dosha {
    pub location: String,
    pub problem: String,
    pub impact: String,
    pub remedy: Remedy,
}

/// 改善策
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Remedy {
    pub description: String,
    pub items: Vec<String>,
}

impl Report {
    /// 構造（件数・改善アイテム数）が一致するか
    ///
    /// 翻訳前後で内容の対応関係が保たれているかの確認に使う。
    pub fn same_shape(&self, other: &Report) -> bool {
        self.findings.len() == other.findings.len()
            && self
                .findings
                .iter()
                .zip(&other.findings)
                .all(|(a, b)| a.remedy.items.len() == b.remedy.items.len())
    }
}

/// 対応言語
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// 解析を直接行う基準言語
    pub const BASE: Language = Language::En;

    pub const ALL: [Language; 2] = [Language::En, Language::Hi];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// 翻訳指示で使う英語名
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
        }
    }

    pub fn is_base(&self) -> bool {
        *self == Self::BASE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "hi" | "hindi" => Ok(Language::Hi),
            _ => Err(format!("Unknown language: {}. Use en or hi", s)),
        }
    }
}

/// 正面入口の方位（8方位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntranceDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl EntranceDirection {
    pub const ALL: [EntranceDirection; 8] = [
        EntranceDirection::North,
        EntranceDirection::Northeast,
        EntranceDirection::East,
        EntranceDirection::Southeast,
        EntranceDirection::South,
        EntranceDirection::Southwest,
        EntranceDirection::West,
        EntranceDirection::Northwest,
    ];

    /// プロンプトに埋め込む英語表記
    pub fn as_str(&self) -> &'static str {
        match self {
            EntranceDirection::North => "North",
            EntranceDirection::Northeast => "Northeast",
            EntranceDirection::East => "East",
            EntranceDirection::Southeast => "Southeast",
            EntranceDirection::South => "South",
            EntranceDirection::Southwest => "Southwest",
            EntranceDirection::West => "West",
            EntranceDirection::Northwest => "Northwest",
        }
    }

    /// 翻訳テーブルのキー
    pub fn i18n_key(&self) -> &'static str {
        match self {
            EntranceDirection::North => "direction_north",
            EntranceDirection::Northeast => "direction_northeast",
            EntranceDirection::East => "direction_east",
            EntranceDirection::Southeast => "direction_southeast",
            EntranceDirection::South => "direction_south",
            EntranceDirection::Southwest => "direction_southwest",
            EntranceDirection::West => "direction_west",
            EntranceDirection::Northwest => "direction_northwest",
        }
    }
}

impl fmt::Display for EntranceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntranceDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match normalized.as_str() {
            "north" | "n" => Ok(EntranceDirection::North),
            "northeast" | "ne" => Ok(EntranceDirection::Northeast),
            "east" | "e" => Ok(EntranceDirection::East),
            "southeast" | "se" => Ok(EntranceDirection::Southeast),
            "south" | "s" => Ok(EntranceDirection::South),
            "southwest" | "sw" => Ok(EntranceDirection::Southwest),
            "west" | "w" => Ok(EntranceDirection::West),
            "northwest" | "nw" => Ok(EntranceDirection::Northwest),
            _ => Err(format!("Unknown direction: {}. Use one of N, NE, E, SE, S, SW, W, NW", s)),
        }
    }
}

/// 物件種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Residential,
    Commercial,
}

impl PropertyType {
    pub const ALL: [PropertyType; 2] = [PropertyType::Residential, PropertyType::Commercial];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Residential => "residential",
            PropertyType::Commercial => "commercial",
        }
    }

    pub fn i18n_key(&self) -> &'static str {
        match self {
            PropertyType::Residential => "property_type_residential",
            PropertyType::Commercial => "property_type_commercial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "residential" | "res" | "home" => Ok(PropertyType::Residential),
            "commercial" | "com" | "office" => Ok(PropertyType::Commercial),
            _ => Err(format!("Unknown property type: {}. Use residential or commercial", s)),
        }
    }
}

/// 解析依頼
///
/// 送信時に作成され、以後変更しない。翻訳時に再アップロードせず済むよう保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Base64エンコード済み画像
    pub base64_image: String,
    pub mime_type: String,
    pub entrance_direction: EntranceDirection,
    pub property_type: PropertyType,
}

/// 言語ごとのレポート
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSet {
    #[serde(default)]
    pub en: Option<Report>,
    #[serde(default)]
    pub hi: Option<Report>,
}

impl ReportSet {
    /// 基準言語のレポートのみを持つセット
    pub fn with_base(report: Report) -> Self {
        let mut set = Self::default();
        set.insert(Language::BASE, report);
        set
    }

    pub fn get(&self, language: Language) -> Option<&Report> {
        match language {
            Language::En => self.en.as_ref(),
            Language::Hi => self.hi.as_ref(),
        }
    }

    pub fn insert(&mut self, language: Language, report: Report) {
        match language {
            Language::En => self.en = Some(report),
            Language::Hi => self.hi = Some(report),
        }
    }

    pub fn base(&self) -> Option<&Report> {
        self.get(Language::BASE)
    }

    pub fn contains(&self, language: Language) -> bool {
        self.get(language).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.en.is_none() && self.hi.is_none()
    }
}
