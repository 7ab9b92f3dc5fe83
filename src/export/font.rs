//! 埋め込みフォントの読み込みと字形整形
//!
//! デーヴァナーガリーは文字の並び替えや結合字があり、文字コードをそのまま
//! グリフに置き換えても正しく描けない。rustybuzz でGSUB/GPOSを適用した
//! グリフ列を求め、PDFにはグリフIDと位置を書き込む。

use crate::error::{Result, VastuError};
use rustybuzz::{Face, UnicodeBuffer};
use std::path::{Path, PathBuf};
use tracing::debug;
use vastu_common::Language;

/// デーヴァナーガリーを含む代表的なフォントの配置先
const DEVANAGARI_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoSansDevanagari-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansDevanagari-Regular.ttf",
    "/usr/share/fonts/google-noto/NotoSansDevanagari-Regular.ttf",
    "/usr/share/fonts/truetype/lohit-devanagari/Lohit-Devanagari.ttf",
    "/usr/share/fonts/lohit-devanagari/Lohit-Devanagari.ttf",
    "/Library/Fonts/NotoSansDevanagari-Regular.ttf",
    "C:\\Windows\\Fonts\\Nirmala.ttf",
    "C:\\Windows\\Fonts\\mangal.ttf",
];

/// 設定が無いときに使うシステムフォントを探す
///
/// 基準言語は組み込みフォントで足りるので探さない。
pub fn find_system_font(language: Language) -> Option<PathBuf> {
    if language.is_base() {
        return None;
    }
    let found = DEVANAGARI_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file());
    debug!(language = %language.code(), font = ?found, "system font lookup");
    found
}

/// フォントファイルを読む
pub fn read_font(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| VastuError::PdfGeneration(format!("cannot open font {}: {}", path.display(), e)))
}

/// 整形済みグリフ。位置は行頭からのpt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// 元テキストのバイト位置
    pub cluster: u32,
    pub x_pt: f32,
    pub y_pt: f32,
}

/// 1行分の整形結果
#[derive(Debug, Clone, Default)]
pub struct ShapedLine {
    pub glyphs: Vec<ShapedGlyph>,
    pub width_pt: f32,
}

impl ShapedLine {
    /// フォントに無い文字（.notdef）が含まれるか
    pub fn has_missing_glyphs(&self) -> bool {
        self.glyphs.iter().any(|g| g.glyph_id == 0)
    }
}

pub struct Shaper<'a> {
    face: Face<'a>,
    units_per_em: f32,
}

impl<'a> Shaper<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let face = Face::from_slice(data, 0)
            .ok_or_else(|| VastuError::PdfGeneration("font is not a readable TrueType/OpenType face".into()))?;
        let units_per_em = face.units_per_em() as f32;
        if units_per_em <= 0.0 {
            return Err(VastuError::PdfGeneration("font has no units per em".into()));
        }
        Ok(Self { face, units_per_em })
    }

    pub fn shape_line(&self, text: &str, font_size_pt: f32) -> ShapedLine {
        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        // 文字種から書字方向と用字系を決める
        buffer.guess_segment_properties();

        let output = rustybuzz::shape(&self.face, &[], buffer);
        let scale = font_size_pt / self.units_per_em;

        let mut pen_x = 0.0f32;
        let mut pen_y = 0.0f32;
        let glyphs = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| {
                let glyph = ShapedGlyph {
                    glyph_id: u16::try_from(info.glyph_id).unwrap_or(0),
                    cluster: info.cluster,
                    x_pt: pen_x + pos.x_offset as f32 * scale,
                    y_pt: pen_y + pos.y_offset as f32 * scale,
                };
                pen_x += pos.x_advance as f32 * scale;
                pen_y += pos.y_advance as f32 * scale;
                glyph
            })
            .collect();

        ShapedLine {
            glyphs,
            width_pt: pen_x,
        }
    }
}
