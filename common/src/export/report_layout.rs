//! PDFレポートのレイアウト計算
//!
//! 描画ライブラリに依存しない部分（文言の組み立て、折り返し、改ページ、座標計算）。
//! 1ページ目にタイトルとサマリー、以降はドーシャ1件ごとに新しいページを使う。

use crate::i18n::TranslationStore;
use crate::types::{AnalysisRequest, Language, Report};

/// 1pt = 0.3528mm
const PT_TO_MM: f32 = 0.3528;

/// Helvetica相当の平均文字幅（em比）
const AVG_CHAR_WIDTH_EM: f32 = 0.5;

/// ページ設定（mm単位）
#[derive(Debug, Clone)]
pub struct PdfLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub footer_height_mm: f32,
    pub line_spacing: f32,
}

impl PdfLayout {
    /// A4縦、余白10mm
    pub fn a4() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            footer_height_mm: 12.0,
            line_spacing: 1.4,
        }
    }

    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - self.margin_mm * 2.0
    }

    /// 本文領域の下端Y座標（PDF座標系、下が0）
    fn content_bottom_mm(&self) -> f32 {
        self.margin_mm + self.footer_height_mm
    }

    fn line_height_mm(&self, style: LineStyle) -> f32 {
        style.font_size_pt() * self.line_spacing * PT_TO_MM
    }

    /// 1行に収まるおおよその文字数
    pub fn chars_per_line(&self, style: LineStyle, indent_mm: f32) -> usize {
        let char_width_mm = style.font_size_pt() * AVG_CHAR_WIDTH_EM * PT_TO_MM;
        (((self.content_width_mm() - indent_mm) / char_width_mm).floor() as usize).max(8)
    }
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self::a4()
    }
}

/// 行の書式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Subtitle,
    Heading,
    Label,
    Body,
    Bullet,
    Footer,
}

impl LineStyle {
    pub fn font_size_pt(&self) -> f32 {
        match self {
            LineStyle::Title => 20.0,
            LineStyle::Subtitle => 12.0,
            LineStyle::Heading => 15.0,
            LineStyle::Label => 11.5,
            LineStyle::Body | LineStyle::Bullet => 10.5,
            LineStyle::Footer => 8.0,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, LineStyle::Title | LineStyle::Heading | LineStyle::Label)
    }

    fn indent_mm(&self) -> f32 {
        match self {
            LineStyle::Bullet => 5.0,
            _ => 0.0,
        }
    }

    /// ブロック前の余白（mm）
    fn space_before_mm(&self) -> f32 {
        match self {
            LineStyle::Heading => 5.0,
            LineStyle::Label => 3.0,
            _ => 0.0,
        }
    }
}

/// 座標確定済みの1行
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: LineStyle,
    pub x_mm: f32,
    pub y_mm: f32,
}

/// 1ページ分の行
#[derive(Debug, Clone, Default)]
pub struct PdfPage {
    pub lines: Vec<PlacedLine>,
}

/// レポート見出し等の文言
#[derive(Debug, Clone)]
pub struct ReportLabels {
    pub title: String,
    pub subtitle: String,
    pub details: Option<String>,
    pub summary_title: String,
    pub doshas_title: String,
    pub no_doshas: String,
    pub problem: String,
    pub impact: String,
    pub remedy: String,
    pub items: String,
    pub disclaimer: String,
    card_titles: Vec<String>,
}

impl ReportLabels {
    /// 翻訳テーブルから文言を組み立てる
    pub fn build(
        store: &TranslationStore,
        language: Language,
        report: &Report,
        request: Option<&AnalysisRequest>,
    ) -> Self {
        let details = request.map(|req| {
            let direction = store.t(language, req.entrance_direction.i18n_key());
            let property = store.t(language, req.property_type.i18n_key());
            store.t_with(
                language,
                "result_request_details",
                &[("direction", &direction), ("propertyType", &property)],
            )
        });

        let card_titles = report
            .findings
            .iter()
            .enumerate()
            .map(|(i, dosha)| {
                let prefix = store.t_with(language, "result_dosha_card_title", &[("index", &(i + 1))]);
                format!("{}: {}", prefix, dosha.location)
            })
            .collect();

        Self {
            title: store.t(language, "result_title"),
            subtitle: store.t(language, "result_subtitle"),
            details,
            summary_title: store.t(language, "result_summary_title"),
            doshas_title: store.t(language, "result_doshas_title"),
            no_doshas: store.t(language, "result_no_doshas"),
            problem: store.t(language, "result_dosha_problem"),
            impact: store.t(language, "result_dosha_impact"),
            remedy: store.t(language, "result_dosha_remedy"),
            items: store.t(language, "result_dosha_items"),
            disclaimer: store.t(language, "footer_disclaimer"),
            card_titles,
        }
    }

    /// ドーシャカードの見出し（"Dosha #1: Kitchen in Northeast"）
    pub fn card_title(&self, index: usize) -> &str {
        self.card_titles.get(index).map(String::as_str).unwrap_or_default()
    }
}

/// テキストを単語単位で折り返す
///
/// 1単語が `max_chars` を超える場合は文字単位で分割する。空行は保持しない。
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(max_chars) {
                    lines.push(chunk.iter().collect());
                }
                continue;
            }

            let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// ページ組み立て用カーソル
struct PageBuilder<'a> {
    layout: &'a PdfLayout,
    pages: Vec<PdfPage>,
    current: PdfPage,
    cursor_mm: f32,
}

impl<'a> PageBuilder<'a> {
    fn new(layout: &'a PdfLayout) -> Self {
        Self {
            layout,
            pages: Vec::new(),
            current: PdfPage::default(),
            cursor_mm: layout.page_height_mm - layout.margin_mm,
        }
    }

    fn new_page(&mut self) {
        if !self.current.lines.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.cursor_mm = self.layout.page_height_mm - self.layout.margin_mm;
    }

    fn push_line(&mut self, text: String, style: LineStyle) {
        let height = self.layout.line_height_mm(style);
        if self.cursor_mm - height < self.layout.content_bottom_mm() {
            self.new_page();
        }
        self.cursor_mm -= height;
        self.current.lines.push(PlacedLine {
            text,
            style,
            x_mm: self.layout.margin_mm + style.indent_mm(),
            y_mm: self.cursor_mm,
        });
    }

    fn push_block(&mut self, text: &str, style: LineStyle) {
        self.cursor_mm -= style.space_before_mm();
        let width = self.layout.chars_per_line(style, style.indent_mm());
        for line in wrap_text(text, width) {
            self.push_line(line, style);
        }
    }

    fn push_bullet(&mut self, text: &str) {
        let width = self.layout.chars_per_line(LineStyle::Bullet, LineStyle::Bullet.indent_mm()).saturating_sub(2);
        for (i, line) in wrap_text(text, width).into_iter().enumerate() {
            let line = if i == 0 { format!("- {}", line) } else { format!("  {}", line) };
            self.push_line(line, LineStyle::Bullet);
        }
    }

    /// フッターを全ページに付けて確定
    fn finish(mut self, footer: &[String]) -> Vec<PdfPage> {
        if !self.current.lines.is_empty() {
            self.pages.push(self.current);
        }
        let layout = self.layout;
        let line_height = layout.line_height_mm(LineStyle::Footer);
        for page in &mut self.pages {
            for (i, text) in footer.iter().rev().enumerate() {
                page.lines.push(PlacedLine {
                    text: text.clone(),
                    style: LineStyle::Footer,
                    x_mm: layout.margin_mm,
                    y_mm: layout.margin_mm + line_height * i as f32,
                });
            }
        }
        self.pages
    }
}

/// レポートをページに割り付ける
///
/// # Arguments
/// * `report` - 出力するレポート
/// * `labels` - 見出し文言（表示言語）
/// * `layout` - ページ設定
/// * `generated_at` - フッターに出す生成日時（任意）
pub fn paginate_report(
    report: &Report,
    labels: &ReportLabels,
    layout: &PdfLayout,
    generated_at: Option<&str>,
) -> Vec<PdfPage> {
    let mut builder = PageBuilder::new(layout);

    // 1ページ目: タイトル + サマリー
    builder.push_block(&labels.title, LineStyle::Title);
    builder.push_block(&labels.subtitle, LineStyle::Subtitle);
    if let Some(details) = &labels.details {
        builder.push_block(details, LineStyle::Subtitle);
    }
    builder.push_block(&labels.summary_title, LineStyle::Heading);
    builder.push_block(&report.summary, LineStyle::Body);
    builder.push_block(&labels.doshas_title, LineStyle::Heading);
    if report.findings.is_empty() {
        builder.push_block(&labels.no_doshas, LineStyle::Body);
    }

    // ドーシャごとに改ページ
    for (index, dosha) in report.findings.iter().enumerate() {
        builder.new_page();
        builder.push_block(labels.card_title(index), LineStyle::Heading);
        builder.push_block(&labels.problem, LineStyle::Label);
        builder.push_block(&dosha.problem, LineStyle::Body);
        builder.push_block(&labels.impact, LineStyle::Label);
        builder.push_block(&dosha.impact, LineStyle::Body);
        builder.push_block(&labels.remedy, LineStyle::Label);
        builder.push_block(&dosha.remedy.description, LineStyle::Body);
        if !dosha.remedy.items.is_empty() {
            builder.push_block(&labels.items, LineStyle::Label);
            for item in &dosha.remedy.items {
                builder.push_bullet(item);
            }
        }
    }

    let mut footer = wrap_text(&labels.disclaimer, layout.chars_per_line(LineStyle::Footer, 0.0));
    if let Some(date) = generated_at {
        footer.push(date.to_string());
    }
    builder.finish(&footer)
}
