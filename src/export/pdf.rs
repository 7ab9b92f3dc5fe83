use super::font::{read_font, ShapedLine, Shaper};
use crate::error::{Result, VastuError};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Pt, TextMatrix,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use vastu_common::{
    paginate_report, AnalysisRequest, Language, PdfLayout, PlacedLine, Report, ReportLabels, TranslationStore,
};

/// PDF出力オプション
#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    /// 埋め込むTrueTypeフォント（ヒンディー語では必須）。指定時は字形整形して描く
    pub font_path: Option<PathBuf>,
    /// フッターに出す生成日時
    pub generated_at: Option<String>,
}

/// 描画に使うフォント
enum Fonts<'a> {
    /// 組み込みHelvetica（ラテン文字のみ）
    Builtin {
        regular: IndirectFontRef,
        bold: IndirectFontRef,
    },
    /// 埋め込みフォント。字形整形したグリフIDで書く
    Shaped {
        font: IndirectFontRef,
        shaper: Shaper<'a>,
    },
}

fn load_fonts<'a>(
    doc: &PdfDocumentReference,
    language: Language,
    font_data: Option<&'a [u8]>,
) -> Result<Fonts<'a>> {
    if let Some(data) = font_data {
        let shaper = Shaper::new(data)?;
        let font = doc
            .add_external_font(data)
            .map_err(|e| VastuError::PdfGeneration(format!("font load error: {:?}", e)))?;
        return Ok(Fonts::Shaped { font, shaper });
    }

    // 組み込みフォントはラテン文字のみ
    if !language.is_base() {
        return Err(VastuError::PdfGeneration(format!(
            "a TrueType font is required for {} reports; set one with `vastu-ai config --set-font PATH`",
            language.english_name()
        )));
    }

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| VastuError::PdfGeneration(format!("font error: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| VastuError::PdfGeneration(format!("font error: {:?}", e)))?;
    Ok(Fonts::Builtin { regular, bold })
}

/// 整形済みグリフを1つずつ位置指定で書く
fn write_shaped_line(layer: &PdfLayerReference, font: &IndirectFontRef, line: &PlacedLine, shaped: &ShapedLine) {
    let origin_x = Pt::from(Mm(line.x_mm)).0;
    let origin_y = Pt::from(Mm(line.y_mm)).0;

    layer.begin_text_section();
    layer.set_font(font, line.style.font_size_pt());
    for glyph in &shaped.glyphs {
        layer.set_text_matrix(TextMatrix::Translate(
            Pt(origin_x + glyph.x_pt),
            Pt(origin_y + glyph.y_pt),
        ));
        layer.write_codepoints([glyph.glyph_id]);
    }
    layer.end_text_section();
}

/// レポートをPDFドキュメントに描画
fn build_document(
    report: &Report,
    request: Option<&AnalysisRequest>,
    language: Language,
    options: &PdfOptions,
) -> Result<PdfDocumentReference> {
    let store = TranslationStore::global();
    let layout = PdfLayout::a4();
    let labels = ReportLabels::build(store, language, report, request);
    let pages = paginate_report(report, &labels, &layout, options.generated_at.as_deref());

    let font_data = options.font_path.as_deref().map(read_font).transpose()?;

    let (doc, first_page, first_layer) = PdfDocument::new(
        labels.title.as_str(),
        Mm(layout.page_width_mm),
        Mm(layout.page_height_mm),
        "Layer 1",
    );
    let fonts = load_fonts(&doc, language, font_data.as_deref())?;

    let mut page_refs = vec![(first_page, first_layer)];
    for _ in 1..pages.len() {
        page_refs.push(doc.add_page(Mm(layout.page_width_mm), Mm(layout.page_height_mm), "Layer 1"));
    }

    for (page, (page_ref, layer_ref)) in pages.iter().zip(page_refs) {
        let layer = doc.get_page(page_ref).get_layer(layer_ref);

        for line in &page.lines {
            match &fonts {
                Fonts::Builtin { regular, bold } => {
                    let font = if line.style.is_bold() { bold } else { regular };
                    layer.use_text(
                        line.text.clone(),
                        line.style.font_size_pt(),
                        Mm(line.x_mm),
                        Mm(line.y_mm),
                        font,
                    );
                }
                Fonts::Shaped { font, shaper } => {
                    let shaped = shaper.shape_line(&line.text, line.style.font_size_pt());
                    if shaped.has_missing_glyphs() {
                        return Err(VastuError::PdfGeneration(format!(
                            "the configured font has no glyphs for {} text: {:?}",
                            language.english_name(),
                            line.text
                        )));
                    }
                    write_shaped_line(&layer, font, line, &shaped);
                }
            }
        }
    }

    Ok(doc)
}

/// PDFをバイト列で生成
pub fn render_pdf(
    report: &Report,
    request: Option<&AnalysisRequest>,
    language: Language,
    options: &PdfOptions,
) -> Result<Vec<u8>> {
    let doc = build_document(report, request, language, options)?;
    doc.save_to_bytes()
        .map_err(|e| VastuError::PdfGeneration(format!("PDF save error: {:?}", e)))
}

/// PDFをファイルに出力
pub fn generate_pdf(
    report: &Report,
    request: Option<&AnalysisRequest>,
    language: Language,
    output_path: &Path,
    options: &PdfOptions,
) -> Result<()> {
    let doc = build_document(report, request, language, options)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| VastuError::PdfGeneration(format!("PDF save error: {:?}", e)))?;

    Ok(())
}
