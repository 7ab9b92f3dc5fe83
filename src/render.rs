//! 端末への表示
//!
//! 見出し文言はPDFと同じ `ReportLabels` を使い、翻訳テーブル経由で表示言語に合わせる。

use crate::error::VastuError;
use vastu_common::i18n::{t, t_with};
use vastu_common::{wrap_text, AnalysisRequest, Language, Report, ReportLabels, TranslationStore};

const TERMINAL_WIDTH: usize = 78;

/// レポートを端末表示用の行に整形
pub fn format_report(report: &Report, request: Option<&AnalysisRequest>, language: Language) -> Vec<String> {
    let labels = ReportLabels::build(TranslationStore::global(), language, report, request);
    let mut out = Vec::new();

    out.push(format!("=== {} ===", labels.title));
    out.push(labels.subtitle.clone());
    if let Some(details) = &labels.details {
        out.push(details.clone());
    }

    out.push(String::new());
    out.push(format!("■ {}", labels.summary_title));
    out.extend(wrap_text(&report.summary, TERMINAL_WIDTH));

    out.push(String::new());
    out.push(format!("■ {}", labels.doshas_title));
    if report.findings.is_empty() {
        out.push(labels.no_doshas.clone());
    }

    for (i, dosha) in report.findings.iter().enumerate() {
        out.push(String::new());
        out.push(format!("[{}]", labels.card_title(i)));
        push_section(&mut out, &labels.problem, &dosha.problem);
        push_section(&mut out, &labels.impact, &dosha.impact);
        push_section(&mut out, &labels.remedy, &dosha.remedy.description);
        if !dosha.remedy.items.is_empty() {
            out.push(format!("  {}:", labels.items));
            for item in &dosha.remedy.items {
                out.push(format!("    • {}", item));
            }
        }
    }

    out.push(String::new());
    out.extend(wrap_text(&labels.disclaimer, TERMINAL_WIDTH));
    out
}

fn push_section(out: &mut Vec<String>, label: &str, text: &str) {
    out.push(format!("  {}:", label));
    for line in wrap_text(text, TERMINAL_WIDTH - 4) {
        out.push(format!("    {}", line));
    }
}

pub fn print_report(report: &Report, request: Option<&AnalysisRequest>, language: Language) {
    for line in format_report(report, request, language) {
        println!("{}", line);
    }
}

/// エラーの表示文言
///
/// 入力検証エラーは翻訳テーブルの文言、それ以外は `user_message` を使う。
pub fn error_text(error: &VastuError, language: Language) -> String {
    match error {
        VastuError::FileTooLarge { .. } => t(language, "form_error_file_size"),
        VastuError::UnsupportedFileType(_) => t(language, "form_error_file_type"),
        VastuError::MissingField(_) => t(language, "form_error_missing_fields"),
        other => other.user_message(),
    }
}

pub fn print_error(message: &str, language: Language) {
    eprintln!("✖ {}: {}", t(language, "form_error_title"), message);
}

pub fn pdf_saved_text(path: &std::path::Path, language: Language) -> String {
    t_with(language, "result_pdf_saved", &[("path", &path.display())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use vastu_common::{Dosha, EntranceDirection, PropertyType, Remedy};

    fn report() -> Report {
        Report {
            summary: "Mostly balanced layout.".into(),
            findings: vec![Dosha {
                location: "Kitchen in Northeast".into(),
                problem: "Fire element in the water zone.".into(),
                impact: "Health issues.".into(),
                remedy: Remedy {
                    description: "Place a copper pyramid.".into(),
                    items: vec!["Copper pyramid".into()],
                },
            }],
        }
    }

    #[test]
    fn test_format_report_english() {
        let request = AnalysisRequest {
            base64_image: String::new(),
            mime_type: "image/png".into(),
            entrance_direction: EntranceDirection::North,
            property_type: PropertyType::Commercial,
        };
        let lines = format_report(&report(), Some(&request), Language::En);

        assert_eq!(lines[0], "=== Your Vastu Analysis Report ===");
        assert!(lines.contains(&"Entrance: North | Property: Commercial".to_string()));
        assert!(lines.contains(&"[Dosha #1: Kitchen in Northeast]".to_string()));
        assert!(lines.contains(&"    • Copper pyramid".to_string()));
    }

    #[test]
    fn test_format_report_without_doshas() {
        let empty = Report {
            summary: "All good.".into(),
            findings: vec![],
        };
        let lines = format_report(&empty, None, Language::En);
        assert!(lines.contains(&"No significant doshas were found.".to_string()));
    }

    #[test]
    fn test_validation_errors_are_localized() {
        let err = VastuError::FileTooLarge { size: 5, limit: 4 };
        assert_eq!(
            error_text(&err, Language::En),
            "File is too large. Please upload a file smaller than 4MB."
        );
        let err = VastuError::NotFloorPlan("This looks like a cat.".into());
        assert_eq!(error_text(&err, Language::Hi), "This looks like a cat.");
    }
}
