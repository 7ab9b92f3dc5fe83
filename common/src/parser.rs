//! APIレスポンスパーサー
//!
//! Gemini のレスポンス本文からJSONを抽出し、解析結果・翻訳結果を厳密にデコードする。
//! 任意フィールドの有無を個別に調べるのではなく、型で受けて
//! 「有効な間取り図 / 入力不正 / レスポンス不正」の3通りに振り分ける。

use crate::error::{Error, Result};
use crate::types::{Dosha, Report};
use serde::Deserialize;

/// 解析レスポンスのデコード結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// 間取り図として解析できた
    ValidFloorPlan(Report),
    /// AIが間取り図ではないと判定した（理由はAIが返した場合のみ）
    InvalidInput { reason: Option<String> },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnalysis {
    is_floor_plan: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    overall_summary: Option<String>,
    #[serde(default)]
    doshas: Option<Vec<Dosha>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTranslation {
    #[serde(default)]
    overall_summary: Option<String>,
    #[serde(default)]
    doshas: Option<Vec<Dosha>>,
}

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
/// 3. エラー
///
/// # Examples
/// ```
/// use vastu_common::extract_json;
///
/// let response = "Result: {\"is_floor_plan\": false}";
/// let json = extract_json(response).unwrap();
/// assert_eq!(json, "{\"is_floor_plan\": false}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("no JSON object found in response".into()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// 解析レスポンスをデコード
///
/// - スキーマ外のフィールドや型違いは `MalformedResponse`
/// - `is_floor_plan: false` は `InvalidInput`
/// - 有効なのにサマリーまたはドーシャ配列が欠けていれば `MalformedResponse`
pub fn decode_analysis(response: &str) -> Result<AnalysisOutcome> {
    let json_str = extract_json(response)
        .map_err(|e| Error::MalformedResponse(e.to_string()))?;
    let raw: RawAnalysis = serde_json::from_str(json_str)
        .map_err(|e| Error::MalformedResponse(format!("analysis JSON: {}", e)))?;

    if !raw.is_floor_plan {
        return Ok(AnalysisOutcome::InvalidInput {
            reason: non_empty(raw.error),
        });
    }

    match (non_empty(raw.overall_summary), raw.doshas) {
        (Some(summary), Some(findings)) => {
            Ok(AnalysisOutcome::ValidFloorPlan(Report { summary, findings }))
        }
        (None, _) => Err(Error::MalformedResponse("overall_summary is missing".into())),
        (_, None) => Err(Error::MalformedResponse("doshas is missing".into())),
    }
}

/// 翻訳レスポンスをデコード
///
/// 翻訳元と件数・改善アイテム数が一致しない場合も `MalformedResponse` とする。
pub fn decode_translation(response: &str, source: &Report) -> Result<Report> {
    let json_str = extract_json(response)
        .map_err(|e| Error::MalformedResponse(e.to_string()))?;
    let raw: RawTranslation = serde_json::from_str(json_str)
        .map_err(|e| Error::MalformedResponse(format!("translation JSON: {}", e)))?;

    let report = match (non_empty(raw.overall_summary), raw.doshas) {
        (Some(summary), Some(findings)) => Report { summary, findings },
        (None, _) => return Err(Error::MalformedResponse("translated overall_summary is missing".into())),
        (_, None) => return Err(Error::MalformedResponse("translated doshas is missing".into())),
    };

    if !report.same_shape(source) {
        return Err(Error::MalformedResponse(format!(
            "translation changed the report structure ({} doshas, expected {})",
            report.findings.len(),
            source.findings.len()
        )));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "is_floor_plan": true,
        "error": null,
        "overall_summary": "A well balanced home with minor issues.",
        "doshas": [
            {
                "location": "Kitchen in Northeast",
                "problem": "Fire element placed in the water zone.",
                "impact": "Health and peace of mind may suffer.",
                "remedy": { "description": "Place a yellow bulb in the kitchen.", "items": ["Yellow bulb"] }
            },
            {
                "location": "Toilet in Brahmasthan",
                "problem": "The centre should stay open.",
                "impact": "Blocked energy flow.",
                "remedy": { "description": "Keep the door closed.", "items": [] }
            }
        ]
    }"#;

    // =============================================
    // extract_json テスト
    // =============================================

    #[test]
    fn test_extract_json_with_block() {
        let response = "Here is the analysis:\n```json\n{\"is_floor_plan\": true}\n```\nDone.";
        assert_eq!(extract_json(response).unwrap(), "{\"is_floor_plan\": true}");
    }

    #[test]
    fn test_extract_json_raw() {
        let response = r#"{"a": {"b": 1}}"#;
        assert_eq!(extract_json(response).unwrap(), response);
    }

    #[test]
    fn test_extract_json_error() {
        let result = extract_json("No JSON here, just plain text.");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    // =============================================
    // decode_analysis テスト
    // =============================================

    #[test]
    fn test_decode_valid_floor_plan() {
        let outcome = decode_analysis(VALID).unwrap();
        let AnalysisOutcome::ValidFloorPlan(report) = outcome else {
            panic!("Expected ValidFloorPlan");
        };
        assert_eq!(report.summary, "A well balanced home with minor issues.");
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.findings[0].location, "Kitchen in Northeast");
        assert_eq!(report.findings[0].remedy.items, vec!["Yellow bulb".to_string()]);
        assert!(report.findings[1].remedy.items.is_empty());
    }

    #[test]
    fn test_decode_not_floor_plan_with_reason() {
        let response = r#"{"is_floor_plan": false, "error": "This is a photo of a cat."}"#;
        let outcome = decode_analysis(response).unwrap();
        assert_eq!(
            outcome,
            AnalysisOutcome::InvalidInput { reason: Some("This is a photo of a cat.".to_string()) }
        );
    }

    #[test]
    fn test_decode_not_floor_plan_without_reason() {
        let outcome = decode_analysis(r#"{"is_floor_plan": false, "error": ""}"#).unwrap();
        assert_eq!(outcome, AnalysisOutcome::InvalidInput { reason: None });
    }

    #[test]
    fn test_decode_missing_summary() {
        let response = r#"{"is_floor_plan": true, "doshas": []}"#;
        let err = decode_analysis(response).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(msg) if msg.contains("overall_summary")));
    }

    #[test]
    fn test_decode_missing_doshas() {
        let response = r#"{"is_floor_plan": true, "overall_summary": "ok"}"#;
        let err = decode_analysis(response).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(msg) if msg.contains("doshas")));
    }

    #[test]
    fn test_decode_rejects_unknown_field() {
        let response = r#"{"is_floor_plan": true, "overall_summary": "ok", "doshas": [], "score": 7}"#;
        assert!(matches!(decode_analysis(response), Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn test_decode_rejects_incomplete_dosha() {
        let response = r#"{"is_floor_plan": true, "overall_summary": "ok",
            "doshas": [{"location": "Hall", "problem": "p", "impact": "i"}]}"#;
        assert!(matches!(decode_analysis(response), Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn test_decode_missing_flag_is_malformed() {
        let response = r#"{"overall_summary": "ok", "doshas": []}"#;
        assert!(matches!(decode_analysis(response), Err(Error::MalformedResponse(_))));
    }

    // =============================================
    // decode_translation テスト
    // =============================================

    fn source_report() -> Report {
        match decode_analysis(VALID).unwrap() {
            AnalysisOutcome::ValidFloorPlan(report) => report,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_decode_translation_preserves_shape() {
        let source = source_report();
        let response = r#"```json
{
  "overall_summary": "मामूली समस्याओं के साथ एक संतुलित घर।",
  "doshas": [
    {"location": "ईशान (Northeast) में रसोई", "problem": "p", "impact": "i",
     "remedy": {"description": "पीला बल्ब लगाएं।", "items": ["पीला बल्ब"]}},
    {"location": "ब्रह्मस्थान में शौचालय", "problem": "p", "impact": "i",
     "remedy": {"description": "दरवाज़ा बंद रखें।", "items": []}}
  ]
}
```"#;
        let translated = decode_translation(response, &source).unwrap();
        assert_eq!(translated.findings.len(), source.findings.len());
        assert_eq!(translated.findings[0].remedy.items, vec!["पीला बल्ब".to_string()]);
    }

    #[test]
    fn test_decode_translation_missing_fields() {
        let source = source_report();
        let err = decode_translation(r#"{"overall_summary": "x"}"#, &source).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_translation_count_mismatch() {
        let source = source_report();
        let response = r#"{"overall_summary": "x", "doshas": []}"#;
        let err = decode_translation(response, &source).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(msg) if msg.contains("expected 2")));
    }
}
