//! Gemini responseSchema 定義
//!
//! 解析用とレポート翻訳用の2種類。型名はGemini APIのOpenAPIサブセット表記（大文字）。

use serde_json::{json, Value};

/// ドーシャ1件のスキーマ（解析・翻訳で共通）
fn dosha_schema() -> Value {
    let remedy = json!({
        "type": "OBJECT",
        "description": "A simple, actionable remedy that does not require major structural changes.",
        "properties": {
            "description": {
                "type": "STRING",
                "description": "A short description of the remedy."
            },
            "items": {
                "type": "ARRAY",
                "description": "A list of items needed for the remedy.",
                "items": { "type": "STRING" }
            }
        },
        "required": ["description", "items"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "location": {
                "type": "STRING",
                "description": "The specific location or room of the dosha (e.g., 'Kitchen in Northeast', 'Main Entrance facing South', 'CEO Cabin in Southwest')."
            },
            "problem": {
                "type": "STRING",
                "description": "A concise explanation of the Vastu principle that is violated."
            },
            "impact": {
                "type": "STRING",
                "description": "The potential negative impact on residents or business (e.g., financial issues, health problems, lack of peace, employee turnover)."
            },
            "remedy": remedy
        },
        "required": ["location", "problem", "impact", "remedy"]
    })
}

/// 解析レスポンスのスキーマ
///
/// `is_floor_plan` のみ必須。間取り図でない場合は `error` のみを返させる。
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "is_floor_plan": {
                "type": "BOOLEAN",
                "description": "Set to true if the image is a residential or commercial floor plan, false otherwise."
            },
            "error": {
                "type": "STRING",
                "description": "If is_floor_plan is false, provide an error message explaining that the image is not a floor plan. Otherwise, this should be null."
            },
            "overall_summary": {
                "type": "STRING",
                "description": "A brief, encouraging overall summary of the Vastu analysis of the space in 2-3 sentences. Should only be generated if is_floor_plan is true."
            },
            "doshas": {
                "type": "ARRAY",
                "description": "A comprehensive array of all significant Vastu doshas (flaws) found in the floor plan. Should only be generated if is_floor_plan is true.",
                "items": dosha_schema()
            }
        },
        "required": ["is_floor_plan"]
    })
}

/// 翻訳レスポンスのスキーマ
pub fn translation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "overall_summary": {
                "type": "STRING",
                "description": "The translated overall summary of the Vastu report."
            },
            "doshas": {
                "type": "ARRAY",
                "description": "The translated array of Vastu doshas.",
                "items": dosha_schema()
            }
        },
        "required": ["overall_summary", "doshas"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_schema_requires_only_flag() {
        let schema = analysis_schema();
        assert_eq!(schema["required"], json!(["is_floor_plan"]));
        assert_eq!(schema["properties"]["is_floor_plan"]["type"], "BOOLEAN");
        assert_eq!(schema["properties"]["doshas"]["items"]["required"][3], "remedy");
    }

    #[test]
    fn test_remedy_fields_required_in_both_schemas() {
        for schema in [analysis_schema(), translation_schema()] {
            let remedy = &schema["properties"]["doshas"]["items"]["properties"]["remedy"];
            assert_eq!(remedy["required"], json!(["description", "items"]));
        }
    }

    #[test]
    fn test_translation_schema_requires_report_fields() {
        let schema = translation_schema();
        assert_eq!(schema["required"], json!(["overall_summary", "doshas"]));
        assert!(schema["properties"].get("is_floor_plan").is_none());
        let remedy = &schema["properties"]["doshas"]["items"]["properties"]["remedy"];
        assert_eq!(remedy["required"], json!(["description", "items"]));
    }
}
