//! プロンプト生成モジュール
//!
//! - ANALYSIS_SYSTEM_INSTRUCTION: 解析用システム指示
//! - build_analysis_prompt: 間取り図解析タスクのプロンプト
//! - translation_system_instruction: レポート翻訳用システム指示
//! - default_not_floor_plan_message: AIが理由を返さなかった場合の既定メッセージ

use crate::types::{EntranceDirection, Language, PropertyType};

/// 解析用システム指示
pub const ANALYSIS_SYSTEM_INSTRUCTION: &str = "You are an AI expert in Vastu Shastra, an ancient Indian science of architecture. Your task is to analyze residential and commercial floor plans based on authentic Vastu principles.
You will receive an image and must first determine if it's a valid floor plan.
- If it is a floor plan, you will perform a detailed Vastu analysis in English.
- If it is not a floor plan, you will state that clearly in English.
You must always respond in the JSON format defined by the schema. Be precise and base your analysis on established Vastu knowledge, considering factors like the Brahmasthan, elemental zones, and room placements relevant to the property type.";

/// 物件種別ごとの重点項目
fn focus_details(property_type: PropertyType) -> &'static str {
    match property_type {
        PropertyType::Residential => "- Prioritize critical doshas for a residential space (main entrance, kitchen, master bedroom, toilets, Brahmasthan). Identify at least 5-7 significant Vastu doshas if they exist.",
        PropertyType::Commercial => "- Prioritize critical doshas for a commercial space (main entrance, owner's/MD's cabin, staff work area, reception, pantry, accounts department, Brahmasthan). Identify at least 5-7 significant Vastu doshas if they exist.",
    }
}

/// 解析タスクのプロンプト生成
///
/// # Arguments
/// * `property_type` - 物件種別
/// * `direction` - 正面入口の方位
pub fn build_analysis_prompt(property_type: PropertyType, direction: EntranceDirection) -> String {
    let focus = focus_details(property_type);

    format!(
        r#"Task: Analyze the provided image based on Vastu Shastra for a {property_type} property.
Language for response: English.

Step 1: Validate the image.
- Is the image a {property_type} floor plan?
- If NO: Set "is_floor_plan" to false. In the "error" field, provide a message in English explaining that the uploaded image is not a valid floor plan. Do not fill any other fields.
- If YES: Set "is_floor_plan" to true and proceed to Step 2.

Step 2: Vastu Analysis (only if image is a valid floor plan).
- The main entrance faces: {direction}.
- Analyze the floor plan based on Vastu Shastra principles for a {property_type} property.
{focus}
- For each dosha, identify its location, the problem, its impact on the respective property type, and a simple, practical remedy.
- Provide an encouraging and constructive overall summary.
- Ensure the entire analysis (summary, doshas, etc.) is in English.

Follow the provided JSON schema for the response."#
    )
}

/// レポート翻訳用システム指示
pub fn translation_system_instruction(target: Language) -> String {
    let name = target.english_name();
    format!(
        "You are an expert translator specializing in spiritual and architectural texts from English to {name}. Your task is to translate the following JSON object which contains a Vastu Shastra analysis report.
- Translate all string values into accurate, natural-sounding {name}.
- Preserve the exact JSON structure, including all keys and data types.
- For directional terms (e.g., 'Northeast', 'Kitchen in Northeast'), provide the {name} equivalent followed by the English in parentheses, for example: 'ईशान (Northeast)', 'ईशान (Northeast) में रसोई'.
- Do not add, remove, or change any information; only translate the text content.
- Respond ONLY with the translated JSON object."
    )
}

/// 間取り図でないと判定された際の既定メッセージ
pub fn default_not_floor_plan_message(property_type: PropertyType) -> String {
    format!(
        "The uploaded file does not appear to be a {} floor plan. Please upload a correct file.",
        property_type
    )
}
