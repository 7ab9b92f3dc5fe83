//! Gemini API クライアント（reqwest）
//!
//! 解析: 画像 + タスクプロンプト + 解析スキーマ（temperature 0.1）
//! 翻訳: 英語レポートのJSON + 翻訳指示 + 翻訳スキーマ

use super::wire::{Content, GeminiRequest, GeminiResponse, GenerationConfig, InlineData, Part};
use super::VastuService;
use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::{Result, VastuError};
use crate::upload::request_fingerprint;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, warn};
use vastu_common::{
    decode_analysis, decode_translation, prompts, schema, AnalysisOutcome, AnalysisRequest, Language, Report,
};

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    analysis_temperature: f32,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VastuError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            analysis_temperature: 0.1,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::new(
            config.get_api_key()?,
            config.model.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?;
        Ok(client
            .with_base_url(config.base_url.clone())
            .with_temperature(config.analysis_temperature))
    }

    /// テストやプロキシ用にベースURLを差し替える
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.analysis_temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_url(&self) -> String {
        format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, self.api_key)
    }

    /// generateContent 呼び出し（共通処理）
    async fn generate(&self, request: &GeminiRequest) -> Result<String> {
        debug!(model = %self.model, "sending request to Gemini");

        let response = self
            .client
            .post(self.build_url())
            .json(request)
            .send()
            .await
            .map_err(|e| VastuError::ApiCall(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(300).collect();
            return Err(VastuError::ApiCall(format!("API error {}: {}", status, preview)));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| VastuError::ApiCall(format!("invalid response body: {}", e)))?;

        match payload.text() {
            Some(text) => {
                debug!(chars = text.len(), "received Gemini response");
                Ok(text)
            }
            None => {
                let reason = payload
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .unwrap_or_else(|| "no candidates".to_string());
                Err(VastuError::ApiCall(format!("empty response ({})", reason)))
            }
        }
    }

    async fn analyze_inner(&self, request: &AnalysisRequest) -> Result<Report> {
        let prompt = prompts::build_analysis_prompt(request.property_type, request.entrance_direction);

        let body = GeminiRequest {
            system_instruction: Content::text(prompts::ANALYSIS_SYSTEM_INSTRUCTION),
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.mime_type.clone(),
                            data: request.base64_image.clone(),
                        },
                    },
                    Part::Text { text: prompt },
                ],
            }],
            generation_config: GenerationConfig::json(schema::analysis_schema(), Some(self.analysis_temperature)),
        };

        let text = self.generate(&body).await?;

        match decode_analysis(&text) {
            Ok(AnalysisOutcome::ValidFloorPlan(report)) => Ok(report),
            Ok(AnalysisOutcome::InvalidInput { reason }) => Err(VastuError::NotFloorPlan(
                reason.unwrap_or_else(|| prompts::default_not_floor_plan_message(request.property_type)),
            )),
            Err(e) => Err(VastuError::MalformedResponse(e.to_string())),
        }
    }

    async fn translate_inner(&self, report: &Report, target: Language) -> Result<Report> {
        let prompt = serde_json::to_string(report)?;

        let body = GeminiRequest {
            system_instruction: Content::text(prompts::translation_system_instruction(target)),
            contents: vec![Content::text(prompt)],
            generation_config: GenerationConfig::json(schema::translation_schema(), None),
        };

        let text = self.generate(&body).await?;

        decode_translation(&text, report).map_err(|e| VastuError::MalformedTranslation(e.to_string()))
    }
}

#[async_trait]
impl VastuService for GeminiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Report> {
        let fingerprint = request_fingerprint(request);
        debug!(
            %fingerprint,
            direction = %request.entrance_direction,
            property_type = %request.property_type,
            "analyzing floor plan"
        );

        match self.analyze_inner(request).await {
            Ok(report) => {
                debug!(%fingerprint, doshas = report.findings.len(), "analysis complete");
                Ok(report)
            }
            Err(e @ VastuError::NotFloorPlan(_)) => {
                warn!(%fingerprint, "image was rejected as not a floor plan");
                Err(e)
            }
            Err(e) => {
                error!(%fingerprint, error = %e, "Gemini analysis failed");
                Err(VastuError::AnalysisFailed(e.to_string()))
            }
        }
    }

    async fn translate(&self, report: &Report, target: Language) -> Result<Report> {
        if target.is_base() {
            return Err(VastuError::TranslationFailed(format!(
                "{} is the base language and is never translated",
                target
            )));
        }

        self.translate_inner(report, target).await.map_err(|e| {
            error!(language = %target, error = %e, "Gemini translation failed");
            VastuError::TranslationFailed(e.to_string())
        })
    }
}
