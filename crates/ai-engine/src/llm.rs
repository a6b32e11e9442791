use std::time::Duration;

use async_trait::async_trait;
use klinex_common::KlinexError;
use serde::Deserialize;

/// 界面中可选的模型：(显示名, 模型 ID)
pub const MODEL_OPTIONS: &[(&str, &str)] = &[
    ("Gemini Flash (gemini-2.5-flash)", "gemini-2.5-flash"),
    (
        "Gemini Flash (Preview) (gemini-2.5-flash-preview-04-17)",
        "gemini-2.5-flash-preview-04-17",
    ),
    ("Gemini Pro (gemini-pro)", "gemini-pro"),
    (
        "Gemini Pro (Preview) (gemini-1.5-pro-preview-0409)",
        "gemini-1.5-pro-preview-0409",
    ),
];

/// 低温度，输出更确定
const TEMPERATURE: f64 = 0.1;

/// 文本生成模型
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, KlinexError>;
}

/// Gemini `generateContent` 客户端，API key 通过查询参数传递
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, KlinexError> {
        if api_key.trim().is_empty() {
            return Err(KlinexError::Config("Gemini API key is empty".to_string()));
        }
        if model.trim().is_empty() {
            return Err(KlinexError::Config("model name is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KlinexError::Http(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            model: model.trim().to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(&self.api_key)
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// 拼接第一个候选的全部文本片段
fn extract_text(resp: &GenerateResponse) -> Option<String> {
    let content = resp.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, KlinexError> {
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": { "temperature": TEMPERATURE },
        });

        // 错误信息中去掉 URL，避免泄露 key
        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| KlinexError::Http(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(KlinexError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| KlinexError::Http(format!("cannot parse response: {}", e.without_url())))?;

        extract_text(&parsed)
            .ok_or_else(|| KlinexError::Http("response contained no text".to_string()))
    }
}
