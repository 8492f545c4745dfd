//! LLM Provider implementations

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Get the provider kind
    fn kind(&self) -> ProviderKind;

    /// Complete a conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

fn map_send_error(error: reqwest::Error, timeout: Duration) -> LLMError {
    if error.is_timeout() {
        LLMError::Timeout { after: timeout }
    } else {
        LLMError::NetworkError {
            message: error.to_string(),
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_seconds = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        return Err(LLMError::RateLimited {
            retry_after_seconds,
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(LLMError::RequestFailed {
        message: format!("HTTP {}: {}", status, body),
    })
}

// ============================================================================
// OpenAI-Compatible Provider (Groq, vLLM, llama.cpp, ...)
// ============================================================================

/// OpenAI-compatible chat completions provider
pub struct OpenAICompatProvider {
    kind: ProviderKind,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(config: &ProviderConfig, client: reqwest::Client) -> Self {
        Self {
            kind: config.kind,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: config.timeout,
            client,
        }
    }

    fn build_request(&self, request: CompletionRequest) -> OpenAIChatRequest {
        let mut messages: Vec<OpenAIChatMessage> = vec![];

        if let Some(system) = request.system {
            messages.push(OpenAIChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }

        for msg in request.messages {
            messages.push(OpenAIChatMessage {
                role: match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content,
            });
        }

        OpenAIChatRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
            response_format: if request.json_mode {
                Some(serde_json::json!({"type": "json_object"}))
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChatChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIChatChoice {
    message: OpenAIChatMessage,
}

#[derive(Deserialize, Default)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[async_trait]
impl LLMProvider for OpenAICompatProvider {
    fn name(&self) -> &'static str {
        match self.kind {
            ProviderKind::Groq => "Groq",
            _ => "OpenAI-Compatible",
        }
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let chat_request = self.build_request(request);

        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self.client.post(&url).json(&chat_request);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;
        let response = check_status(response).await?;

        let chat_response: OpenAIChatResponse =
            response.json().await.map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LLMError::InvalidResponse {
                message: "response contained no choices".to_string(),
            })?;

        let usage = chat_response.usage.unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
            model: chat_response.model.or_else(|| Some(self.model.clone())),
        })
    }
}

// ============================================================================
// Gemini Provider
// ============================================================================

/// Google Gemini `generateContent` provider
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: &ProviderConfig, client: reqwest::Client) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LLMError::ConfigurationError {
                message: "Gemini API key not configured".to_string(),
            })?;
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            timeout: config.timeout,
            client,
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| GeminiContent {
                role: match m.role {
                    MessageRole::Assistant => "model",
                    _ => "user",
                }
                .to_string(),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        // Gemini takes a single system instruction; fold inline system messages into it
        let system_text = request
            .system
            .iter()
            .cloned()
            .chain(
                request
                    .messages
                    .iter()
                    .filter(|m| m.role == MessageRole::System)
                    .map(|m| m.content.clone()),
            )
            .collect::<Vec<_>>()
            .join("\n\n");

        GeminiRequest {
            system_instruction: (!system_text.is_empty()).then(|| GeminiSystemInstruction {
                parts: vec![GeminiPart { text: system_text }],
            }),
            contents,
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: request
                    .json_mode
                    .then(|| "application/json".to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request);

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;
        let response = check_status(response).await?;

        let gemini_response: GeminiResponse =
            response.json().await.map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        let content = gemini_response
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| LLMError::InvalidResponse {
                message: "response contained no candidates".to_string(),
            })?;

        let usage = gemini_response.usage_metadata.unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            },
            model: Some(self.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valuation_request() -> CompletionRequest {
        CompletionRequest::new(vec![Message::user("Value this parcel")])
            .with_system("You are an expert real estate appraiser.")
            .with_temperature(0.3)
            .with_max_tokens(2000)
            .with_json_mode()
    }

    #[test]
    fn test_openai_compat_request_shape() {
        let config = ProviderConfig::new(ProviderKind::Groq, Some("key".to_string()));
        let provider = OpenAICompatProvider::new(&config, reqwest::Client::new());

        let body = serde_json::to_value(provider.build_request(valuation_request())).unwrap();

        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["stream"], false);
        assert_eq!(provider.name(), "Groq");
    }

    #[test]
    fn test_openai_compat_plain_text_has_no_response_format() {
        let config = ProviderConfig::new(ProviderKind::OpenAICompat, None);
        let provider = OpenAICompatProvider::new(&config, reqwest::Client::new());

        let request = CompletionRequest::new(vec![Message::user("hi")]);
        let body = serde_json::to_value(provider.build_request(request)).unwrap();

        assert!(body.get("response_format").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_gemini_request_shape() {
        let config = ProviderConfig::new(ProviderKind::Gemini, Some("key".to_string()));
        let provider = GeminiProvider::new(&config, reqwest::Client::new()).unwrap();

        let body = serde_json::to_value(provider.build_request(&valuation_request())).unwrap();

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are an expert real estate appraiser."
        );
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Value this parcel");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2000);
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let config = ProviderConfig::new(ProviderKind::Gemini, None);
        let result = GeminiProvider::new(&config, reqwest::Client::new());
        assert!(matches!(result, Err(LLMError::ConfigurationError { .. })));
    }

    #[test]
    fn test_gemini_response_parsing() {
        let raw = r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "{\"valuation\": "}, {"text": "1}"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();

        assert_eq!(text, "{\"valuation\": 1}");
        assert_eq!(parsed.usage_metadata.unwrap().total_token_count, 15);
    }
}
