// src/connectors/llm.rs
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::AdvisorConfig;
use crate::connectors::assessment::{parse_assessment, Assessment};
use crate::connectors::messages::{ChatMessage, MessagesRequest, MessagesResponse};
use crate::connectors::prompt::{build_prompt, AssessmentRequest};
use crate::connectors::traits::AdvisoryClient;
use crate::error::AdvisoryError;

const API_VERSION: &str = "2023-06-01";

/// Advisory client backed by a hosted language model's messages endpoint.
pub struct LlmAdvisor {
    http_client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl LlmAdvisor {
    pub fn new(config: &AdvisorConfig) -> Result<Self, AdvisoryError> {
        let endpoint = Url::parse(&config.base_url)?.join("/v1/messages")?;
        Ok(Self {
            http_client: Client::new(),
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn complete(&self, prompt: String) -> Result<String, AdvisoryError> {
        if self.api_key.is_empty() {
            return Err(AdvisoryError::MissingApiKey);
        }

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Advisory service rejected request: {} {}", status, body);
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply = response.json::<MessagesResponse>().await?;
        debug!("Advisory reply stop_reason={:?}", reply.stop_reason);
        reply
            .first_text()
            .map(str::to_string)
            .ok_or(AdvisoryError::EmptyResponse)
    }
}

#[async_trait]
impl AdvisoryClient for LlmAdvisor {
    async fn assess(&self, request: &AssessmentRequest) -> Result<Assessment, AdvisoryError> {
        info!("Requesting assessment for {} @ ${}", request.ticker, request.price);
        let prompt = build_prompt(request, Local::now().date_naive());
        let text = self.complete(prompt).await?;
        parse_assessment(&text)
    }
}
