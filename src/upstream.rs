use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::data_models::{ChatRequest, ChatResponse};
use crate::error::UpstreamError;

/// Client for the chat-completion API everything is proxied to.
///
/// No timeout and no retry: a hung upstream only holds up the request that
/// is waiting on it.
#[derive(Debug, Clone)]
pub struct PerplexityClient {
    client: Client,
    url: String,
    api_key: String,
}

impl PerplexityClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> PerplexityClient {
        PerplexityClient {
            client: Client::new(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> PerplexityClient {
        Self::new(&config.upstream_url, &config.perplexity_api_key)
    }

    /// POST `body` upstream and return whatever JSON comes back, whatever the status.
    pub async fn call<B: Serialize + ?Sized>(&self, body: &B) -> Result<Value, UpstreamError> {
        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            log::warn!("upstream {} answered {}", self.url, status);
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Pass an arbitrary JSON body through unchanged.
    pub async fn forward(&self, body: &Value) -> Result<Value, UpstreamError> {
        self.call(body).await
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, UpstreamError> {
        let value = self.call(request).await?;
        Ok(serde_json::from_value(value)?)
    }
}
