use std::future::Future;

use serde_json::json;

use crate::config::EngineConfig;

/// Seam for the external text-completion service.
///
/// Implementations return the raw candidate text; prompt construction,
/// extraction, and validation stay with the engine.
pub trait GenerativeScorer: Send + Sync {
    fn complete(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerativeError>> + Send;
}

/// Failure modes of a single generative attempt. None of these reach the
/// caller; the engine logs them and falls back to the heuristic scorer.
#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    #[error("generative endpoint not configured")]
    Unconfigured,
    #[error("generative transport failure: {0}")]
    Transport(String),
    #[error("generative scorer answered with status {0}")]
    Status(u16),
    #[error("generative response carried no candidate text")]
    EmptyCandidate,
}

/// Client for a Gemini-style text-generation endpoint.
pub struct HttpGenerativeScorer {
    client: reqwest::Client,
    endpoint_url: Option<String>,
    api_key: Option<String>,
}

impl HttpGenerativeScorer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint_url: config.endpoint_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

impl GenerativeScorer for HttpGenerativeScorer {
    async fn complete(&self, prompt: &str) -> Result<String, GenerativeError> {
        // Fast-fail without touching the network when no endpoint is set.
        let endpoint = self
            .endpoint_url
            .as_deref()
            .ok_or(GenerativeError::Unconfigured)?;

        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.3,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 1024,
            },
        });

        let mut request = self.client.post(endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|err| GenerativeError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerativeError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|err| GenerativeError::Transport(err.to_string()))?;

        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .ok_or(GenerativeError::EmptyCandidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_endpoint_fast_fails_without_io() {
        let scorer = HttpGenerativeScorer::from_config(&EngineConfig::default());
        let error = scorer.complete("prompt").await.expect_err("no endpoint");
        assert!(matches!(error, GenerativeError::Unconfigured));
    }
}
