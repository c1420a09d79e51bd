use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};
use crate::modality::Modality;

#[derive(Serialize)]
struct BackendRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct BackendResponse {
    result: String,
}

/// Client for a local proxy backend exposing `POST /api/{type}`.
/// The result is plain text for the text modality and a media URL otherwise.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, modality: Modality) -> String {
        format!("{}/api/{}", self.base_url, modality.as_str())
    }

    pub async fn generate(&self, modality: Modality, prompt: &str) -> GenerationResult<String> {
        let response = self
            .client
            .post(self.endpoint(modality))
            .json(&BackendRequest { prompt })
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationError::Transport(format!(
                "Failed to generate content ({})",
                response.status()
            )));
        }

        let backend_response: BackendResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(backend_response.result)
    }
}
