use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::TextGenerator;
use crate::error::{GenerationError, GenerationResult};

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> GenerationResult<Option<String>> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Transport(format!(
                "Gemini API error {}: {}",
                status, text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(gemini_response.first_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{direct_client, json_body, request_line, serve_once, UNREACHABLE};
    use serde_json::json;

    fn client(endpoint: &str) -> GeminiClient {
        GeminiClient {
            client: direct_client(),
            endpoint: endpoint.to_string(),
            api_key: "gm-key".to_string(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })
        );
    }

    #[test]
    fn test_first_candidate_text() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "first" }, { "text": "ignored" }], "role": "model" } },
                { "content": { "parts": [{ "text": "second" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response.first_text().as_deref(), Some("first"));
    }

    #[test]
    fn test_empty_or_partial_responses_yield_none() {
        for body in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
        ] {
            let response: GeminiResponse = serde_json::from_value(body).unwrap();
            assert!(response.first_text().is_none());
        }
    }

    #[tokio::test]
    async fn test_generate_sends_key_as_query_parameter() {
        let (base, server) =
            serve_once(200, r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#).await;
        let endpoint = format!("{}/v1beta/models/gemini-2.0-flash:generateContent", base);

        let text = client(&endpoint).generate_text("hello").await.unwrap();
        assert_eq!(text.as_deref(), Some("hi"));

        let request = server.await.unwrap();
        assert_eq!(
            request_line(&request),
            "POST /v1beta/models/gemini-2.0-flash:generateContent?key=gm-key HTTP/1.1"
        );
        assert_eq!(
            json_body(&request),
            json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })
        );
    }

    #[tokio::test]
    async fn test_no_candidates_is_none() {
        let (base, _server) = serve_once(200, r#"{"candidates":[]}"#).await;
        assert_eq!(client(&base).generate_text("hello").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failures_are_transport_errors() {
        let (base, _server) = serve_once(403, r#"{"error":{"message":"bad key"}}"#).await;
        let err = client(&base).generate_text("hello").await.unwrap_err();
        assert!(matches!(&err, GenerationError::Transport(msg) if msg.contains("403")));

        let err = client(UNREACHABLE).generate_text("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }
}
