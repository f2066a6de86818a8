use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::provider::{ChatOptions, ChatProvider, ProviderReply};

const OPENAI_API_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, OPENAI_API_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the first choice (`{"message": {"content": ...}}`) when there
    /// is one, otherwise the whole response body.
    pub async fn query(&self, model: &str, prompt: &str) -> Result<Value> {
        let request = OpenAIRequest {
            model,
            messages: vec![OpenAIMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API error {}: {}", status, text));
        }

        let mut body: Value = response.json().await?;
        let first_choice = body
            .get_mut("choices")
            .and_then(Value::as_array_mut)
            .filter(|choices| !choices.is_empty())
            .map(|choices| choices.swap_remove(0));

        Ok(first_choice.unwrap_or(body))
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "gpt-4o".to_string(),
            "gpt-4o-mini".to_string(),
            "gpt-4-turbo".to_string(),
            "gpt-3.5-turbo".to_string(),
        ]
    }
}

#[async_trait]
impl ChatProvider for OpenAIClient {
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ProviderReply> {
        self.query(&options.model, prompt).await.map(ProviderReply::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_chat_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "Hi"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl_test123",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hello from OpenAI"},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let client = OpenAIClient::with_base_url("test-api-key", &server.uri());
        let reply = client
            .chat("Hi", &ChatOptions::new("gpt-4o-mini"))
            .await
            .unwrap();

        match reply {
            ProviderReply::Structured(choice) => {
                assert_eq!(choice["message"]["content"], "Hello from OpenAI");
                assert_eq!(choice["finish_reason"], "stop");
            }
            other => panic!("expected structured reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_without_choices_keeps_body() {
        let server = MockServer::start().await;
        let body = json!({"id": "chatcmpl_test123", "choices": []});
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let client = OpenAIClient::with_base_url("test-api-key", &server.uri());
        let reply = client.chat("Hi", &ChatOptions::new("m")).await.unwrap();
        assert_eq!(reply, ProviderReply::Structured(body));
    }

    #[tokio::test]
    async fn test_chat_unauthorized_is_err() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = OpenAIClient::with_base_url("bad-key", &server.uri());
        let err = client.chat("Hi", &ChatOptions::new("m")).await.unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid api key"));
    }
}
