//! OpenAI-compatible chat-completion client for the model fallback
//!
//! Single attempt, fixed model, temperature pinned by config (0 by default).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result, UpstreamReason};
use crate::generation::{sanitize_reply, PromptBuilder};

use super::llm::LlmProvider;

/// Chat-completion client
pub struct ChatCompletionClient {
    client: Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionClient {
    /// Create a new client; the configured timeout bounds every call
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

/// Map a failed provider response to a reason
pub fn classify_failure(status: StatusCode, body: &str) -> UpstreamReason {
    let body = body.to_lowercase();

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("invalid_api_key")
    {
        return UpstreamReason::InvalidCredential;
    }

    let mentions_bad_model = body.contains("model_not_found")
        || (body.contains("model")
            && ["does not exist", "not supported", "unsupported", "invalid model"]
                .iter()
                .any(|needle| body.contains(needle)));

    if status == StatusCode::NOT_FOUND
        || ((status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY)
            && mentions_bad_model)
    {
        return UpstreamReason::UnsupportedModel;
    }

    UpstreamReason::Unknown
}

fn preview(body: &str) -> String {
    body.chars().take(300).collect()
}

#[async_trait]
impl LlmProvider for ChatCompletionClient {
    async fn ask(&self, question: &str, context: &str) -> Result<String> {
        let prompt = PromptBuilder::build_answer_prompt(question, context);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.config.temperature,
        };

        tracing::info!(
            "Asking {} (context: {} chars)",
            self.config.model,
            context.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let what = if e.is_timeout() { "timed out" } else { "failed" };
                Error::upstream(
                    UpstreamReason::Unknown,
                    format!("Chat completion request {}: {}", what, e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = classify_failure(status, &body);
            return Err(Error::upstream(
                reason,
                format!("Chat completion failed (HTTP {}): {}", status, preview(&body)),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            Error::upstream(
                UpstreamReason::Unknown,
                format!("Failed to parse chat completion response: {}", e),
            )
        })?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        let reply = if self.config.sanitize_reply {
            sanitize_reply(&reply)
        } else {
            reply
        };

        if reply.is_empty() {
            return Err(Error::upstream(
                UpstreamReason::Unknown,
                "Model returned an empty reply",
            ));
        }

        Ok(reply)
    }

    fn name(&self) -> &str {
        "chat-completion"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serve a fake provider that checks auth and the request shape
    async fn spawn_provider(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(request): Json<Value>| {
                let body = body.clone();
                async move {
                    let authorized = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        == Some("Bearer test-key");
                    if !authorized {
                        return (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"error": {"code": "invalid_api_key"}})),
                        );
                    }
                    assert_eq!(request["temperature"], json!(0.0));
                    assert_eq!(request["messages"][0]["role"], "user");
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn config(base_url: String) -> LlmConfig {
        LlmConfig {
            base_url,
            api_key: "test-key".to_string(),
            timeout_secs: 5,
            ..LlmConfig::default()
        }
    }

    fn reply(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[test]
    fn test_classify_failure() {
        assert_eq!(
            classify_failure(StatusCode::UNAUTHORIZED, ""),
            UpstreamReason::InvalidCredential
        );
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, r#"{"error":{"code":"invalid_api_key"}}"#),
            UpstreamReason::InvalidCredential
        );
        assert_eq!(
            classify_failure(StatusCode::NOT_FOUND, ""),
            UpstreamReason::UnsupportedModel
        );
        assert_eq!(
            classify_failure(
                StatusCode::BAD_REQUEST,
                "The model `gpt-9` does not exist or you do not have access to it."
            ),
            UpstreamReason::UnsupportedModel
        );
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, "messages must not be empty"),
            UpstreamReason::Unknown
        );
        assert_eq!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, ""),
            UpstreamReason::Unknown
        );
    }

    #[tokio::test]
    async fn test_successful_reply_is_trimmed() {
        let base_url = spawn_provider(StatusCode::OK, reply("  0.5154 \n")).await;
        let client = ChatCompletionClient::new(&config(base_url)).unwrap();

        let answer = client.ask("What is the margin?", "").await.unwrap();
        assert_eq!(answer, "0.5154");
    }

    #[tokio::test]
    async fn test_sanitize_is_opt_in() {
        let base_url = spawn_provider(StatusCode::OK, reply("0.5154")).await;
        let mut cfg = config(base_url);
        cfg.sanitize_reply = true;
        let client = ChatCompletionClient::new(&cfg).unwrap();

        assert_eq!(client.ask("What is the margin?", "").await.unwrap(), "05154");
    }

    #[tokio::test]
    async fn test_bad_credential() {
        let base_url = spawn_provider(StatusCode::OK, reply("unused")).await;
        let mut cfg = config(base_url);
        cfg.api_key = "wrong".to_string();
        let client = ChatCompletionClient::new(&cfg).unwrap();

        let err = client.ask("hi", "").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream { reason: UpstreamReason::InvalidCredential, .. }
        ));
    }

    #[tokio::test]
    async fn test_unsupported_model() {
        let body = json!({"error": {"code": "model_not_found", "message": "The model does not exist"}});
        let base_url = spawn_provider(StatusCode::NOT_FOUND, body).await;
        let client = ChatCompletionClient::new(&config(base_url)).unwrap();

        let err = client.ask("hi", "").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream { reason: UpstreamReason::UnsupportedModel, .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let base_url = spawn_provider(StatusCode::OK, json!({"choices": []})).await;
        let client = ChatCompletionClient::new(&config(base_url)).unwrap();

        let err = client.ask("hi", "").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { reason: UpstreamReason::Unknown, .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_unknown() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(reply("too late"))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut cfg = config(format!("http://{}/v1", addr));
        cfg.timeout_secs = 1;
        let client = ChatCompletionClient::new(&cfg).unwrap();

        let err = client.ask("hi", "").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { reason: UpstreamReason::Unknown, .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        let client = ChatCompletionClient::new(&config("http://127.0.0.1:1/v1".to_string())).unwrap();

        let err = client.ask("hi", "").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { reason: UpstreamReason::Unknown, .. }));
    }
}
