//! Chat completions client.
//!
//! Sends the whole conversation to an OpenAI-compatible
//! `/v1/chat/completions` endpoint and returns the assistant message.
//! One request per turn: no retries, no streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::message::Message;

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Produce the next assistant message for `history`.
    async fn complete(&self, history: &[Message]) -> Result<Message>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

pub struct OpenAiChatClient {
    endpoint: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiChatClient {
    pub fn new(config: &ChatConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        })
    }

    /// Build a client whose key comes from `config.api_key_env`.
    ///
    /// A missing key is not an error here; it surfaces on the first
    /// [`ChatBackend::complete`] call.
    pub fn from_env(config: &ChatConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.as_deref().map_or(true, str::is_empty) {
            warn!("{} is not set, chat turns will fail", config.api_key_env);
        }
        Self::new(config, api_key)
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatClient {
    async fn complete(&self, history: &[Message]) -> Result<Message> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::CredentialMissing {
                var: self.api_key_env.clone(),
            });
        };

        debug!(
            "Sending {} messages to model '{}' at {}",
            history.len(),
            self.model,
            self.endpoint
        );

        let body = ChatRequest {
            model: &self.model,
            messages: history,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(Error::ApiStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| Error::MalformedResponse(e.to_string()))?;
        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| Error::MalformedResponse("response has no choices".into()))?;

        debug!("Reply: {} chars", message.content.chars().count());
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Serve `app` on an ephemeral port and return its completions URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn client_for(endpoint: String, key: Option<&str>) -> OpenAiChatClient {
        let config = ChatConfig {
            endpoint,
            ..ChatConfig::default()
        };
        OpenAiChatClient::new(&config, key.map(String::from)).unwrap()
    }

    #[tokio::test]
    async fn missing_credential_fails_without_network() {
        // nothing listens here; a request would be a Network error instead
        let client = client_for("http://127.0.0.1:9/v1/chat/completions".into(), None);
        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::CredentialMissing { ref var } if var == "OPENAI_API_KEY"));

        let client = client_for("http://127.0.0.1:9/v1/chat/completions".into(), Some(""));
        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::CredentialMissing { .. }));
    }

    #[tokio::test]
    async fn sends_history_and_returns_assistant_message() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], "gpt-3.5-turbo");
                let messages = body["messages"].as_array().unwrap();
                assert_eq!(messages.len(), 2);
                assert_eq!(messages[0]["role"], "system");
                assert_eq!(messages[1]["content"], "元気？");
                Json(json!({
                    "id": "chatcmpl-1",
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "元気だよ！"},
                        "finish_reason": "stop"
                    }]
                }))
            }),
        );
        let client = client_for(serve(app).await, Some("sk-test"));

        let history = [Message::system("友達として話して"), Message::user("元気？")];
        let reply = client.complete(&history).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "元気だよ！");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let client = client_for(serve(app).await, Some("sk-bad"));

        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        match err {
            Error::ApiStatus { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_fields_are_malformed() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let client = client_for(serve(app).await, Some("sk-test"));
        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));

        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"error": "nope"})) }),
        );
        let client = client_for(serve(app).await, Some("sk-test"));
        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}/v1/chat/completions"), Some("sk-test"));
        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
