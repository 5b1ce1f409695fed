use super::http_client::{DEFAULT_REQUEST_CEILING, build_service_client};
use super::scrub::sanitize_api_error;
use super::types::{ChatRequest, ChatResponse};
use crate::error::{EngineError, ServiceKind};
use reqwest::Client;
use thiserror::Error;

const REFERER: &str = "https://github.com/judgeloop/judgeloop";
const TITLE: &str = "judgeloop";

/// Failure of one chat-completions call, before it is attributed to a service.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenRouter API key not set. Add `api_key` to config.toml or set OPENROUTER_API_KEY.")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("undecodable response: {0}")]
    Decode(String),
}

impl LlmError {
    /// Attribute the failure to `service`. Anything that prevented an answer
    /// is a transport failure; an answer we could not use is a service error.
    pub fn into_engine(self, service: ServiceKind) -> EngineError {
        match self {
            Self::MissingApiKey | Self::Http(_) => EngineError::transport(service, self.to_string()),
            Self::Status { .. } | Self::Decode(_) => EngineError::service(service, self.to_string()),
        }
    }
}

pub struct OpenRouterClient {
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    endpoint: String,
    client: Client,
}

impl OpenRouterClient {
    pub fn new(api_key: Option<&str>, base_url: &str) -> Self {
        Self::with_client(api_key, base_url, build_service_client(DEFAULT_REQUEST_CEILING))
    }

    pub fn with_client(api_key: Option<&str>, base_url: &str, client: Client) -> Self {
        Self {
            cached_auth_header: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|k| format!("Bearer {k}")),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            client,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.cached_auth_header.is_some()
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let auth_header = self
            .cached_auth_header
            .as_ref()
            .ok_or(LlmError::MissingApiKey)?;

        tracing::debug!(model = %request.model, messages = request.messages.len(), "chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", auth_header)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Http(sanitize_api_error(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: sanitize_api_error(&body),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(sanitize_api_error(&e.to_string())))?;
        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                model = parsed.model.as_deref().unwrap_or(&request.model),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }
        Ok(parsed)
    }

    /// Text content of the first choice, or `Decode` if there is none.
    pub async fn complete_text(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self.complete(request).await?;
        response
            .first_message()
            .and_then(|message| message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::Decode("no content in response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest::new("openai/gpt-4o-mini", 0.7)
            .system("be brief")
            .user_text("hello")
    }

    #[tokio::test]
    async fn complete_sends_auth_and_parses_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-or-test"))
            .and(header("X-Title", TITLE))
            .and(body_partial_json(serde_json::json!({"model": "openai/gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "hi"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(Some("sk-or-test"), &server.uri());
        let text = client.complete_text(&request()).await.unwrap();
        assert_eq!(text, "hi");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = OpenRouterClient::new(Some("   "), "http://127.0.0.1:9");
        assert!(!client.has_api_key());
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
        assert!(err.into_engine(ServiceKind::Judge).is_transport());
    }

    #[tokio::test]
    async fn error_status_is_scrubbed_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("bad key sk-or-v1-secretvalue"),
            )
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(Some("sk-or-v1-secretvalue"), &server.uri());
        let err = client.complete(&request()).await.unwrap_err();
        let LlmError::Status { status, body } = &err else {
            panic!("expected status error, got {err:?}");
        };
        assert_eq!(*status, 401);
        assert!(!body.contains("secretvalue"));
        assert!(err.into_engine(ServiceKind::Combiner).is_service());
    }

    #[tokio::test]
    async fn empty_content_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "  "}}]
            })))
            .mount(&server)
            .await;

        let client = OpenRouterClient::new(Some("k"), &format!("{}/", server.uri()));
        let err = client.complete_text(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport() {
        let client = OpenRouterClient::new(Some("k"), "http://127.0.0.1:9");
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
        assert!(err.into_engine(ServiceKind::Generator).is_transport());
    }
}
