pub mod http_client;
pub mod openrouter;
pub mod scrub;
pub mod types;

pub use http_client::{DEFAULT_REQUEST_CEILING, build_service_client};
pub use openrouter::{LlmError, OpenRouterClient};
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use types::{ChatRequest, ChatResponse};

/// Pull the first `{...}` object out of model output that wraps JSON in prose
/// or code fences.
pub fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}
