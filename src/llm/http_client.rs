use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("judgeloop/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Ceiling used when no service configuration is at hand.
pub const DEFAULT_REQUEST_CEILING: Duration = Duration::from_secs(120);

/// Connection pool shared by the service adapters and candidate downloads.
///
/// Components enforce their own per-call deadlines; `ceiling` only bounds a
/// request nobody wrapped, so it should be at least the longest of those.
pub fn build_service_client(ceiling: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(ceiling)
        .connect_timeout(CONNECT_TIMEOUT.min(ceiling))
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "custom HTTP client unavailable; using defaults");
            Client::new()
        })
}
