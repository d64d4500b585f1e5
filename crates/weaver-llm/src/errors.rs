use thiserror::Error;

/// Failures surfaced by completion providers and the client.
///
/// Retry and backoff are deliberately not handled here; callers that want a
/// retry policy wrap the provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("invalid provider configuration: {0}")]
    Configuration(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("rate limited by provider: {0}")]
    RateLimited(String),
    #[error("provider returned status {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}
