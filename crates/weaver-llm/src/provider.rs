use async_trait::async_trait;

use crate::errors::LlmError;
use crate::types::{Request, Response};

/// Provider adapter contract.
///
/// An adapter owns transport details for one vendor; it may fail with any
/// `LlmError` variant and never retries on its own.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: Request) -> Result<Response, LlmError>;
}
