use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::LlmError;
use crate::provider::CompletionProvider;
use crate::types::{Request, Response};

/// Routes completion requests to a named provider.
///
/// Providers are registered explicitly; the first registered provider becomes
/// the default unless one is set. There is no ambient global client — callers
/// construct one and pass it to whatever needs it.
#[derive(Clone, Default)]
pub struct Client {
    providers: HashMap<String, Arc<dyn CompletionProvider>>,
    default_provider: Option<String>,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_provider(&mut self, provider: Arc<dyn CompletionProvider>) {
        let name = provider.name().to_string();
        if self.default_provider.is_none() {
            self.default_provider = Some(name.clone());
        }
        self.providers.insert(name, provider);
    }

    pub fn set_default_provider(&mut self, provider: impl Into<String>) {
        self.default_provider = Some(provider.into());
    }

    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub async fn complete(&self, mut request: Request) -> Result<Response, LlmError> {
        let provider_name = self.resolve_provider(&request)?;
        request.provider = Some(provider_name.clone());
        let adapter = self
            .providers
            .get(&provider_name)
            .ok_or_else(|| {
                LlmError::Configuration(format!("provider '{provider_name}' not registered"))
            })?
            .clone();
        adapter.complete(request).await
    }

    fn resolve_provider(&self, request: &Request) -> Result<String, LlmError> {
        if let Some(provider) = &request.provider {
            return Ok(provider.clone());
        }
        if let Some(provider) = &self.default_provider {
            return Ok(provider.clone());
        }
        Err(LlmError::Configuration("no provider configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct TestAdapter {
        name: String,
    }

    #[async_trait]
    impl CompletionProvider for TestAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn complete(&self, request: Request) -> Result<Response, LlmError> {
            Ok(Response {
                text: format!("echo from {}", self.name),
                model: request.model,
            })
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn first_registered_provider_becomes_default() {
        let mut client = Client::new();
        client.register_provider(Arc::new(TestAdapter {
            name: "alpha".to_string(),
        }));
        client.register_provider(Arc::new(TestAdapter {
            name: "beta".to_string(),
        }));

        let response = client
            .complete(Request::new("m", "sys", Vec::new()))
            .await
            .expect("complete should succeed");
        assert_eq!(response.text, "echo from alpha");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn request_provider_overrides_default() {
        let mut client = Client::new();
        client.register_provider(Arc::new(TestAdapter {
            name: "alpha".to_string(),
        }));
        client.register_provider(Arc::new(TestAdapter {
            name: "beta".to_string(),
        }));

        let mut request = Request::new("m", "sys", Vec::new());
        request.provider = Some("beta".to_string());
        let response = client.complete(request).await.expect("complete");
        assert_eq!(response.text, "echo from beta");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn empty_client_reports_configuration_error() {
        let client = Client::new();
        let error = client
            .complete(Request::new("m", "sys", Vec::new()))
            .await
            .expect_err("no provider should fail");
        assert!(matches!(error, LlmError::Configuration(_)));
    }
}
