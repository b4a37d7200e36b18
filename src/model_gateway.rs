use reqwest::Client;
use std::env;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

use crate::agent::functions::FunctionSpec;
use crate::config::Config;
use crate::error::ChatError;
use crate::model::{ChatMessage, FunctionCallRequest};
use crate::providers;

pub struct ModelGatewayRequest<'a> {
    pub messages: &'a [ChatMessage],
    pub functions: &'a [FunctionSpec],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub content: String,
    pub function_call: Option<FunctionCallRequest>,
}

impl ChatReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            function_call: None,
        }
    }
}

pub type ModelGatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatReply, ChatError>> + 'a>>;

pub trait ModelGateway {
    fn chat<'a>(&'a self, request: ModelGatewayRequest<'a>) -> ModelGatewayFuture<'a>;
}

pub struct HttpModelGateway<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> HttpModelGateway<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl ModelGateway for HttpModelGateway<'_> {
    fn chat<'b>(&'b self, request: ModelGatewayRequest<'b>) -> ModelGatewayFuture<'b> {
        Box::pin(async move {
            // Read on every call so a rotated key takes effect without restarting.
            let api_key = api_key_with(&self.cfg.api_key_var, |key| env::var(key).ok())?;
            debug!(
                message_count = request.messages.len(),
                function_count = request.functions.len(),
                "dispatching model chat request"
            );
            providers::openai::chat(
                self.client,
                self.cfg,
                &api_key,
                request.messages,
                request.functions,
            )
            .await
        })
    }
}

fn api_key_with(
    var: &str,
    get_var: impl FnOnce(&str) -> Option<String>,
) -> Result<String, ChatError> {
    get_var(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ChatError::MissingApiKey {
            var: var.to_string(),
        })
}


#[cfg(test)]
mod tests {
    use super::api_key_with;
    use crate::error::ChatError;

    #[test]
    fn api_key_is_read_from_named_variable() {
        let key = api_key_with("OPEN_API_KEY", |name| {
            (name == "OPEN_API_KEY").then(|| " sk-test ".to_string())
        })
        .expect("key should resolve");
        assert_eq!(key, "sk-test");
    }

    #[test]
    fn missing_or_blank_api_key_is_an_error() {
        let err = api_key_with("OPENAI_API_KEY", |_| None).expect_err("missing key");
        assert!(matches!(err, ChatError::MissingApiKey { ref var } if var == "OPENAI_API_KEY"));

        let err = api_key_with("OPENAI_API_KEY", |_| Some("  ".to_string()))
            .expect_err("blank key");
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
