use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::config::Config;
use crate::indicator::TypingIndicator;
use crate::providers::openai;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGatewayRequest {
    pub model: String,
    pub prompt: String,
}

/// Message contents of every returned choice, in response order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGatewayResponse {
    pub choices: Vec<String>,
}

pub type ModelGatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<ModelGatewayResponse>> + 'a>>;

pub trait ModelGateway {
    fn chat<'a>(&'a self, request: ModelGatewayRequest) -> ModelGatewayFuture<'a>;
}

pub struct OpenAiGateway<'a> {
    client: &'a Client,
    cfg: &'a Config,
    typing_interval: Option<Duration>,
}

impl<'a> OpenAiGateway<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self {
            client,
            cfg,
            typing_interval: None,
        }
    }

    /// Shows the typing indicator during requests if the config allows it.
    pub fn with_typing_indicator(mut self) -> Self {
        self.typing_interval = self
            .cfg
            .typing_indicator
            .then(|| Duration::from_millis(self.cfg.typing_interval_ms));
        self
    }
}

impl<'a> ModelGateway for OpenAiGateway<'a> {
    fn chat<'b>(&'b self, request: ModelGatewayRequest) -> ModelGatewayFuture<'b> {
        Box::pin(async move {
            let indicator = self.typing_interval.map(TypingIndicator::start);
            let response = openai::chat(
                self.client,
                self.cfg,
                &request.model,
                &request.prompt,
                indicator,
            )
            .await?;

            let choices = response
                .choices
                .into_iter()
                .map(|choice| choice.message.content.unwrap_or_default())
                .collect();
            Ok(ModelGatewayResponse { choices })
        })
    }
}
