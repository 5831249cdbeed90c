//! Discord webhook provider

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::config::WebhookConfig;
use crate::error::ProviderError;
use crate::providers::{http, Provider, ProviderKind, Published};

const KIND: ProviderKind = ProviderKind::Discord;

pub struct DiscordProvider {
    config: Option<WebhookConfig>,
    client: Client,
}

#[derive(Serialize)]
struct DiscordMessage<'a> {
    content: &'a str,
}

impl DiscordProvider {
    pub fn new(config: Option<WebhookConfig>, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl Provider for DiscordProvider {
    fn name(&self) -> &str {
        KIND.as_str()
    }

    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    async fn publish(&self, text: &str) -> Result<Published, ProviderError> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| ProviderError::NotConfigured(KIND.display_name().to_string()))?;

        tracing::debug!("Posting to Discord webhook: {} characters", text.chars().count());

        http::post_json(
            &self.client,
            KIND.display_name(),
            config.webhook_url.expose_secret(),
            None,
            &DiscordMessage { content: text },
        )
        .await?;

        // Discord answers 204 No Content unless `?wait=true` is set
        Ok(Published::without_url())
    }
}
