//! Mastodon platform implementation
//!
//! Posts a public status through the Mastodon REST API. Any Fediverse server
//! implementing `POST /api/v1/statuses` (Pleroma, Akkoma, GoToSocial, ...)
//! works the same way.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::MastodonConfig;
use crate::error::ProviderError;
use crate::providers::{http, Provider, ProviderKind, Published};

const KIND: ProviderKind = ProviderKind::Mastodon;

/// Mastodon provider
///
/// Holds the configuration snapshot captured at startup. Publishing with a
/// missing instance or token fails with "Mastodon not configured" without
/// touching the network.
pub struct MastodonProvider {
    config: Option<MastodonConfig>,
    client: Client,
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    status: &'a str,
}

#[derive(Deserialize)]
struct StatusResponse {
    /// Web link to the status. Absent for some servers and for scheduled posts.
    #[serde(default)]
    url: Option<String>,
}

impl MastodonProvider {
    pub fn new(config: Option<MastodonConfig>, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl Provider for MastodonProvider {
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

        let url = format!("{}/api/v1/statuses", config.base_url());
        tracing::debug!("Posting status to {}", url);

        let response = http::post_json(
            &self.client,
            KIND.display_name(),
            &url,
            Some(config.access_token.expose_secret()),
            &StatusRequest { status: text },
        )
        .await?;

        let status: StatusResponse = http::read_json(KIND.display_name(), response).await?;
        Ok(Published { url: status.url })
    }
}
