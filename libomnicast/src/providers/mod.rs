//! Provider abstraction and implementations
//!
//! Each provider encapsulates one external publishing destination: how it is
//! configured, what payload it expects, and how its success and error shapes
//! map onto [`Published`] and [`ProviderError`].
//!
//! # Examples
//!
//! ```no_run
//! use libomnicast::config::Config;
//! use libomnicast::providers::{http, slack::SlackProvider, Provider};
//!
//! # async fn example() -> libomnicast::error::Result<()> {
//! let config = Config::load()?;
//! let client = http::build_client(config.timeout())?;
//! let slack = SlackProvider::new(config.slack.clone(), client);
//!
//! if slack.is_configured() {
//!     let published = slack.publish("Hello from omnicast").await?;
//!     println!("Posted, url: {:?}", published.url);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

pub mod bluesky;
pub mod discord;
pub mod http;
pub mod mastodon;
pub mod slack;

// Mock provider is available for all builds (not just tests) to support integration tests
pub mod mock;

/// The closed set of built-in providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Bluesky,
    Mastodon,
    Slack,
    Discord,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Bluesky,
        ProviderKind::Mastodon,
        ProviderKind::Slack,
        ProviderKind::Discord,
    ];

    /// Identifier used in requests (e.g. "bluesky")
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Bluesky => "bluesky",
            ProviderKind::Mastodon => "mastodon",
            ProviderKind::Slack => "slack",
            ProviderKind::Discord => "discord",
        }
    }

    /// Human-facing name used in diagnostics (e.g. "Bluesky")
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Bluesky => "Bluesky",
            ProviderKind::Mastodon => "Mastodon",
            ProviderKind::Slack => "Slack",
            ProviderKind::Discord => "Discord",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ProviderKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown provider: '{}'", s))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful publish
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Published {
    /// Link to the published item; `None` when the provider has no such
    /// concept (chat webhooks) or returned nothing usable
    pub url: Option<String>,
}

impl Published {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    pub fn without_url() -> Self {
        Self { url: None }
    }
}

/// Provider trait for publishing a message to one destination
///
/// Implementations must resolve every expected failure (missing
/// configuration, transport errors, non-success statuses, malformed bodies)
/// to an `Err` carrying a non-empty diagnostic. Unexpected faults are caught
/// by the dispatcher, not here.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Identifier this provider is registered under (e.g. "slack")
    fn name(&self) -> &str;

    /// Whether credentials/endpoint are present. Performs no I/O.
    fn is_configured(&self) -> bool;

    /// Publish `text`
    ///
    /// # Errors
    ///
    /// - `ProviderError::NotConfigured` before any network call when
    ///   configuration is missing
    /// - `ProviderError::Status` on a non-success response
    /// - `ProviderError::Network` / `ProviderError::InvalidResponse` on
    ///   transport failures or unparseable bodies
    async fn publish(&self, text: &str) -> Result<Published, ProviderError>;
}
