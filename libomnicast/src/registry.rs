//! Provider registry
//!
//! Maps provider identifiers to their implementations. Built once at startup
//! and read-only afterwards, so it is shared across concurrent dispatches
//! behind an `Arc` without any locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::providers::bluesky::BlueskyProvider;
use crate::providers::discord::DiscordProvider;
use crate::providers::mastodon::MastodonProvider;
use crate::providers::slack::SlackProvider;
use crate::providers::{http, Provider, ProviderKind};

#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every built-in provider with its slice of `config`.
    ///
    /// Unconfigured providers are registered too; they fail with a
    /// "not configured" error when asked to publish.
    ///
    /// # Errors
    ///
    /// Returns an error if the shared HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http::build_client(config.timeout())?;
        let mut registry = Self::new();

        for kind in ProviderKind::ALL {
            let provider: Arc<dyn Provider> = match kind {
                ProviderKind::Bluesky => {
                    Arc::new(BlueskyProvider::new(config.bluesky.clone(), client.clone()))
                }
                ProviderKind::Mastodon => {
                    Arc::new(MastodonProvider::new(config.mastodon.clone(), client.clone()))
                }
                ProviderKind::Slack => {
                    Arc::new(SlackProvider::new(config.slack.clone(), client.clone()))
                }
                ProviderKind::Discord => {
                    Arc::new(DiscordProvider::new(config.discord.clone(), client.clone()))
                }
            };
            registry.insert(provider);
        }

        tracing::debug!(
            "Registered {} provider(s), {} configured",
            registry.len(),
            config.configured_providers().len()
        );

        Ok(registry)
    }

    /// Add a provider under its own name, replacing any previous entry
    pub fn register<P: Provider + 'static>(mut self, provider: P) -> Self {
        self.insert(Arc::new(provider));
        self
    }

    fn insert(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Look up a provider by exact identifier. Never performs I/O.
    pub fn resolve(&self, provider_id: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(provider_id).cloned()
    }

    /// Registered identifiers, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;

    #[test]
    fn test_from_config_registers_all_builtins() {
        let registry = ProviderRegistry::from_config(&Config::default()).unwrap();

        assert_eq!(registry.len(), ProviderKind::ALL.len());
        for kind in ProviderKind::ALL {
            let provider = registry.resolve(kind.as_str()).unwrap();
            assert_eq!(provider.name(), kind.as_str());
            assert!(!provider.is_configured());
        }
    }

    #[test]
    fn test_resolve_unknown_and_case_mismatch() {
        let registry = ProviderRegistry::from_config(&Config::default()).unwrap();

        assert!(registry.resolve("twitter").is_none());
        assert!(registry.resolve("Slack").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn test_register_custom_provider() {
        let registry = ProviderRegistry::new()
            .register(MockProvider::success("a"))
            .register(MockProvider::success("b"));

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert!(registry.resolve("a").is_some());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let registry = ProviderRegistry::new()
            .register(MockProvider::success("a"))
            .register(MockProvider::not_configured("a"));

        assert_eq!(registry.len(), 1);
        assert!(!registry.resolve("a").unwrap().is_configured());
    }
}
