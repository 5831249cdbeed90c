//! Mock provider implementation for testing
//!
//! This module provides a configurable mock provider that can simulate
//! successes, failures, unexpected faults and delays. It's designed for use
//! in integration tests to verify dispatch logic without requiring actual
//! provider credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::ProviderError;
use crate::providers::{Provider, Published};

/// What a mock provider does when asked to publish
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Succeed, optionally returning a URL
    Succeed(Option<String>),
    /// Return a normal failure with this message
    Fail(String),
    /// Panic with this message (an unexpected fault)
    Panic(String),
    /// Panic with a payload that carries no message
    PanicSilently,
}

/// Configuration for mock provider behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Provider name (e.g., "mock-slack")
    pub name: String,

    pub behavior: MockBehavior,

    /// Delay before completing (simulates network latency)
    pub delay: Duration,

    /// Whether the provider is configured; unconfigured mocks fail
    /// immediately without counting a call
    pub is_configured: bool,

    /// Number of times publish reached the "network" stage
    pub call_count: Arc<Mutex<usize>>,

    /// Texts that have been published (for verification)
    pub published: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            behavior: MockBehavior::Succeed(None),
            delay: Duration::from_millis(0),
            is_configured: true,
            call_count: Arc::new(Mutex::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock provider for testing
pub struct MockProvider {
    config: MockConfig,
}

impl MockProvider {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// A mock that always succeeds without a URL
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// A mock that succeeds and links to `url`
    pub fn success_with_url(name: &str, url: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            behavior: MockBehavior::Succeed(Some(url.to_string())),
            ..Default::default()
        })
    }

    /// A mock whose publish fails normally
    pub fn failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            behavior: MockBehavior::Fail(error.to_string()),
            ..Default::default()
        })
    }

    /// A mock whose publish panics
    pub fn panicking(name: &str, message: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            behavior: MockBehavior::Panic(message.to_string()),
            ..Default::default()
        })
    }

    /// A mock that succeeds after `delay`
    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            delay,
            ..Default::default()
        })
    }

    /// A mock that is registered but not configured
    pub fn not_configured(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            is_configured: false,
            ..Default::default()
        })
    }

    pub fn call_count(&self) -> usize {
        *self.config.call_count.lock().unwrap()
    }

    pub fn published(&self) -> Vec<String> {
        self.config.published.lock().unwrap().clone()
    }

    /// Shared call counter, usable after the mock is moved into a registry
    pub fn call_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.config.call_count)
    }

    /// Shared log of published texts, usable after the mock is moved
    pub fn published_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.config.published)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured
    }

    async fn publish(&self, text: &str) -> Result<Published, ProviderError> {
        if !self.config.is_configured {
            return Err(ProviderError::NotConfigured(self.config.name.clone()));
        }

        *self.config.call_count.lock().unwrap() += 1;

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        match &self.config.behavior {
            MockBehavior::Succeed(url) => {
                self.config.published.lock().unwrap().push(text.to_string());
                Ok(Published { url: url.clone() })
            }
            MockBehavior::Fail(error) => Err(ProviderError::Network(error.clone())),
            MockBehavior::Panic(message) => panic!("{}", message),
            MockBehavior::PanicSilently => std::panic::panic_any(0_u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success() {
        let provider = MockProvider::success_with_url("test", "https://example.com/1");

        assert!(provider.is_configured());
        assert_eq!(provider.name(), "test");

        let published = provider.publish("Test content").await.unwrap();
        assert_eq!(published.url.as_deref(), Some("https://example.com/1"));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.published(), vec!["Test content".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let provider = MockProvider::failure("test", "Connection reset");

        let err = provider.publish("Test").await.unwrap_err();
        assert_eq!(err.to_string(), "Connection reset");
        assert_eq!(provider.call_count(), 1);
        assert!(provider.published().is_empty());
    }

    #[tokio::test]
    async fn test_mock_not_configured_skips_call() {
        let provider = MockProvider::not_configured("test");

        let err = provider.publish("Test").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert_eq!(err.to_string(), "test not configured");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_with_delay() {
        let provider = MockProvider::with_delay("test", Duration::from_millis(50));

        let start = std::time::Instant::now();
        provider.publish("Test").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
