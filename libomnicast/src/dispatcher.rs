//! Multi-provider dispatch
//!
//! This module fans a single message out to every requested provider
//! concurrently and folds the outcomes into one [`BatchResult`]. Each publish
//! call runs in its own task, so a provider that fails, hangs or panics
//! cannot affect its siblings.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use crate::error::{ProviderError, Result};
use crate::providers::{Provider, Published};
use crate::registry::ProviderRegistry;
use crate::types::{BatchResult, Message, PostRequest, ProviderResult};

/// Error text for a fault that carries no message of its own
pub const FAULT_FALLBACK: &str = "Failed";

/// Dispatcher for publishing one message to many providers
///
/// Stateless between calls: the registry is shared read-only and every
/// dispatch creates and consumes its own results.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use libomnicast::config::Config;
/// use libomnicast::dispatcher::Dispatcher;
/// use libomnicast::registry::ProviderRegistry;
///
/// # async fn example() -> libomnicast::error::Result<()> {
/// let config = Config::load()?;
/// let registry = Arc::new(ProviderRegistry::from_config(&config)?);
/// let dispatcher = Dispatcher::new(registry).with_timeout(config.timeout());
///
/// let batch = dispatcher.dispatch("Hello world", &["bluesky", "slack"]).await;
/// for result in &batch.results {
///     println!("{}: ok={} url={:?} error={:?}", result.provider, result.ok, result.url, result.error);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    timeout: Option<Duration>,
}

/// One requested identifier, either already settled or in flight
enum Unit {
    Settled(ProviderResult),
    InFlight(String, JoinHandle<std::result::Result<Published, ProviderError>>),
}

impl Dispatcher {
    /// Create a dispatcher with no per-call timeout
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Bound every publish call; a call that exceeds `timeout` becomes a
    /// failed result instead of stalling the batch
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Publish `text` to each of `provider_ids`
    ///
    /// Returns exactly one result per requested identifier, in request
    /// order, regardless of completion order. Unknown identifiers yield
    /// "Unknown provider" without any call. Never fails: every problem is
    /// reported as an `ok: false` entry.
    pub async fn dispatch<S: AsRef<str>>(&self, text: &str, provider_ids: &[S]) -> BatchResult {
        self.dispatch_message(&Message::new(text), provider_ids).await
    }

    /// Same as [`Dispatcher::dispatch`] for an already-built [`Message`]
    ///
    /// Publish calls run as detached tasks: dropping the returned future
    /// stops waiting for them but does not cancel calls already started.
    pub async fn dispatch_message<S: AsRef<str>>(
        &self,
        message: &Message,
        provider_ids: &[S],
    ) -> BatchResult {
        let units: Vec<Unit> = provider_ids
            .iter()
            .map(|id| {
                let id = id.as_ref().to_string();
                match self.registry.resolve(&id) {
                    Some(provider) => {
                        let handle =
                            tokio::spawn(publish_one(provider, message.shared(), self.timeout));
                        Unit::InFlight(id, handle)
                    }
                    None => {
                        warn!("Unknown provider requested: {}", id);
                        Unit::Settled(ProviderResult::unknown(id))
                    }
                }
            })
            .collect();

        // Join everything; never short-circuit on the first success or failure
        let results = join_all(units.into_iter().map(settle)).await;

        let batch = BatchResult::from_results(results);
        info!(
            "Dispatch finished: {}/{} provider(s) succeeded",
            batch.succeeded().count(),
            batch.results.len()
        );
        batch
    }

    /// Validate a caller request, then dispatch it
    ///
    /// # Errors
    ///
    /// Returns `OmnicastError::InvalidInput` if the message is blank or no
    /// provider was named. Provider failures are never errors here.
    pub async fn dispatch_request(&self, request: PostRequest) -> Result<BatchResult> {
        let (message, providers) = request.validate()?;
        Ok(self.dispatch_message(&message, &providers).await)
    }
}

async fn publish_one(
    provider: Arc<dyn Provider>,
    text: Arc<str>,
    timeout: Option<Duration>,
) -> std::result::Result<Published, ProviderError> {
    info!("Posting to provider: {}", provider.name());

    match timeout {
        Some(limit) => tokio::time::timeout(limit, provider.publish(&text))
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Network(format!(
                    "{} timed out after {:?}",
                    provider.name(),
                    limit
                )))
            }),
        None => provider.publish(&text).await,
    }
}

async fn settle(unit: Unit) -> ProviderResult {
    match unit {
        Unit::Settled(result) => result,
        Unit::InFlight(id, handle) => match handle.await {
            Ok(Ok(published)) => {
                info!("Successfully posted to {}", id);
                ProviderResult::success(id, published)
            }
            Ok(Err(e)) => {
                warn!("Failed to post to {}: {}", id, e);
                ProviderResult::failure(id, e.to_string())
            }
            Err(join_error) => {
                let message = fault_message(join_error);
                warn!("Provider {} faulted: {}", id, message);
                ProviderResult::failure(id, message)
            }
        },
    }
}

/// Extract a human-readable message from a panicked or cancelled task
fn fault_message(error: JoinError) -> String {
    if !error.is_panic() {
        return FAULT_FALLBACK.to_string();
    }

    let payload = error.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default();

    if message.is_empty() {
        FAULT_FALLBACK.to_string()
    } else {
        message
    }
}
