//! Omnicast - publish one message to many places
//!
//! This library fans a message out to independent publishing providers
//! (Bluesky, Mastodon, Slack and Discord webhooks) concurrently and reports
//! a per-provider outcome. One provider's failure, latency or panic never
//! affects the others.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod providers;
pub mod registry;
pub mod types;
pub mod variant;

// Re-export commonly used types
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{OmnicastError, Result};
pub use providers::{Provider, ProviderKind, Published};
pub use registry::ProviderRegistry;
pub use types::{BatchResult, Message, PostRequest, ProviderResult};
