//! Bluesky platform implementation
//!
//! Talks XRPC directly to the account's PDS: one `createSession` login
//! followed by one `createRecord` call for the post itself.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::BlueskyConfig;
use crate::error::ProviderError;
use crate::providers::{http, Provider, ProviderKind, Published};

const KIND: ProviderKind = ProviderKind::Bluesky;

/// Bluesky's post length limit, in characters
pub const CHARACTER_LIMIT: usize = 300;

const POST_COLLECTION: &str = "app.bsky.feed.post";
const VIEWER_BASE: &str = "https://bsky.app";

pub struct BlueskyProvider {
    config: Option<BlueskyConfig>,
    client: Client,
}

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct Session {
    did: String,
    #[serde(rename = "accessJwt")]
    access_jwt: String,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'a str,
    record: PostRecord<'a>,
}

#[derive(Serialize)]
struct PostRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'a str,
    text: String,
    #[serde(rename = "createdAt")]
    created_at: String,
}

/// A successful call created the post even when `uri` is missing or not a
/// string; only the link is lost then
#[derive(Deserialize)]
struct CreateRecordResponse {
    #[serde(default)]
    uri: Option<RecordUri>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordUri {
    Text(String),
    #[allow(dead_code)]
    Other(serde::de::IgnoredAny),
}

impl BlueskyProvider {
    pub fn new(config: Option<BlueskyConfig>, client: Client) -> Self {
        Self { config, client }
    }

    /// Log in with the app password and return the session
    async fn create_session(&self, config: &BlueskyConfig) -> Result<Session, ProviderError> {
        tracing::debug!("Creating Bluesky session for identifier: {}", config.identifier);

        let url = format!(
            "{}/xrpc/com.atproto.server.createSession",
            config.service.trim_end_matches('/')
        );
        let request = CreateSessionRequest {
            identifier: &config.identifier,
            password: config.app_password.expose_secret(),
        };

        let response = http::post_json(&self.client, KIND.display_name(), &url, None, &request)
            .await
            .map_err(|e| match e {
                ProviderError::Status { status, body, .. } => ProviderError::Authentication(
                    format!("Bluesky login failed {}: {}", status, body),
                ),
                other => other,
            })?;

        http::read_json(KIND.display_name(), response).await
    }
}

#[async_trait]
impl Provider for BlueskyProvider {
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

        let session = self.create_session(config).await?;

        let request = CreateRecordRequest {
            repo: &session.did,
            collection: POST_COLLECTION,
            record: PostRecord {
                record_type: POST_COLLECTION,
                text: truncate_chars(text, CHARACTER_LIMIT),
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        };

        let url = format!(
            "{}/xrpc/com.atproto.repo.createRecord",
            config.service.trim_end_matches('/')
        );
        let response = http::post_json(
            &self.client,
            KIND.display_name(),
            &url,
            Some(&session.access_jwt),
            &request,
        )
        .await?;

        let created: CreateRecordResponse = http::read_json(KIND.display_name(), response).await?;
        let uri = match created.uri {
            Some(RecordUri::Text(uri)) => Some(uri),
            Some(RecordUri::Other(_)) | None => None,
        };
        tracing::debug!("Posted to Bluesky: {:?}", uri);

        Ok(Published {
            url: uri.as_deref().and_then(record_url),
        })
    }
}

/// Keep at most `limit` characters of `text`
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Derive the web link for a post from its AT URI
///
/// `at://did:plc:abc/app.bsky.feed.post/3k2yihcrp6f2c` splits on `/` into
/// `["at:", "", did, collection, rkey]`; the DID and record key are placed
/// into the bsky.app profile link. Returns `None` if either is missing.
pub fn record_url(uri: &str) -> Option<String> {
    let parts: Vec<&str> = uri.split('/').collect();
    let did = parts.get(2).filter(|s| !s.is_empty())?;
    let rkey = parts.get(4).filter(|s| !s.is_empty())?;
    Some(format!("{}/profile/{}/post/{}", VIEWER_BASE, did, rkey))
}
