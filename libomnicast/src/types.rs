//! Core types for Omnicast

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{OmnicastError, Result};
use crate::providers::Published;

/// Error text for identifiers missing from the registry
pub const UNKNOWN_PROVIDER: &str = "Unknown provider";

/// An immutable message body
///
/// Cheap to clone; the text is shared between all concurrent publish calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(Arc<str>);

impl Message {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn shared(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome for one requested provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderResult {
    pub fn success(provider: impl Into<String>, published: Published) -> Self {
        Self {
            provider: provider.into(),
            ok: true,
            url: published.url,
            error: None,
        }
    }

    pub fn failure(provider: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ok: false,
            url: None,
            error: Some(error.into()),
        }
    }

    pub fn unknown(provider: impl Into<String>) -> Self {
        Self::failure(provider, UNKNOWN_PROVIDER)
    }
}

/// Outcome of one dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// One entry per requested identifier, in request order
    pub results: Vec<ProviderResult>,
    pub any_ok: bool,
}

impl BatchResult {
    /// Wrap per-provider results, deriving the batch flag from them
    pub fn from_results(results: Vec<ProviderResult>) -> Self {
        let any_ok = any_ok(&results);
        Self { results, any_ok }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ProviderResult> {
        self.results.iter().filter(|r| r.ok)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProviderResult> {
        self.results.iter().filter(|r| !r.ok)
    }
}

/// A batch succeeds when at least one provider succeeded.
///
/// Partial success counts as success; callers inspect the individual
/// results for detail.
pub fn any_ok(results: &[ProviderResult]) -> bool {
    results.iter().any(|r| r.ok)
}

/// Inbound request from the caller layer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostRequest {
    pub message: String,
    pub providers: Vec<String>,
}

impl PostRequest {
    /// Check the request before dispatch
    ///
    /// The message is trimmed; an empty message or an empty provider list is
    /// rejected. Duplicate and unknown identifiers are left for the
    /// dispatcher to resolve individually.
    ///
    /// # Errors
    ///
    /// Returns `OmnicastError::InvalidInput` with "Message is required" or
    /// "No providers selected".
    pub fn validate(self) -> Result<(Message, Vec<String>)> {
        let text = self.message.trim();
        if text.is_empty() {
            return Err(OmnicastError::InvalidInput("Message is required".to_string()));
        }
        if self.providers.is_empty() {
            return Err(OmnicastError::InvalidInput("No providers selected".to_string()));
        }
        Ok((Message::new(text), self.providers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_ok_partial_success() {
        let results = vec![
            ProviderResult::failure("a", "boom"),
            ProviderResult::success("b", Published::without_url()),
        ];

        assert!(any_ok(&results));
        // Pure: evaluating again gives the same answer
        assert_eq!(any_ok(&results), any_ok(&results));
    }

    #[test]
    fn test_any_ok_empty_and_all_failed() {
        assert!(!any_ok(&[]));
        assert!(!any_ok(&[
            ProviderResult::unknown("x"),
            ProviderResult::failure("y", "down")
        ]));
    }

    #[test]
    fn test_batch_result_serialization() {
        let batch = BatchResult::from_results(vec![
            ProviderResult::success("bluesky", Published::with_url("https://bsky.app/x")),
            ProviderResult::unknown("myspace"),
        ]);

        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "results": [
                    { "provider": "bluesky", "ok": true, "url": "https://bsky.app/x" },
                    { "provider": "myspace", "ok": false, "error": "Unknown provider" }
                ],
                "anyOk": true
            })
        );
    }

    #[test]
    fn test_succeeded_and_failed_partition() {
        let batch = BatchResult::from_results(vec![
            ProviderResult::success("a", Published::without_url()),
            ProviderResult::failure("b", "x"),
            ProviderResult::failure("c", "y"),
        ]);

        assert_eq!(batch.succeeded().count(), 1);
        assert_eq!(batch.failed().count(), 2);
    }

    #[test]
    fn test_validate_trims_message() {
        let request = PostRequest {
            message: "  Hello world \n".to_string(),
            providers: vec!["slack".to_string()],
        };

        let (message, providers) = request.validate().unwrap();
        assert_eq!(message.as_str(), "Hello world");
        assert_eq!(providers, vec!["slack".to_string()]);
    }

    #[test]
    fn test_validate_rejects_blank_message() {
        let request = PostRequest {
            message: "   ".to_string(),
            providers: vec!["slack".to_string()],
        };

        let err = request.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Message is required");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_validate_rejects_empty_providers() {
        let request = PostRequest {
            message: "hi".to_string(),
            providers: vec![],
        };

        let err = request.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: No providers selected");
    }

    #[test]
    fn test_validate_keeps_duplicates_and_unknowns() {
        let request = PostRequest {
            message: "hi".to_string(),
            providers: vec!["slack".into(), "slack".into(), "nope".into()],
        };

        let (_, providers) = request.validate().unwrap();
        assert_eq!(providers.len(), 3);
    }
}
