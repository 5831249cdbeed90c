//! Shared HTTP plumbing for the built-in providers

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::{ProviderError, Result};

/// Build the HTTP client shared by all built-in providers.
///
/// `timeout` bounds every request so a hung endpoint turns into a
/// `ProviderError::Network` instead of stalling the batch.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("omnicast/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Network(format!("Failed to build HTTP client: {}", e)))?;
    Ok(client)
}

/// POST a JSON body and require a success status.
///
/// Non-success responses become `ProviderError::Status` carrying the body
/// text; transport failures become `ProviderError::Network`.
pub async fn post_json<B: Serialize + ?Sized>(
    client: &Client,
    provider: &'static str,
    url: &str,
    bearer: Option<&str>,
    body: &B,
) -> std::result::Result<Response, ProviderError> {
    let mut request = client.post(url).json(body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Network(format!("{} request failed: {}", provider, e)))?;

    ensure_success(provider, response).await
}

/// Map a non-success response to `ProviderError::Status`
pub async fn ensure_success(
    provider: &'static str,
    response: Response,
) -> std::result::Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        provider,
        status: status.as_u16(),
        body,
    })
}

/// Decode a JSON response body
pub async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: Response,
) -> std::result::Result<T, ProviderError> {
    response.json::<T>().await.map_err(|e| {
        ProviderError::InvalidResponse(format!("{} returned an invalid response: {}", provider, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        build_client(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_post_json_success_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/hook", server.uri());
        let result = post_json(&client(), "Test", &url, Some("tok"), &serde_json::json!({})).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_post_json_non_success_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = post_json(&client(), "Test", &server.uri(), None, &serde_json::json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Test error 403: forbidden");
    }

    #[tokio::test]
    async fn test_post_json_connection_refused_is_network_error() {
        // Nothing listens on port 9 in the test environment
        let err = post_json(&client(), "Test", "http://127.0.0.1:9/", None, &serde_json::json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Network(_)));
        assert!(err.to_string().starts_with("Test request failed"));
    }

    #[tokio::test]
    async fn test_read_json_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let response = post_json(&client(), "Test", &server.uri(), None, &serde_json::json!({}))
            .await
            .unwrap();
        let err = read_json::<serde_json::Value>("Test", response).await.unwrap_err();

        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
