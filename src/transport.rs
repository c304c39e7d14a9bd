//! JSON-over-HTTP transport used to reach counterparty identity services

use crate::config::ClientConfig;
use crate::{BsvaliasError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Posts a JSON body and returns the JSON response envelope.
///
/// Retry policy, if any, belongs to implementations of this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value>;
}

/// reqwest backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the configured timeout and user agent
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| BsvaliasError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!("POST {}", url);

        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BsvaliasError::transport(
                "post",
                format!("{} returned status {}", url, status),
            ));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| BsvaliasError::transport("post", format!("invalid JSON envelope: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_post_json_success() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/p2p")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({ "amount": 10 })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "output": "76a9" }).to_string())
            .create_async()
            .await;

        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        let response = transport
            .post_json(&format!("{}/p2p", server.url()), &json!({ "amount": 10 }))
            .await
            .unwrap();

        assert_eq!(response["output"], "76a9");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_json_error_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/p2p")
            .with_status(404)
            .create_async()
            .await;

        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        let err = transport
            .post_json(&format!("{}/p2p", server.url()), &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, BsvaliasError::Transport { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_post_json_invalid_envelope() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/p2p")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        let err = transport
            .post_json(&format!("{}/p2p", server.url()), &json!({}))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("invalid JSON envelope"));
    }
}
