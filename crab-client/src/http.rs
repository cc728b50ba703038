//! HTTP transport over the order server's REST API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::price_rule::RuleSet;
use shared::order::{CommandResponse, OrderCommand, SyncRequest, SyncResponse};
use std::time::Duration;
use tracing::debug;

use crate::error::TransportError;
use crate::transport::{CommandTransport, RuleSource, SyncTransport};
use crate::{ClientConfig, ClientError, ClientResult};

const SYNC_PATH: &str = "api/sync";
const COMMANDS_PATH: &str = "api/orders/commands";
const RULES_PATH: &str = "api/price-rules";
const HEALTH_PATH: &str = "health";

/// HTTP client for the order server
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.get(self.url(path));

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let mut request = self.client.get(self.url(HEALTH_PATH));
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    async fn fetch(&self, request: SyncRequest) -> Result<SyncResponse, TransportError> {
        debug!(since_sequence = request.since_sequence, "Requesting sync");
        Ok(self.post(SYNC_PATH, &request).await?)
    }
}

#[async_trait]
impl CommandTransport for HttpTransport {
    async fn submit(&self, command: OrderCommand) -> Result<CommandResponse, TransportError> {
        debug!(command_id = %command.command_id, "Submitting command");
        Ok(self.post(COMMANDS_PATH, &command).await?)
    }
}

#[async_trait]
impl RuleSource for HttpTransport {
    async fn fetch_rules(&self) -> Result<RuleSet, TransportError> {
        Ok(self.get(RULES_PATH).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let transport = HttpTransport::new(&ClientConfig::new("http://pos:8080/")).unwrap();
        assert_eq!(transport.url(SYNC_PATH), "http://pos:8080/api/sync");
        assert!(transport.auth_header().is_none());
        let transport = transport.with_token("abc");
        assert_eq!(transport.auth_header().as_deref(), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connect_error() {
        let config = ClientConfig::new("http://127.0.0.1:1").with_timeout(2);
        let transport = HttpTransport::new(&config).unwrap();
        let err = SyncTransport::connect(&transport).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)));
    }
}
