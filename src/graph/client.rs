//! Graph Client
//!
//! Main client for interacting with Microsoft Graph, combining authentication
//! and HTTP functionality.

use super::auth::{GraphCredentials, TokenSource};
use super::http::GraphHttpClient;
use crate::error::{ConnectionError, RequestError};
use serde_json::Value;

/// Default Graph endpoint; Intune assignment APIs live under beta
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/beta";

/// Main Graph client
#[derive(Clone)]
pub struct GraphClient {
    pub credentials: GraphCredentials,
    pub http: GraphHttpClient,
    base_url: String,
}

impl GraphClient {
    /// Create a client without contacting any endpoint
    pub fn new(source: TokenSource, base_url: &str) -> Result<Self, ConnectionError> {
        let http = GraphHttpClient::new().map_err(|e| ConnectionError(e.to_string()))?;
        let credentials = GraphCredentials::new(source, http.inner().clone());

        Ok(Self {
            credentials,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client and acquire the first token
    pub async fn connect(source: TokenSource, base_url: &str) -> Result<Self, ConnectionError> {
        let client = Self::new(source, base_url)?;
        client.credentials.connect().await?;
        tracing::info!("Connected to Microsoft Graph at {}", client.base_url);
        Ok(client)
    }

    /// Release the session. Safe to call more than once.
    pub async fn close(&self) {
        self.credentials.clear().await;
        tracing::info!("Graph session closed");
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an absolute URL from a path relative to the Graph base
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request to an absolute Graph URL
    pub async fn get(&self, url: &str) -> Result<Value, RequestError> {
        let token = self.credentials.get_token().await?;
        self.http.get(url, &token).await
    }

    /// GET an absolute URL as an advanced directory query
    pub async fn get_eventual(&self, url: &str) -> Result<Value, RequestError> {
        let token = self.credentials.get_token().await?;
        self.http.get_eventual(url, &token).await
    }

    /// Make a GET request to a path relative to the Graph base
    pub async fn get_path(&self, path: &str) -> Result<Value, RequestError> {
        self.get(&self.url(path)).await
    }
}
