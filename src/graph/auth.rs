//! Graph Authentication
//!
//! Obtains bearer tokens for Microsoft Graph, either from a pre-acquired token or via
//! the Entra ID client-credentials grant against an app registration.

use crate::error::{ConnectionError, RequestError};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Scope for app-only Graph access
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Default Entra ID authority host
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Where tokens come from
#[derive(Clone)]
pub enum TokenSource {
    /// A bearer token acquired elsewhere (e.g. `az account get-access-token`)
    Static(String),
    /// App registration with a client secret
    ClientCredentials {
        authority_host: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("Static([REDACTED])"),
            TokenSource::ClientCredentials {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientCredentials")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .finish(),
        }
    }
}

impl TokenSource {
    fn token_url(authority_host: &str, tenant_id: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            tenant_id
        )
    }
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Graph credentials holder with token caching
#[derive(Clone)]
pub struct GraphCredentials {
    source: TokenSource,
    http: Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl GraphCredentials {
    pub fn new(source: TokenSource, http: Client) -> Self {
        Self {
            source,
            http,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Acquire the first token eagerly so a bad tenant/secret fails before any lookup
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        match &self.source {
            TokenSource::Static(token) if token.trim().is_empty() => {
                Err(ConnectionError("access token is empty".to_string()))
            }
            _ => self
                .get_token()
                .await
                .map(|_| ())
                .map_err(|e| ConnectionError(e.to_string())),
        }
    }

    /// Get an access token for API calls
    /// Checks token expiry before returning cached token
    pub async fn get_token(&self) -> Result<String, RequestError> {
        let (authority_host, tenant_id, client_id, client_secret) = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ClientCredentials {
                authority_host,
                tenant_id,
                client_id,
                client_secret,
            } => (authority_host, tenant_id, client_id, client_secret),
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        tracing::info!("Requesting Graph token for tenant {}", tenant_id);

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("scope", GRAPH_DEFAULT_SCOPE),
        ];

        let response = self
            .http
            .post(TokenSource::token_url(authority_host, tenant_id))
            .form(&params)
            .send()
            .await
            .map_err(|e| RequestError::Token(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RequestError::Token(format!(
                "token request failed: {}",
                response.status()
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| RequestError::Token(e.to_string()))?;

        let ttl = Duration::from_secs(token_response.expires_in);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_response.access_token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token_response.access_token)
    }

    /// Drop any cached token
    pub async fn clear(&self) {
        let mut cache = self.token_cache.write().await;
        *cache = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url_trims_trailing_slash() {
        assert_eq!(
            TokenSource::token_url("https://login.microsoftonline.com/", "contoso"),
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let source = TokenSource::ClientCredentials {
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            tenant_id: "tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: "hunter2".to_string(),
        };
        let debug = format!("{:?}", source);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));

        let debug = format!("{:?}", TokenSource::Static("eyJ0eXAi".to_string()));
        assert!(!debug.contains("eyJ0eXAi"));
    }

    #[test]
    fn test_static_token_is_returned_verbatim() {
        let creds = GraphCredentials::new(
            TokenSource::Static("abc".to_string()),
            Client::new(),
        );
        let token = tokio_test::block_on(creds.get_token()).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_empty_static_token_fails_to_connect() {
        let creds = GraphCredentials::new(TokenSource::Static("  ".to_string()), Client::new());
        assert!(tokio_test::block_on(creds.connect()).is_err());
    }
}
