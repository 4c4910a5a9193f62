//! Microsoft Graph interaction module
//!
//! This module provides the plumbing for talking to Microsoft Graph: token
//! acquisition, the HTTP client, and group lookup.
//!
//! # Module Structure
//!
//! - [`auth`] - Bearer tokens (pre-acquired or client-credentials grant)
//! - [`client`] - Main Graph client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//! - [`groups`] - Group resolution by ID or display name
//!
//! # Example
//!
//! ```ignore
//! use crate::graph::auth::TokenSource;
//! use crate::graph::client::{GraphClient, DEFAULT_GRAPH_BASE_URL};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let source = TokenSource::Static(token);
//!     let client = GraphClient::connect(source, DEFAULT_GRAPH_BASE_URL).await?;
//!     let group = crate::graph::groups::resolve_group(&client, "IT-Admins").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod groups;
pub mod http;
