//! Error types
//!
//! Fatal errors (connection, group resolution, export) unwind to `main` and set a
//! non-zero exit code. [`RequestError`] is the only non-fatal kind: the pipeline logs it
//! and carries on with whatever data it already has.

use crate::graph::groups::Group;
use thiserror::Error;

/// A single Graph call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Caller passed an empty URL; nothing was sent.
    #[error("Empty request URL")]
    EmptyUrl,

    /// The request never produced an HTTP response.
    #[error("Failed to send request: {0}")]
    Transport(String),

    /// Graph answered with a non-success status.
    #[error("API request failed: {status} ({url})")]
    Status { status: u16, url: String },

    /// The body was not the JSON we expected.
    #[error("Failed to parse response JSON: {0}")]
    Decode(String),

    /// No bearer token could be obtained for the call.
    #[error("Failed to get access token: {0}")]
    Token(String),
}

impl RequestError {
    /// HTTP status code, when Graph returned one
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Could not establish the API session.
#[derive(Error, Debug, Clone)]
#[error("Failed to connect to Microsoft Graph: {0}")]
pub struct ConnectionError(pub String);

/// The caller-supplied group identifier did not resolve to exactly one group.
#[derive(Error, Debug, Clone)]
pub enum GroupResolutionError {
    #[error("No group found matching '{0}'")]
    NotFound(String),

    #[error(
        "{} groups share the display name '{identifier}'; re-run with a group ID",
        candidates.len()
    )]
    Ambiguous {
        identifier: String,
        candidates: Vec<Group>,
    },

    #[error("Group lookup failed: {0}")]
    Lookup(#[source] RequestError),
}

/// Writing the report file failed.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize export row: {0}")]
    Csv(#[from] csv::Error),
}

/// Everything that aborts a run.
#[derive(Error, Debug)]
pub enum CheckerError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    GroupResolution(#[from] GroupResolutionError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
