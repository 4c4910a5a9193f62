//! Resource abstraction layer
//!
//! Everything needed to go from an Intune resource family to the assignments that
//! target one group.
//!
//! # Architecture
//!
//! - [`registry`] - The closed set of resource categories and their endpoints
//! - [`fetcher`] - Listing with `@odata.nextLink` pagination
//! - [`dispatch`] - Maps a category + resource to its assignments endpoint
//! - [`filter`] - Keeps assignments aimed at the target group
//! - [`platform`] - Platform labels
//!
//! # Example
//!
//! ```ignore
//! use crate::resource::{fetch_all, ResourceCategory};
//!
//! async fn list_compliance(client: &GraphClient) -> Vec<serde_json::Value> {
//!     let url = client.url(&ResourceCategory::CompliancePolicy.listing_path());
//!     fetch_all(client, &url).await.items
//! }
//! ```

pub mod dispatch;
pub mod fetcher;
pub mod filter;
pub mod platform;
pub mod registry;

pub use dispatch::{assignments_endpoint, AssignmentEndpoint, Dispatch};
pub use fetcher::{fetch_all, Fetched};
pub use filter::{filter_assignments, MatchedAssignment, EXCLUSION_MARKER};
pub use platform::{classify, platform_for};
pub use registry::*;
