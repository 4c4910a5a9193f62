//! Resource Fetcher
//!
//! Walks Graph collection listings by following `@odata.nextLink` until the server
//! stops returning one.

use crate::error::RequestError;
use crate::graph::client::GraphClient;
use serde_json::Value;
use std::collections::HashSet;

/// Continuation cursor field on a Graph page
pub const NEXT_LINK_FIELD: &str = "@odata.nextLink";

/// Outcome of a listing walk
///
/// A failed page does not discard earlier pages: `items` holds everything collected
/// before the failure and `failure` says why the walk stopped early.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub failure: Option<RequestError>,
}

impl<T> Fetched<T> {
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            failure: None,
        }
    }

    pub fn degraded(items: Vec<T>, failure: RequestError) -> Self {
        Self {
            items,
            failure: Some(failure),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

/// Fetch all items of a collection (auto-paginate)
pub async fn fetch_all(client: &GraphClient, url: &str) -> Fetched<Value> {
    walk(client, url, false).await
}

/// Like [`fetch_all`], for directory queries that need eventual consistency
pub async fn fetch_all_eventual(client: &GraphClient, url: &str) -> Fetched<Value> {
    walk(client, url, true).await
}

async fn walk(client: &GraphClient, url: &str, eventual: bool) -> Fetched<Value> {
    let mut all_items = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut next: Option<String> = Some(url.to_string());
    let mut page = 0usize;

    while let Some(current) = next.take() {
        page += 1;
        let response = if eventual {
            client.get_eventual(&current).await
        } else {
            client.get(&current).await
        };
        match response {
            Ok(response) => {
                all_items.extend(page_items(&response));
                visited.insert(current);
                next = next_link(&response).filter(|link| {
                    let repeated = visited.contains(link);
                    if repeated {
                        tracing::warn!(
                            "Listing {} returned an already visited nextLink at page {}, stopping",
                            url,
                            page
                        );
                    }
                    !repeated
                });
            }
            Err(e) => {
                tracing::warn!(
                    "Listing {} stopped at page {} ({} items kept): {}",
                    url,
                    page,
                    all_items.len(),
                    e
                );
                return Fetched::degraded(all_items, e);
            }
        }
    }

    tracing::debug!("Fetched {} items from {} in {} page(s)", all_items.len(), url, page);
    Fetched::complete(all_items)
}

/// Items of one page; a bare array is accepted as well as the usual `value` wrapper
pub fn page_items(response: &Value) -> Vec<Value> {
    if let Some(arr) = response.as_array() {
        return arr.clone();
    }
    response
        .get("value")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

/// Continuation cursor of one page, if the server supplied a non-empty one
pub fn next_link(response: &Value) -> Option<String> {
    response
        .get(NEXT_LINK_FIELD)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Read a string field from a JSON object
pub fn str_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_items_reads_value_array() {
        let page = json!({"value": [{"id": "1"}, {"id": "2"}]});
        assert_eq!(page_items(&page).len(), 2);
    }

    #[test]
    fn test_page_items_missing_value_is_empty() {
        assert!(page_items(&json!({"@odata.context": "x"})).is_empty());
        assert!(page_items(&Value::Null).is_empty());
    }

    #[test]
    fn test_next_link() {
        let page = json!({"value": [], "@odata.nextLink": "https://graph/next"});
        assert_eq!(next_link(&page).as_deref(), Some("https://graph/next"));
        assert_eq!(next_link(&json!({"value": []})), None);
        assert_eq!(next_link(&json!({"@odata.nextLink": ""})), None);
        assert_eq!(next_link(&json!({"@odata.nextLink": null})), None);
    }

    #[test]
    fn test_empty_url_degrades_without_request() {
        let client = GraphClient::new(
            crate::graph::auth::TokenSource::Static("t".to_string()),
            "http://127.0.0.1:9",
        )
        .unwrap();
        let fetched = tokio_test::block_on(fetch_all(&client, ""));
        assert!(fetched.items.is_empty());
        assert_eq!(fetched.failure, Some(RequestError::EmptyUrl));
    }
}
