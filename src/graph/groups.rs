//! Entra ID Groups
//!
//! Resolves the operator's group identifier (object ID or display name) to exactly
//! one group.

use super::client::GraphClient;
use crate::error::GroupResolutionError;
use crate::resource::fetcher::{fetch_all_eventual, str_field};
use serde_json::Value;
use url::Url;

/// Group information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub display_name: String,
}

impl Group {
    pub fn new(id: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

impl From<&Value> for Group {
    fn from(value: &Value) -> Self {
        Self {
            id: str_field(value, "id").unwrap_or_default(),
            display_name: str_field(value, "displayName").unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// True for the canonical 8-4-4-4-12 hexadecimal object ID form
pub fn is_object_id(identifier: &str) -> bool {
    identifier.len() == 36 && uuid::Uuid::try_parse(identifier).is_ok()
}

/// Escape a literal for use inside an OData string
pub fn escape_odata(value: &str) -> String {
    value.replace('\'', "''")
}

/// Resolve an ID or display name to a single group
pub async fn resolve_group(
    client: &GraphClient,
    identifier: &str,
) -> Result<Group, GroupResolutionError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(GroupResolutionError::NotFound(identifier.to_string()));
    }

    if is_object_id(identifier) {
        tracing::debug!("Resolving group by ID {}", identifier);
        return match client.get_path(&format!("groups/{}", identifier)).await {
            Ok(value) => {
                let group = Group::from(&value);
                if group.id.is_empty() {
                    Err(GroupResolutionError::NotFound(identifier.to_string()))
                } else {
                    Ok(group)
                }
            }
            Err(e) if e.is_not_found() => {
                Err(GroupResolutionError::NotFound(identifier.to_string()))
            }
            Err(e) => Err(GroupResolutionError::Lookup(e)),
        };
    }

    tracing::debug!("Resolving group by display name '{}'", identifier);
    let url = display_name_query(client, identifier)?;
    let fetched = fetch_all_eventual(client, &url).await;
    if let Some(failure) = fetched.failure {
        return Err(GroupResolutionError::Lookup(failure));
    }

    let mut matches: Vec<Group> = fetched.items.iter().map(Group::from).collect();
    match matches.len() {
        0 => Err(GroupResolutionError::NotFound(identifier.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(GroupResolutionError::Ambiguous {
            identifier: identifier.to_string(),
            candidates: matches,
        }),
    }
}

fn display_name_query(
    client: &GraphClient,
    display_name: &str,
) -> Result<String, GroupResolutionError> {
    let mut url = Url::parse(&client.url("groups")).map_err(|e| {
        GroupResolutionError::Lookup(crate::error::RequestError::Transport(e.to_string()))
    })?;
    url.query_pairs_mut()
        .append_pair(
            "$filter",
            &format!("displayName eq '{}'", escape_odata(display_name)),
        )
        .append_pair("$select", "id,displayName");
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_object_id() {
        assert!(is_object_id("0b1d7b4c-5a8f-4e1e-9d55-2f0f3c9d7a11"));
        assert!(is_object_id("0B1D7B4C-5A8F-4E1E-9D55-2F0F3C9D7A11"));
        assert!(!is_object_id("0b1d7b4c5a8f4e1e9d552f0f3c9d7a11"));
        assert!(!is_object_id("{0b1d7b4c-5a8f-4e1e-9d55-2f0f3c9d7a11}"));
        assert!(!is_object_id("IT-Admins"));
        assert!(!is_object_id("0b1d7b4c-5a8f-4e1e-9d55-2f0f3c9d7azz"));
    }

    #[test]
    fn test_escape_odata() {
        assert_eq!(escape_odata("O'Brien's team"), "O''Brien''s team");
    }

    #[test]
    fn test_group_from_value() {
        let group = Group::from(&json!({"id": "g-1", "displayName": "IT-Admins"}));
        assert_eq!(group, Group::new("g-1", "IT-Admins"));
    }

    #[test]
    fn test_display_name_query_is_encoded() {
        let client = GraphClient::new(
            crate::graph::auth::TokenSource::Static("t".to_string()),
            "https://graph.microsoft.com/beta",
        )
        .unwrap();
        let url = display_name_query(&client, "Sales & Marketing").unwrap();
        assert!(url.starts_with("https://graph.microsoft.com/beta/groups?"));
        assert!(url.contains("%26"));
        assert!(!url.contains(" & "));
    }
}
