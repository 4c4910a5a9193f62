//! Assignment endpoint dispatch
//!
//! Maps a category and resource to the URL that lists its assignments. App protection
//! policies share one collection but keep their assignments under per-platform
//! collections, so those need a detail fetch first.

use super::fetcher::str_field;
use super::registry::{AppProtectionKind, ResourceCategory, ResourceDescriptor};
use crate::error::RequestError;
use crate::graph::client::GraphClient;

/// Where to list one resource's assignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentEndpoint {
    pub url: String,
    /// `@odata.type` read from the detail record, when one was fetched
    pub detail_discriminator: Option<String>,
}

/// Outcome of resolving an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Endpoint(AssignmentEndpoint),
    /// Unrecognized sub-type; nothing to list
    Skipped,
    /// Detail fetch failed
    Failed(RequestError),
}

/// Assignment path for a category whose endpoint does not depend on a sub-type
pub fn direct_assignments_path(category: ResourceCategory, resource_id: &str) -> Option<String> {
    match category {
        ResourceCategory::AppProtectionPolicy => None,
        ResourceCategory::DeviceConfiguration
        | ResourceCategory::SettingsCatalog
        | ResourceCategory::CompliancePolicy
        | ResourceCategory::AppConfigurationPolicy
        | ResourceCategory::Application
        | ResourceCategory::Script(_)
        | ResourceCategory::EndpointSecurityPolicy => Some(format!(
            "{}/{}/assignments",
            category.collection_path(),
            urlencoding::encode(resource_id)
        )),
    }
}

/// Assignment path for an app protection policy of a known kind
pub fn app_protection_assignments_path(kind: AppProtectionKind, resource_id: &str) -> String {
    format!(
        "{}/{}/assignments",
        kind.collection_path(),
        urlencoding::encode(resource_id)
    )
}

/// Resolve the assignments endpoint for one resource
pub async fn assignments_endpoint(
    client: &GraphClient,
    category: ResourceCategory,
    resource: &ResourceDescriptor,
) -> Dispatch {
    if let Some(path) = direct_assignments_path(category, &resource.id) {
        return Dispatch::Endpoint(AssignmentEndpoint {
            url: client.url(&path),
            detail_discriminator: None,
        });
    }

    let detail_path = format!(
        "{}/{}",
        category.collection_path(),
        urlencoding::encode(&resource.id)
    );
    let detail = match client.get_path(&detail_path).await {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!(
                "Failed to fetch {} details for '{}': {}",
                category,
                resource.display_name,
                e
            );
            return Dispatch::Failed(e);
        }
    };

    let discriminator = str_field(&detail, "@odata.type");
    let Some(kind) = discriminator
        .as_deref()
        .and_then(AppProtectionKind::from_discriminator)
    else {
        tracing::debug!(
            "Skipping {} '{}': unsupported type {:?}",
            category,
            resource.display_name,
            discriminator
        );
        return Dispatch::Skipped;
    };

    Dispatch::Endpoint(AssignmentEndpoint {
        url: client.url(&app_protection_assignments_path(kind, &resource.id)),
        detail_discriminator: discriminator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::registry::ScriptKind;

    #[test]
    fn test_direct_paths() {
        assert_eq!(
            direct_assignments_path(ResourceCategory::DeviceConfiguration, "abc").as_deref(),
            Some("deviceManagement/deviceConfigurations/abc/assignments")
        );
        assert_eq!(
            direct_assignments_path(ResourceCategory::Application, "app-1").as_deref(),
            Some("deviceAppManagement/mobileApps/app-1/assignments")
        );
        assert_eq!(
            direct_assignments_path(
                ResourceCategory::Script(ScriptKind::ProactiveRemediation),
                "s-1"
            )
            .as_deref(),
            Some("deviceManagement/deviceHealthScripts/s-1/assignments")
        );
    }

    #[test]
    fn test_app_protection_has_no_direct_path() {
        assert_eq!(
            direct_assignments_path(ResourceCategory::AppProtectionPolicy, "T_1"),
            None
        );
    }

    #[test]
    fn test_app_protection_paths_are_kind_specific() {
        assert_eq!(
            app_protection_assignments_path(AppProtectionKind::Android, "T_1"),
            "deviceAppManagement/androidManagedAppProtections/T_1/assignments"
        );
        assert_eq!(
            app_protection_assignments_path(AppProtectionKind::Ios, "T_1"),
            "deviceAppManagement/iosManagedAppProtections/T_1/assignments"
        );
        assert_eq!(
            app_protection_assignments_path(AppProtectionKind::Windows, "T_1"),
            "deviceAppManagement/windowsManagedAppProtections/T_1/assignments"
        );
    }

    #[test]
    fn test_resource_id_is_encoded() {
        assert_eq!(
            direct_assignments_path(ResourceCategory::CompliancePolicy, "a b").as_deref(),
            Some("deviceManagement/deviceCompliancePolicies/a%20b/assignments")
        );
    }
}
