//! Platform labels
//!
//! Derives a human-readable platform from a resource's `@odata.type`, falling back to
//! its `platforms` list.

use super::registry::{ResourceCategory, ResourceDescriptor};

pub const MULTI_PLATFORM: &str = "Multi-Platform";

/// Classify a resource by its discriminator
pub fn classify(resource: &ResourceDescriptor) -> String {
    classify_discriminator(resource.discriminator.as_deref())
        .map(|label| label.to_string())
        .unwrap_or_else(|| match &resource.platforms {
            Some(platforms) if !platforms.is_empty() => platforms.join(", "),
            _ => MULTI_PLATFORM.to_string(),
        })
}

/// Platform for a resource of a given category; fixed-platform categories skip
/// classification entirely
pub fn platform_for(category: ResourceCategory, resource: &ResourceDescriptor) -> String {
    match category.fixed_platform() {
        Some(platform) => platform.to_string(),
        None => classify(resource),
    }
}

fn classify_discriminator(discriminator: Option<&str>) -> Option<&'static str> {
    let lower = discriminator?.to_lowercase();

    if lower.contains("android") {
        return Some(if lower.contains("workprofile") {
            "Android Work Profile"
        } else if lower.contains("deviceowner") {
            "Android Enterprise"
        } else {
            "Android"
        });
    }
    if lower.contains("ios") || lower.contains("ipad") {
        return Some("iOS/iPadOS");
    }
    if lower.contains("macos") {
        return Some("macOS");
    }
    if lower.contains("windows") {
        return Some("Windows");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::registry::ScriptKind;

    fn resource(discriminator: Option<&str>, platforms: Option<Vec<&str>>) -> ResourceDescriptor {
        ResourceDescriptor {
            id: "r-1".to_string(),
            display_name: "Policy".to_string(),
            discriminator: discriminator.map(|d| d.to_string()),
            platforms: platforms.map(|p| p.into_iter().map(|s| s.to_string()).collect()),
            template_id: None,
        }
    }

    #[test]
    fn test_android_variants() {
        assert_eq!(
            classify(&resource(
                Some("#microsoft.graph.androidWorkProfileGeneralDeviceConfiguration"),
                None
            )),
            "Android Work Profile"
        );
        assert_eq!(
            classify(&resource(
                Some("#microsoft.graph.androidDeviceOwnerGeneralDeviceConfiguration"),
                None
            )),
            "Android Enterprise"
        );
        assert_eq!(
            classify(&resource(Some("#microsoft.graph.androidManagedAppProtection"), None)),
            "Android"
        );
    }

    #[test]
    fn test_apple_and_windows() {
        assert_eq!(
            classify(&resource(Some("#microsoft.graph.iosCompliancePolicy"), None)),
            "iOS/iPadOS"
        );
        assert_eq!(
            classify(&resource(Some("#microsoft.graph.iPadOSWebClip"), None)),
            "iOS/iPadOS"
        );
        assert_eq!(
            classify(&resource(Some("#microsoft.graph.macOSCustomConfiguration"), None)),
            "macOS"
        );
        assert_eq!(
            classify(&resource(Some("#microsoft.graph.windows10CompliancePolicy"), None)),
            "Windows"
        );
    }

    #[test]
    fn test_android_takes_precedence() {
        // "android" wins even when another marker is present
        assert_eq!(
            classify(&resource(Some("androidForWindowsIos"), None)),
            "Android"
        );
    }

    #[test]
    fn test_fallback_to_platforms_list() {
        assert_eq!(
            classify(&resource(
                Some("#microsoft.graph.deviceManagementConfigurationPolicy"),
                Some(vec!["windows10", "macOS"])
            )),
            "windows10, macOS"
        );
        assert_eq!(classify(&resource(None, None)), MULTI_PLATFORM);
        assert_eq!(classify(&resource(None, Some(vec![]))), MULTI_PLATFORM);
    }

    #[test]
    fn test_fixed_platform_bypasses_classifier() {
        let r = resource(Some("#microsoft.graph.iosMobileAppConfiguration"), None);
        assert_eq!(platform_for(ResourceCategory::AppConfigurationPolicy, &r), "Mobile");
        assert_eq!(
            platform_for(ResourceCategory::Script(ScriptKind::PowerShell), &r),
            "Windows"
        );
        assert_eq!(platform_for(ResourceCategory::Application, &r), MULTI_PLATFORM);
        assert_eq!(platform_for(ResourceCategory::CompliancePolicy, &r), "iOS/iPadOS");
    }
}
