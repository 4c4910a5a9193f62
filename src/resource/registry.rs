//! Resource Registry - the Intune resource families we traverse
//!
//! Each [`ResourceCategory`] knows its collection endpoint, how to label its
//! records, and whether it has a fixed platform.

use serde_json::Value;
use std::fmt;

use super::fetcher::str_field;

/// Script flavours, listed from separate collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    PowerShell,
    ProactiveRemediation,
}

/// Concrete type of an app protection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppProtectionKind {
    Android,
    Ios,
    Windows,
}

impl AppProtectionKind {
    /// Map the detail record's `@odata.type` to a kind
    pub fn from_discriminator(discriminator: &str) -> Option<Self> {
        match discriminator {
            "#microsoft.graph.androidManagedAppProtection" => Some(Self::Android),
            "#microsoft.graph.iosManagedAppProtection" => Some(Self::Ios),
            "#microsoft.graph.windowsManagedAppProtection" => Some(Self::Windows),
            _ => None,
        }
    }

    /// Collection holding this kind's assignments
    pub fn collection_path(self) -> &'static str {
        match self {
            Self::Android => "deviceAppManagement/androidManagedAppProtections",
            Self::Ios => "deviceAppManagement/iosManagedAppProtections",
            Self::Windows => "deviceAppManagement/windowsManagedAppProtections",
        }
    }
}

/// Endpoint security template families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointSecurityFamily {
    Antivirus,
    DiskEncryption,
    Firewall,
    Edr,
    Asr,
    Other,
}

/// Ordered template-id markers; first match wins
const TEMPLATE_MARKERS: &[(&str, EndpointSecurityFamily)] = &[
    ("antivirus", EndpointSecurityFamily::Antivirus),
    ("diskencryption", EndpointSecurityFamily::DiskEncryption),
    ("firewall", EndpointSecurityFamily::Firewall),
    ("endpointdetection", EndpointSecurityFamily::Edr),
    ("attacksurface", EndpointSecurityFamily::Asr),
];

impl EndpointSecurityFamily {
    /// Derive the family from an intent's template identifier
    pub fn from_template_id(template_id: Option<&str>) -> Self {
        let Some(template_id) = template_id else {
            return Self::Other;
        };
        let lower = template_id.to_lowercase();
        TEMPLATE_MARKERS
            .iter()
            .find(|(marker, _)| lower.contains(marker))
            .map(|(_, family)| *family)
            .unwrap_or(Self::Other)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Antivirus => "Endpoint Security - Antivirus",
            Self::DiskEncryption => "Endpoint Security - Disk Encryption",
            Self::Firewall => "Endpoint Security - Firewall",
            Self::Edr => "Endpoint Security - EDR",
            Self::Asr => "Endpoint Security - ASR",
            Self::Other => "Endpoint Security - Other",
        }
    }
}

/// Intune resource families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    DeviceConfiguration,
    SettingsCatalog,
    CompliancePolicy,
    AppProtectionPolicy,
    AppConfigurationPolicy,
    Application,
    Script(ScriptKind),
    EndpointSecurityPolicy,
}

/// Fixed traversal order; scripts are listed from two collections
pub const TRAVERSAL_ORDER: [ResourceCategory; 9] = [
    ResourceCategory::DeviceConfiguration,
    ResourceCategory::SettingsCatalog,
    ResourceCategory::CompliancePolicy,
    ResourceCategory::AppProtectionPolicy,
    ResourceCategory::AppConfigurationPolicy,
    ResourceCategory::Application,
    ResourceCategory::Script(ScriptKind::PowerShell),
    ResourceCategory::Script(ScriptKind::ProactiveRemediation),
    ResourceCategory::EndpointSecurityPolicy,
];

impl ResourceCategory {
    /// Collection listing path, relative to the Graph base
    pub fn collection_path(self) -> &'static str {
        match self {
            Self::DeviceConfiguration => "deviceManagement/deviceConfigurations",
            Self::SettingsCatalog => "deviceManagement/configurationPolicies",
            Self::CompliancePolicy => "deviceManagement/deviceCompliancePolicies",
            Self::AppProtectionPolicy => "deviceAppManagement/managedAppPolicies",
            Self::AppConfigurationPolicy => "deviceAppManagement/mobileAppConfigurations",
            Self::Application => "deviceAppManagement/mobileApps",
            Self::Script(ScriptKind::PowerShell) => "deviceManagement/deviceManagementScripts",
            Self::Script(ScriptKind::ProactiveRemediation) => {
                "deviceManagement/deviceHealthScripts"
            }
            Self::EndpointSecurityPolicy => "deviceManagement/intents",
        }
    }

    /// Query string appended when listing the collection
    pub fn collection_query(self) -> Option<&'static str> {
        match self {
            Self::Application => Some("$filter=isAssigned%20eq%20true"),
            _ => None,
        }
    }

    /// Collection path plus query, ready to join onto the Graph base
    pub fn listing_path(self) -> String {
        match self.collection_query() {
            Some(query) => format!("{}?{}", self.collection_path(), query),
            None => self.collection_path().to_string(),
        }
    }

    /// Category name used for logging and diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Self::DeviceConfiguration => "Device Configuration",
            Self::SettingsCatalog => "Settings Catalog",
            Self::CompliancePolicy => "Compliance Policy",
            Self::AppProtectionPolicy => "App Protection",
            Self::AppConfigurationPolicy => "App Configuration",
            Self::Application => "Application",
            Self::Script(ScriptKind::PowerShell) => "PowerShell Script",
            Self::Script(ScriptKind::ProactiveRemediation) => "Proactive Remediation",
            Self::EndpointSecurityPolicy => "Endpoint Security",
        }
    }

    /// Record label for one resource of this category
    pub fn label_for(self, resource: &ResourceDescriptor) -> &'static str {
        match self {
            Self::EndpointSecurityPolicy => {
                EndpointSecurityFamily::from_template_id(resource.template_id.as_deref()).label()
            }
            other => other.name(),
        }
    }

    /// Platform label for categories that do not need classification
    pub fn fixed_platform(self) -> Option<&'static str> {
        match self {
            Self::Script(_) => Some("Windows"),
            Self::AppConfigurationPolicy => Some("Mobile"),
            Self::EndpointSecurityPolicy => Some("Windows"),
            Self::Application => Some("Multi-Platform"),
            Self::DeviceConfiguration
            | Self::SettingsCatalog
            | Self::CompliancePolicy
            | Self::AppProtectionPolicy => None,
        }
    }

    /// Whether assignments carry a deployment intent
    pub fn carries_intent(self) -> bool {
        matches!(self, Self::Application)
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A listed Intune resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub id: String,
    pub display_name: String,
    /// `@odata.type`
    pub discriminator: Option<String>,
    pub platforms: Option<Vec<String>>,
    /// Endpoint security intents only
    pub template_id: Option<String>,
}

impl From<&Value> for ResourceDescriptor {
    fn from(value: &Value) -> Self {
        Self {
            id: str_field(value, "id").unwrap_or_default(),
            display_name: str_field(value, "displayName")
                .or_else(|| str_field(value, "name"))
                .unwrap_or_else(|| "-".to_string()),
            discriminator: str_field(value, "@odata.type"),
            platforms: parse_platforms(value.get("platforms")),
            template_id: str_field(value, "templateId"),
        }
    }
}

/// `platforms` is a flags string on Settings Catalog ("windows10,macOS") and an
/// array elsewhere
fn parse_platforms(value: Option<&Value>) -> Option<Vec<String>> {
    let platforms: Vec<String> = match value? {
        Value::String(s) => s
            .split(',')
            .map(|p| p.trim())
            .filter(|p| !p.is_empty() && *p != "none")
            .map(|p| p.to_string())
            .collect(),
        Value::Array(arr) => arr
            .iter()
            .filter_map(|v| v.as_str())
            .map(|p| p.trim())
            .filter(|p| !p.is_empty() && *p != "none")
            .map(|p| p.to_string())
            .collect(),
        _ => return None,
    };

    if platforms.is_empty() {
        None
    } else {
        Some(platforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_traversal_order_starts_and_ends() {
        assert_eq!(TRAVERSAL_ORDER[0], ResourceCategory::DeviceConfiguration);
        assert_eq!(TRAVERSAL_ORDER[8], ResourceCategory::EndpointSecurityPolicy);
    }

    #[test]
    fn test_application_listing_filters_assigned() {
        assert_eq!(
            ResourceCategory::Application.listing_path(),
            "deviceAppManagement/mobileApps?$filter=isAssigned%20eq%20true"
        );
        assert_eq!(
            ResourceCategory::CompliancePolicy.listing_path(),
            "deviceManagement/deviceCompliancePolicies"
        );
    }

    #[test]
    fn test_endpoint_security_family_first_match_wins() {
        assert_eq!(
            EndpointSecurityFamily::from_template_id(Some("4356d05c-firewall-template")),
            EndpointSecurityFamily::Firewall
        );
        assert_eq!(
            EndpointSecurityFamily::from_template_id(Some("antivirus-firewall")),
            EndpointSecurityFamily::Antivirus
        );
        assert_eq!(
            EndpointSecurityFamily::from_template_id(Some("DiskEncryption_BitLocker")),
            EndpointSecurityFamily::DiskEncryption
        );
        assert_eq!(
            EndpointSecurityFamily::from_template_id(Some("e44c2ca3-2f9a-400a-a113")),
            EndpointSecurityFamily::Other
        );
        assert_eq!(
            EndpointSecurityFamily::from_template_id(None),
            EndpointSecurityFamily::Other
        );
    }

    #[test]
    fn test_app_protection_kind_from_discriminator() {
        assert_eq!(
            AppProtectionKind::from_discriminator("#microsoft.graph.androidManagedAppProtection"),
            Some(AppProtectionKind::Android)
        );
        assert_eq!(
            AppProtectionKind::from_discriminator(
                "#microsoft.graph.mdmWindowsInformationProtectionPolicy"
            ),
            None
        );
    }

    #[test]
    fn test_descriptor_falls_back_to_name() {
        let resource = ResourceDescriptor::from(&json!({
            "id": "p-1",
            "name": "Edge-Policy",
            "platforms": "windows10",
            "@odata.type": "#microsoft.graph.deviceManagementConfigurationPolicy"
        }));
        assert_eq!(resource.display_name, "Edge-Policy");
        assert_eq!(resource.platforms, Some(vec!["windows10".to_string()]));
    }

    #[test]
    fn test_parse_platforms_variants() {
        assert_eq!(
            parse_platforms(Some(&json!("windows10, macOS"))),
            Some(vec!["windows10".to_string(), "macOS".to_string()])
        );
        assert_eq!(
            parse_platforms(Some(&json!(["iOS", "android"]))),
            Some(vec!["iOS".to_string(), "android".to_string()])
        );
        assert_eq!(parse_platforms(Some(&json!("none"))), None);
        assert_eq!(parse_platforms(Some(&json!([]))), None);
        assert_eq!(parse_platforms(None), None);
    }

    #[test]
    fn test_blank_platform_entries_fall_back_to_multi_platform() {
        assert_eq!(parse_platforms(Some(&json!(["", "  "]))), None);
        assert_eq!(
            parse_platforms(Some(&json!(["", "macOS"]))),
            Some(vec!["macOS".to_string()])
        );

        let resource = ResourceDescriptor::from(&json!({
            "id": "cp-1",
            "displayName": "Untyped",
            "platforms": [""]
        }));
        assert_eq!(
            crate::resource::platform::classify(&resource),
            crate::resource::platform::MULTI_PLATFORM
        );
    }

    #[test]
    fn test_fixed_platforms() {
        assert_eq!(
            ResourceCategory::Script(ScriptKind::ProactiveRemediation).fixed_platform(),
            Some("Windows")
        );
        assert_eq!(ResourceCategory::AppConfigurationPolicy.fixed_platform(), Some("Mobile"));
        assert_eq!(ResourceCategory::DeviceConfiguration.fixed_platform(), None);
    }
}
