//! Assignment filtering
//!
//! Keeps the assignments of one resource that target the resolved group and tells
//! inclusions from exclusions.

use super::fetcher::str_field;
use serde_json::Value;

/// `@odata.type` of an exclusion target
pub const EXCLUSION_MARKER: &str = "#microsoft.graph.exclusionGroupAssignmentTarget";

/// Application intent when the assignment does not state one
pub const DEFAULT_APP_INTENT: &str = "available";

/// The `target` of one raw assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAssignmentTarget {
    pub group_id: Option<String>,
    pub target_discriminator: Option<String>,
}

impl RawAssignmentTarget {
    pub fn is_exclusion(&self) -> bool {
        self.target_discriminator.as_deref() == Some(EXCLUSION_MARKER)
    }
}

impl From<&Value> for RawAssignmentTarget {
    fn from(assignment: &Value) -> Self {
        let target = assignment.get("target").unwrap_or(&Value::Null);
        Self {
            group_id: str_field(target, "groupId"),
            target_discriminator: str_field(target, "@odata.type"),
        }
    }
}

/// An assignment that targets the resolved group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedAssignment {
    pub is_exclusion: bool,
    pub intent: Option<String>,
}

/// Retain assignments aimed at `group_id` (exact match) and classify each one
pub fn filter_assignments(
    raw: &[Value],
    group_id: &str,
    carries_intent: bool,
) -> Vec<MatchedAssignment> {
    raw.iter()
        .filter_map(|assignment| {
            let target = RawAssignmentTarget::from(assignment);
            if target.group_id.as_deref() != Some(group_id) {
                return None;
            }

            let intent = carries_intent.then(|| {
                str_field(assignment, "intent").unwrap_or_else(|| DEFAULT_APP_INTENT.to_string())
            });

            Some(MatchedAssignment {
                is_exclusion: target.is_exclusion(),
                intent,
            })
        })
        .collect()
}
