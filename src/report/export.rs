//! Export assignment records to CSV.
//!
//! One row per record, sorted by (Category, PolicyName), meant to be opened in a
//! spreadsheet.

use super::aggregator::{AssignmentRecord, RecordAggregator};
use crate::error::ExportError;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExportRow<'a> {
    group_name: &'a str,
    group_id: &'a str,
    category: &'a str,
    policy_name: &'a str,
    policy_id: &'a str,
    platform: &'a str,
    assignment_type: &'a str,
    intent: &'a str,
    collected_at: String,
}

impl<'a> From<&'a AssignmentRecord> for ExportRow<'a> {
    fn from(record: &'a AssignmentRecord) -> Self {
        Self {
            group_name: &record.group_name,
            group_id: &record.group_id,
            category: &record.category,
            policy_name: &record.policy_name,
            policy_id: &record.policy_id,
            platform: &record.platform,
            assignment_type: record.assignment_type.as_str(),
            intent: &record.intent,
            collected_at: record.collected_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Default file name: `IntuneGroupAssignments_<group>_<YYYYMMDD_HHMMSS>.csv`
pub fn default_export_path(
    group_name: &str,
    export_dir: Option<&Path>,
    now: DateTime<Local>,
) -> PathBuf {
    let file_name = format!(
        "IntuneGroupAssignments_{}_{}.csv",
        sanitize_file_component(group_name),
        now.format("%Y%m%d_%H%M%S")
    );
    match export_dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Replace characters that are not safe in file names
fn sanitize_file_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "group".to_string()
    } else {
        cleaned
    }
}

/// Write all records to a CSV file
pub fn write_records_csv(path: &Path, aggregator: &RecordAggregator) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(file);
    for record in aggregator.sorted() {
        writer.serialize(ExportRow::from(record))?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(
        "Exported {} records to {}",
        aggregator.len(),
        path.display()
    );
    Ok(())
}
