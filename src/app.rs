//! Assignment collection run
//!
//! Resolves the group once, walks every resource category in a fixed order and hands
//! the collected records to the exporters. All run state lives in [`RunContext`].

use crate::error::CheckerError;
use crate::graph::client::GraphClient;
use crate::graph::groups::{resolve_group, Group};
use crate::report::{
    default_export_path, write_records_csv, write_summary, AssignmentRecord, AssignmentType,
    RecordAggregator,
};
use crate::resource::{
    assignments_endpoint, fetch_all, filter_assignments, platform_for, Dispatch,
    MatchedAssignment, ResourceCategory, ResourceDescriptor, TRAVERSAL_ORDER,
};
use chrono::Local;
use crossterm::style::Stylize;
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::PathBuf;

/// Intent value for categories without one
pub const NO_INTENT: &str = "N/A";

/// Default number of resources processed at once within a category
pub const DEFAULT_CONCURRENCY: usize = 4;

/// What the operator asked for
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Group object ID or display name
    pub group: String,
    /// Explicit export file; derived from the group name when absent
    pub export_path: Option<PathBuf>,
    /// Directory for the derived export file
    pub export_dir: Option<PathBuf>,
    pub concurrency: usize,
    /// Write the CSV file at all
    pub export: bool,
    /// Colored console output
    pub color: bool,
}

impl RunOptions {
    pub fn new(group: &str) -> Self {
        Self {
            group: group.to_string(),
            export_path: None,
            export_dir: None,
            concurrency: DEFAULT_CONCURRENCY,
            export: true,
            color: false,
        }
    }
}

/// What happened to the export file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// Nothing was assigned, so no file was written
    SkippedEmpty,
    Disabled,
}

/// Result of a completed run
#[derive(Debug)]
pub struct RunReport {
    pub group: Group,
    pub records: RecordAggregator,
    pub export: ExportOutcome,
}

/// State scoped to one run
#[derive(Debug)]
pub struct RunContext {
    pub group: Group,
    pub concurrency: usize,
    pub records: RecordAggregator,
}

impl RunContext {
    pub fn new(group: Group, concurrency: usize) -> Self {
        Self {
            group,
            concurrency: concurrency.max(1),
            records: RecordAggregator::new(),
        }
    }
}

#[derive(Default)]
struct ResourceOutcome {
    records: Vec<AssignmentRecord>,
    failures: usize,
}

/// Build the normalized record for one matched assignment
pub fn normalize(
    group: &Group,
    category: ResourceCategory,
    resource: &ResourceDescriptor,
    platform: &str,
    matched: MatchedAssignment,
) -> AssignmentRecord {
    AssignmentRecord {
        group_id: group.id.clone(),
        group_name: group.display_name.clone(),
        category: category.label_for(resource).to_string(),
        policy_name: resource.display_name.clone(),
        policy_id: resource.id.clone(),
        platform: platform.to_string(),
        assignment_type: AssignmentType::from_exclusion(matched.is_exclusion),
        intent: matched.intent.unwrap_or_else(|| NO_INTENT.to_string()),
        collected_at: Local::now(),
    }
}

async fn collect_resource(
    client: &GraphClient,
    group: &Group,
    category: ResourceCategory,
    resource: &ResourceDescriptor,
) -> ResourceOutcome {
    let endpoint = match assignments_endpoint(client, category, resource).await {
        Dispatch::Endpoint(endpoint) => endpoint,
        Dispatch::Skipped => return ResourceOutcome::default(),
        Dispatch::Failed(_) => {
            return ResourceOutcome {
                records: Vec::new(),
                failures: 1,
            }
        }
    };

    let fetched = fetch_all(client, &endpoint.url).await;
    let failures = usize::from(fetched.is_degraded());
    let matched = filter_assignments(&fetched.items, &group.id, category.carries_intent());
    if matched.is_empty() {
        return ResourceOutcome {
            records: Vec::new(),
            failures,
        };
    }

    // The detail record is authoritative when the listing carried no type
    let platform = match (&resource.discriminator, endpoint.detail_discriminator) {
        (None, Some(detail)) => {
            let mut typed = resource.clone();
            typed.discriminator = Some(detail);
            platform_for(category, &typed)
        }
        _ => platform_for(category, resource),
    };

    tracing::debug!(
        "{} '{}': {} matching assignment(s)",
        category,
        resource.display_name,
        matched.len()
    );

    ResourceOutcome {
        records: matched
            .into_iter()
            .map(|m| normalize(group, category, resource, &platform, m))
            .collect(),
        failures,
    }
}

/// Walk one category and append its records in listing order
pub async fn collect_category(
    client: &GraphClient,
    ctx: &mut RunContext,
    category: ResourceCategory,
) {
    tracing::info!("Checking {} assignments", category);

    let listing = fetch_all(client, &client.url(&category.listing_path())).await;
    let mut failures = usize::from(listing.is_degraded());

    let resources: Vec<ResourceDescriptor> = listing
        .items
        .iter()
        .map(ResourceDescriptor::from)
        .filter(|r| !r.id.is_empty())
        .collect();

    let group = &ctx.group;
    // buffered() yields in input order, so appends below keep listing order
    let outcomes: Vec<ResourceOutcome> = stream::iter(resources.iter())
        .map(|resource| collect_resource(client, group, category, resource))
        .buffered(ctx.concurrency)
        .collect()
        .await;

    let before = ctx.records.len();
    for outcome in outcomes {
        failures += outcome.failures;
        ctx.records.extend(outcome.records);
    }

    tracing::info!(
        "{}: {} resource(s), {} matching record(s)",
        category,
        resources.len(),
        ctx.records.len() - before
    );
    if failures > 0 {
        tracing::warn!("{}: {} Graph call(s) failed", category, failures);
    }
    ctx.records.record_degraded(category.name(), failures);
}

/// Collect assignment records for an already-resolved group
pub async fn collect_assignments(
    client: &GraphClient,
    group: Group,
    concurrency: usize,
) -> RecordAggregator {
    let mut ctx = RunContext::new(group, concurrency);
    for category in TRAVERSAL_ORDER {
        collect_category(client, &mut ctx, category).await;
    }
    ctx.records
}

/// Full run: resolve, collect, summarize, export
pub async fn run<W: Write>(
    client: &GraphClient,
    options: &RunOptions,
    out: &mut W,
) -> Result<RunReport, CheckerError> {
    let group = resolve_group(client, &options.group).await?;
    tracing::info!("Resolved group '{}' ({})", group.display_name, group.id);

    let records = collect_assignments(client, group.clone(), options.concurrency).await;

    if let Err(e) = write_summary(out, &group, &records, options.color) {
        tracing::warn!("Failed to print summary: {}", e);
    }

    if records.is_empty() {
        let message = format!("No assignments found for group '{}'", group.display_name);
        tracing::warn!("{}", message);
        let _ = if options.color {
            writeln!(out, "{}", message.yellow())
        } else {
            writeln!(out, "{}", message)
        };
        return Ok(RunReport {
            group,
            records,
            export: ExportOutcome::SkippedEmpty,
        });
    }

    if !options.export {
        return Ok(RunReport {
            group,
            records,
            export: ExportOutcome::Disabled,
        });
    }

    let path = options.export_path.clone().unwrap_or_else(|| {
        default_export_path(&group.display_name, options.export_dir.as_deref(), Local::now())
    });
    write_records_csv(&path, &records)?;
    let _ = writeln!(out, "\nExported {} record(s) to {}", records.len(), path.display());

    Ok(RunReport {
        group,
        records,
        export: ExportOutcome::Written(path),
    })
}
