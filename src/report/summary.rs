//! Console summary

use super::aggregator::{AssignmentType, RecordAggregator};
use crate::graph::groups::Group;
use crossterm::style::Stylize;
use std::io::{self, Write};

/// Print the run summary: totals, per-category counts, then every record sorted by
/// (category, policy name)
pub fn write_summary<W: Write>(
    out: &mut W,
    group: &Group,
    aggregator: &RecordAggregator,
    color: bool,
) -> io::Result<()> {
    let summary = aggregator.summary();

    let title = format!("Assignments for {} ({})", group.display_name, group.id);
    if color {
        writeln!(out, "{}", title.bold())?;
    } else {
        writeln!(out, "{}", title)?;
    }
    writeln!(out, "Total assignments: {}", summary.total)?;

    if !summary.categories.is_empty() {
        writeln!(out)?;
        for count in &summary.categories {
            writeln!(out, "  {}", count)?;
        }
    }

    if !aggregator.is_empty() {
        writeln!(out)?;
        for record in aggregator.sorted() {
            let label = record.assignment_type.as_str();
            let kind = match (record.assignment_type, color) {
                (AssignmentType::Included, true) => label.green().to_string(),
                (AssignmentType::Excluded, true) => label.red().to_string(),
                (_, false) => label.to_string(),
            };
            write!(
                out,
                "  [{}] {} - {} ({})",
                kind, record.category, record.policy_name, record.platform
            )?;
            if record.intent != "N/A" {
                write!(out, " intent: {}", record.intent)?;
            }
            writeln!(out)?;
        }
    }

    let degraded = aggregator.degraded_calls();
    if !degraded.is_empty() {
        writeln!(out)?;
        let heading = "Some Graph calls failed; results may be incomplete:";
        if color {
            writeln!(out, "{}", heading.yellow())?;
        } else {
            writeln!(out, "{}", heading)?;
        }
        for (category, count) in degraded {
            writeln!(out, "  {}: {} failed call(s)", category, count)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::aggregator::tests::record;

    #[test]
    fn test_summary_lists_counts_and_records() {
        let mut agg = RecordAggregator::new();
        agg.push(record("Settings Catalog", "Edge-Policy", AssignmentType::Excluded));
        agg.push(record("Device Configuration", "Baseline", AssignmentType::Included));

        let mut out = Vec::new();
        write_summary(&mut out, &Group::new("g-1", "IT-Admins"), &agg, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Total assignments: 2"));
        assert!(text.contains("Settings Catalog: 0 included, 1 excluded"));
        assert!(text.contains("Device Configuration: 1 included, 0 excluded"));
        let baseline = text.find("[Included] Device Configuration - Baseline").unwrap();
        let edge = text.find("[Excluded] Settings Catalog - Edge-Policy").unwrap();
        assert!(baseline < edge);
        assert!(!text.contains("\u{1b}["));
    }

    #[test]
    fn test_summary_reports_degraded_calls() {
        let mut agg = RecordAggregator::new();
        agg.record_degraded("App Protection", 2);

        let mut out = Vec::new();
        write_summary(&mut out, &Group::new("g-1", "IT-Admins"), &agg, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total assignments: 0"));
        assert!(text.contains("App Protection: 2 failed call(s)"));
    }
}
