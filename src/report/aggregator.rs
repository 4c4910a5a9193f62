//! Record aggregation
//!
//! Collects normalized assignment records across every category traversal for one
//! run, in the order they were found.

use chrono::{DateTime, Local};
use std::fmt;

/// Inclusion or exclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentType {
    Included,
    Excluded,
}

impl AssignmentType {
    pub fn from_exclusion(is_exclusion: bool) -> Self {
        if is_exclusion {
            Self::Excluded
        } else {
            Self::Included
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Included => "Included",
            Self::Excluded => "Excluded",
        }
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One assignment of one resource to the target group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRecord {
    pub group_id: String,
    pub group_name: String,
    pub category: String,
    pub policy_name: String,
    pub policy_id: String,
    pub platform: String,
    pub assignment_type: AssignmentType,
    /// "N/A" unless the category has a deployment intent
    pub intent: String,
    pub collected_at: DateTime<Local>,
}

/// Included/excluded tallies for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub included: usize,
    pub excluded: usize,
}

impl fmt::Display for CategoryCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} included, {} excluded",
            self.category, self.included, self.excluded
        )
    }
}

/// Totals for the console summary
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    /// In first-seen order
    pub categories: Vec<CategoryCount>,
}

impl Summary {
    pub fn category(&self, name: &str) -> Option<&CategoryCount> {
        self.categories.iter().find(|c| c.category == name)
    }
}

/// Run-scoped, insertion-ordered record collection
#[derive(Debug, Clone, Default)]
pub struct RecordAggregator {
    records: Vec<AssignmentRecord>,
    /// Failed Graph calls per category name, in first-seen order
    degraded: Vec<(String, usize)>,
}

impl RecordAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AssignmentRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = AssignmentRecord>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[AssignmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by (category, policy name); ties keep collection order
    pub fn sorted(&self) -> Vec<&AssignmentRecord> {
        let mut sorted: Vec<&AssignmentRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.policy_name.cmp(&b.policy_name))
        });
        sorted
    }

    pub fn summary(&self) -> Summary {
        let mut categories: Vec<CategoryCount> = Vec::new();

        for record in &self.records {
            let idx = match categories.iter().position(|c| c.category == record.category) {
                Some(idx) => idx,
                None => {
                    categories.push(CategoryCount {
                        category: record.category.clone(),
                        included: 0,
                        excluded: 0,
                    });
                    categories.len() - 1
                }
            };
            match record.assignment_type {
                AssignmentType::Included => categories[idx].included += 1,
                AssignmentType::Excluded => categories[idx].excluded += 1,
            }
        }

        Summary {
            total: self.records.len(),
            categories,
        }
    }

    /// Count failed Graph calls against a category
    pub fn record_degraded(&mut self, category: &str, count: usize) {
        if count == 0 {
            return;
        }
        match self.degraded.iter_mut().find(|(name, _)| name == category) {
            Some((_, total)) => *total += count,
            None => self.degraded.push((category.to_string(), count)),
        }
    }

    pub fn degraded_calls(&self) -> &[(String, usize)] {
        &self.degraded
    }
}
