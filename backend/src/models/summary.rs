//! Per-run attendance summaries returned to the trigger caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of one class in a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassSummary {
    pub name: String,
    /// Students whose attendance page was created
    pub student_names: Vec<String>,
    /// Students whose attendance page could not be created
    pub failed_student_names: Vec<String>,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub date: NaiveDate,
    pub weekday_label: String,
    pub classes: Vec<ClassSummary>,
}

impl RunReport {
    /// Number of attendance pages created across all classes.
    pub fn created(&self) -> usize {
        self.classes.iter().map(|c| c.student_names.len()).sum()
    }

    /// Number of attendance pages that failed across all classes.
    pub fn failed(&self) -> usize {
        self.classes
            .iter()
            .map(|c| c.failed_student_names.len())
            .sum()
    }
}
