//! Class and student records read from Notion during a run.

/// Display name used when a class page has no title.
pub const DEFAULT_CLASS_NAME: &str = "class";

/// Display name used when a student page has no usable title.
pub const UNNAMED_STUDENT: &str = "unnamed";

/// One row of the class database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSession {
    pub id: String,
    pub display_name: String,
    /// Weekday labels exactly as stored in the multi-select property
    pub scheduled_weekdays: Vec<String>,
    /// Related student page ids in enrollment order
    pub student_ids: Vec<String>,
}

impl ClassSession {
    /// Whether the class runs on the weekday with the given label.
    pub fn runs_on(&self, weekday_label: &str) -> bool {
        self.scheduled_weekdays.iter().any(|d| d == weekday_label)
    }
}

/// A student page resolved to its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: String,
    pub display_name: String,
}
