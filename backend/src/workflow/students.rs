//! Student name resolution.

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};

use crate::models::{ClassSession, Student, UNNAMED_STUDENT};
use crate::notion::{NotionClient, NotionHeaders, Page};

/// Student ids across all classes, each once, in first-seen order.
pub fn unique_student_ids(classes: &[ClassSession]) -> Vec<String> {
    let mut seen = HashSet::new();
    classes
        .iter()
        .flat_map(|c| c.student_ids.iter())
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Display name of a student page: its title text, trimmed, or `"unnamed"`.
pub fn student_name(page: &Page) -> String {
    page.title_text()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNNAMED_STUDENT.to_string())
}

async fn resolve_one(notion: &NotionClient, headers: &NotionHeaders, id: &str) -> Student {
    let display_name = match notion.retrieve_page(headers, id).await {
        Ok(page) => student_name(&page),
        Err(e) => {
            tracing::warn!(
                student_id = id,
                error = %e,
                "Failed to fetch student, using fallback name"
            );
            UNNAMED_STUDENT.to_string()
        }
    };
    Student {
        id: id.to_string(),
        display_name,
    }
}

/// Fetch each student page once and map id to display name.
///
/// Ids must already be unique. Fetch failures fall back to `"unnamed"`.
pub async fn resolve_student_names(
    notion: &NotionClient,
    headers: &NotionHeaders,
    student_ids: &[String],
    concurrency: usize,
) -> HashMap<String, String> {
    stream::iter(student_ids.iter().cloned())
        .map(|id: String| async move { resolve_one(notion, headers, &id).await })
        .buffer_unordered(concurrency.max(1))
        .map(|student| (student.id, student.display_name))
        .collect()
        .await
}
