//! Schedule reader: today's classes from the class database.

use crate::config::PropertyNames;
use crate::models::{ClassSession, DEFAULT_CLASS_NAME};
use crate::notion::{NotionClient, NotionHeaders, Page};

/// Map one class database row to a [`ClassSession`].
pub fn parse_class(page: &Page, props: &PropertyNames) -> ClassSession {
    let display_name = page
        .property(&props.class_title)
        .and_then(|p| p.title_segments().first())
        .map(|segment| segment.content().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string());

    let scheduled_weekdays = page
        .property(&props.class_weekdays)
        .map(|p| p.option_names())
        .unwrap_or_default();

    let student_ids = page
        .property(&props.class_students)
        .map(|p| p.relation_ids())
        .unwrap_or_default();

    ClassSession {
        id: page.id.clone(),
        display_name,
        scheduled_weekdays,
        student_ids,
    }
}

/// Keep the classes that run on `weekday_label`, preserving query order.
pub fn classes_on(classes: Vec<ClassSession>, weekday_label: &str) -> Vec<ClassSession> {
    classes
        .into_iter()
        .filter(|class| class.runs_on(weekday_label))
        .collect()
}

/// Query the class database and return the classes scheduled for `weekday_label`.
///
/// A failed query degrades to an empty schedule.
pub async fn read_today_classes(
    notion: &NotionClient,
    headers: &NotionHeaders,
    class_table_id: &str,
    props: &PropertyNames,
    weekday_label: &str,
) -> Vec<ClassSession> {
    let pages = match notion.query_database(headers, class_table_id).await {
        Ok(pages) => pages,
        Err(e) => {
            tracing::error!(class_table_id, error = %e, "Failed to query class database");
            return Vec::new();
        }
    };

    let classes = pages.iter().map(|page| parse_class(page, props)).collect();
    let today = classes_on(classes, weekday_label);
    tracing::info!(
        weekday = weekday_label,
        rows = pages.len(),
        scheduled = today.len(),
        "read class schedule"
    );
    today
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

    fn class_page(id: &str, name: Option<&str>, days: &[&str], students: &[&str]) -> Page {
        let title = match name {
            Some(n) => json!([{ "text": { "content": n } }]),
            None => json!([]),
        };
        serde_json::from_value(json!({
            "id": id,
            "properties": {
                "수업명": { "type": "title", "title": title },
                "요일": {
                    "type": "multi_select",
                    "multi_select": days.iter().map(|d| json!({ "name": d })).collect::<Vec<_>>()
                },
                "수강생": {
                    "type": "relation",
                    "relation": students.iter().map(|s| json!({ "id": s })).collect::<Vec<_>>()
                }
            }
        }))
        .unwrap()
    }

    fn fixture() -> Vec<ClassSession> {
        let props = PropertyNames::default();
        [
            class_page("c1", Some("Math"), &["Mon", "Wed"], &["s1", "s2"]),
            class_page("c2", Some("Art"), &["Wed"], &["s3"]),
            class_page("c3", Some("Music"), &["Sat", "Sun"], &[]),
            class_page("c4", None, &[], &["s1"]),
        ]
        .iter()
        .map(|p| parse_class(p, &props))
        .collect()
    }

    #[test]
    fn test_parse_class_reads_all_fields() {
        let class = &fixture()[0];
        assert_eq!(class.id, "c1");
        assert_eq!(class.display_name, "Math");
        assert_eq!(class.scheduled_weekdays, vec!["Mon", "Wed"]);
        assert_eq!(class.student_ids, vec!["s1", "s2"]);
    }

    #[test]
    fn test_parse_class_defaults_missing_title() {
        let class = &fixture()[3];
        assert_eq!(class.display_name, DEFAULT_CLASS_NAME);
        assert!(class.scheduled_weekdays.is_empty());
    }

    #[test]
    fn test_weekday_filter_is_sound_and_complete() {
        let all = fixture();
        for label in LABELS {
            let today = classes_on(all.clone(), label);
            // Sound: everything returned runs today
            assert!(today.iter().all(|c| c.scheduled_weekdays.iter().any(|d| d == label)));
            // Complete: nothing that runs today was dropped
            let expected = all.iter().filter(|c| c.runs_on(label)).count();
            assert_eq!(today.len(), expected, "weekday {}", label);
        }
    }

    #[test]
    fn test_weekday_filter_keeps_query_order() {
        let names: Vec<_> = classes_on(fixture(), "Wed")
            .into_iter()
            .map(|c| c.display_name)
            .collect();
        assert_eq!(names, vec!["Math", "Art"]);
        assert!(classes_on(fixture(), "Thu").is_empty());
    }
}
