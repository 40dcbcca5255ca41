//! Attendance writer: one Notion page per (student, class) pair.

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::config::PropertyNames;
use crate::notion::{NotionClient, NotionHeaders};

/// The student/class pair an attendance page is written for.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceEntry<'a> {
    pub student_id: &'a str,
    pub student_name: &'a str,
    pub class_id: &'a str,
    pub class_name: &'a str,
}

/// Result of one write attempt.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub success: bool,
    pub response: Value,
}

/// Page title, e.g. `2026.10.19 / Alice`.
pub fn attendance_title(date: NaiveDate, student_name: &str) -> String {
    format!("{} / {}", date.format("%Y.%m.%d"), student_name)
}

/// Request body creating the attendance page. Depends only on its inputs.
pub fn build_attendance_page(
    attendance_table_id: &str,
    entry: &AttendanceEntry<'_>,
    date: NaiveDate,
    props: &PropertyNames,
) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        props.record_title.clone(),
        json!({ "title": [{ "text": { "content": attendance_title(date, entry.student_name) } }] }),
    );
    properties.insert(
        props.record_date.clone(),
        json!({ "date": { "start": date.format("%Y-%m-%d").to_string() } }),
    );
    properties.insert(
        props.record_student.clone(),
        json!({ "relation": [{ "id": entry.student_id }] }),
    );
    properties.insert(
        props.record_class.clone(),
        json!({ "relation": [{ "id": entry.class_id }] }),
    );

    json!({
        "parent": { "database_id": attendance_table_id },
        "properties": properties,
    })
}

/// Create one attendance page. Never retried; failures are logged and reported.
pub async fn write_attendance(
    notion: &NotionClient,
    headers: &NotionHeaders,
    attendance_table_id: &str,
    entry: &AttendanceEntry<'_>,
    date: NaiveDate,
    props: &PropertyNames,
) -> WriteOutcome {
    let body = build_attendance_page(attendance_table_id, entry, date, props);

    match notion.create_page(headers, &body).await {
        Ok(outcome) if outcome.is_success() => {
            tracing::info!(
                class = entry.class_name,
                student = entry.student_name,
                "attendance page created"
            );
            WriteOutcome {
                success: true,
                response: outcome.body,
            }
        }
        Ok(outcome) => {
            tracing::error!(
                class = entry.class_name,
                student = entry.student_name,
                status = %outcome.status,
                body = %outcome.body,
                "attendance page creation failed"
            );
            WriteOutcome {
                success: false,
                response: outcome.body,
            }
        }
        Err(e) => {
            tracing::error!(
                class = entry.class_name,
                student = entry.student_name,
                error = %e,
                "attendance page request failed"
            );
            WriteOutcome {
                success: false,
                response: Value::String(e.message()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> AttendanceEntry<'static> {
        AttendanceEntry {
            student_id: "student-1",
            student_name: "Alice",
            class_id: "class-math",
            class_name: "Math",
        }
    }

    #[test]
    fn test_title_uses_dotted_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(attendance_title(date, "Alice"), "2026.03.02 / Alice");
    }

    #[test]
    fn test_page_body_shape() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let body = build_attendance_page("records-db", &entry(), date, &PropertyNames::default());

        assert_eq!(body["parent"]["database_id"], "records-db");
        let props = &body["properties"];
        assert_eq!(
            props["제목"]["title"][0]["text"]["content"],
            "2026.10.19 / Alice"
        );
        assert_eq!(props["날짜"]["date"]["start"], "2026-10-19");
        assert_eq!(props["학생"]["relation"][0]["id"], "student-1");
        assert_eq!(props["수업"]["relation"][0]["id"], "class-math");
    }

    #[test]
    fn test_page_body_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let props = PropertyNames::default();
        let first = build_attendance_page("records-db", &entry(), date, &props);
        let second = build_attendance_page("records-db", &entry(), date, &props);
        assert_eq!(first, second);
    }

    #[test]
    fn test_page_body_follows_property_names() {
        let props = PropertyNames {
            record_title: "Name".to_string(),
            record_date: "Date".to_string(),
            record_student: "Student".to_string(),
            record_class: "Class".to_string(),
            ..PropertyNames::default()
        };
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let body = build_attendance_page("records-db", &entry(), date, &props);
        assert_eq!(body["properties"]["Student"]["relation"][0]["id"], "student-1");
        assert!(body["properties"].get("학생").is_none());
    }
}
