//! Daily attendance workflow.
//!
//! Resolve the tenant, read today's classes, resolve student names once, then
//! write one attendance page per (class, student) pair.

mod schedule;
mod students;
mod writer;

pub use schedule::*;
pub use students::*;
pub use writer::*;

use chrono::{Datelike, NaiveDate};
use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ClassSummary, RunReport, UNNAMED_STUDENT};
use crate::notion::NotionClient;
use crate::tenancy::TenantStore;

/// Run the workflow for one tenant and date.
///
/// Missing credentials or configuration abort before any Notion call.
/// Everything after that degrades per item instead of failing the run.
pub async fn run_attendance(
    store: &dyn TenantStore,
    notion: &NotionClient,
    config: &Config,
    tenant: Option<&str>,
    today: NaiveDate,
) -> Result<RunReport, AppError> {
    let credential = store.resolve_credential(tenant).await?;
    let tables = store.resolve_config(tenant).await?;
    let headers = notion.headers_for(&credential)?;

    let weekday_label = config.weekday_label(today.weekday()).to_string();
    tracing::info!(
        tenant = tenant.unwrap_or("-"),
        %today,
        weekday = %weekday_label,
        "starting attendance run"
    );

    let classes = read_today_classes(
        notion,
        &headers,
        &tables.class_table_id,
        &config.properties,
        &weekday_label,
    )
    .await;

    if classes.is_empty() {
        tracing::info!(weekday = %weekday_label, "no class scheduled today");
        return Ok(RunReport {
            date: today,
            weekday_label,
            classes: Vec::new(),
        });
    }

    let student_ids = unique_student_ids(&classes);
    let names =
        resolve_student_names(notion, &headers, &student_ids, config.max_concurrency).await;

    let pairs: Vec<(usize, String, String)> = classes
        .iter()
        .enumerate()
        .flat_map(|(idx, class)| class.student_ids.iter().map(move |sid| (idx, sid.clone())))
        .map(|(idx, sid)| {
            let name = names
                .get(&sid)
                .cloned()
                .unwrap_or_else(|| UNNAMED_STUDENT.to_string());
            (idx, sid, name)
        })
        .collect();

    let classes = &classes;
    let headers = &headers;
    let tables = &tables;

    // `buffered` keeps results in enrollment order
    let results: Vec<(usize, String, bool)> = stream::iter(pairs)
        .map(|(idx, student_id, student_name): (usize, String, String)| async move {
            let class = &classes[idx];
            let entry = AttendanceEntry {
                student_id: &student_id,
                student_name: &student_name,
                class_id: &class.id,
                class_name: &class.display_name,
            };
            let outcome = write_attendance(
                notion,
                headers,
                &tables.attendance_table_id,
                &entry,
                today,
                &config.properties,
            )
            .await;
            tracing::debug!(
                student_id = %student_id,
                response = %outcome.response,
                "create page response"
            );
            (idx, student_name, outcome.success)
        })
        .buffered(config.max_concurrency.max(1))
        .collect()
        .await;

    let mut summaries: Vec<ClassSummary> = classes
        .iter()
        .map(|class| ClassSummary {
            name: class.display_name.clone(),
            ..ClassSummary::default()
        })
        .collect();

    for (idx, student_name, success) in results {
        let summary = &mut summaries[idx];
        if success {
            summary.student_names.push(student_name);
        } else {
            summary.failed_student_names.push(student_name);
        }
    }

    let report = RunReport {
        date: today,
        weekday_label,
        classes: summaries,
    };
    tracing::info!(
        classes = report.classes.len(),
        created = report.created(),
        failed = report.failed(),
        "attendance run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::tenancy::StaticStore;

    #[tokio::test]
    async fn test_run_on_spawned_task() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/classes/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "id": "class-math",
                    "properties": {
                        "수업명": { "type": "title", "title": [{ "text": { "content": "Math" } }] },
                        "요일": { "type": "multi_select", "multi_select": [{ "name": "월요일" }] },
                        "수강생": { "type": "relation", "relation": [{ "id": "s1" }, { "id": "s2" }] }
                    }
                }],
                "has_more": false
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/pages/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "s1",
                "properties": {
                    "이름": { "type": "title", "title": [{ "text": { "content": "Alice" } }] }
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "new" })))
            .expect(2)
            .mount(&server)
            .await;

        let config = Arc::new(Config {
            notion_token: Some("secret_abc".to_string()),
            class_db_id: Some("classes".to_string()),
            record_db_id: Some("records".to_string()),
            notion_api_base: format!("{}/v1", server.uri()),
            ..Config::default()
        });
        let store = Arc::new(StaticStore::from_config(&config).unwrap());
        let notion = Arc::new(NotionClient::new(&config).unwrap());
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        // Handlers need the run future to be `Send`, as a spawned task does
        let report = tokio::spawn(async move {
            run_attendance(store.as_ref(), &notion, &config, None, monday).await
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(report.classes.len(), 1);
        assert_eq!(report.classes[0].student_names, vec!["Alice", "unnamed"]);
        assert!(report.classes[0].failed_student_names.is_empty());
        server.verify().await;
    }
}
