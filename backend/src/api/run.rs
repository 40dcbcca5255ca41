//! Attendance trigger endpoints.

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use chrono::Local;
use serde::Serialize;

use super::{escape_html, TenantQuery};
use crate::errors::{AppError, HtmlError};
use crate::models::{ClassSummary, RunReport};
use crate::workflow::run_attendance;
use crate::AppState;

/// JSON body of a finished run.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub status: String,
    pub message: String,
    pub details: Vec<ClassSummary>,
}

impl From<RunReport> for RunResponse {
    fn from(report: RunReport) -> Self {
        let message = if report.classes.is_empty() {
            format!("No class today ({} {})", report.date, report.weekday_label)
        } else {
            format!(
                "Attendance run finished: {} created, {} failed",
                report.created(),
                report.failed()
            )
        };

        Self {
            status: "success".to_string(),
            message,
            details: report.classes,
        }
    }
}

async fn execute(state: &AppState, query: &TenantQuery) -> Result<RunReport, AppError> {
    let today = Local::now().date_naive();
    run_attendance(
        state.store.as_ref(),
        &state.notion,
        &state.config,
        query.tenant(),
        today,
    )
    .await
}

/// GET / - Run today's attendance and render an HTML summary.
pub async fn run_html(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Html<String>, HtmlError> {
    let report = execute(&state, &query).await?;
    Ok(Html(render_report(&report)))
}

/// GET|POST /api/run-attendance - Run today's attendance and return JSON.
pub async fn run_json(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<RunResponse>, AppError> {
    let report = execute(&state, &query).await?;
    Ok(Json(report.into()))
}

/// Render a run as the HTML summary page.
pub fn render_report(report: &RunReport) -> String {
    let mut html = format!(
        "<h2>{} ({})</h2>",
        report.date.format("%Y-%m-%d"),
        escape_html(&report.weekday_label)
    );

    if report.classes.is_empty() {
        html.push_str("<p>❗ No class today.</p>");
        return html;
    }

    for class in &report.classes {
        let names = class
            .student_names
            .iter()
            .map(|n| escape_html(n))
            .collect::<Vec<_>>()
            .join(", ");
        html.push_str(&format!(
            "<p>📚 {} : 👩‍🎓 {}</p>",
            escape_html(&class.name),
            names
        ));

        if !class.failed_student_names.is_empty() {
            let failed = class
                .failed_student_names
                .iter()
                .map(|n| escape_html(n))
                .collect::<Vec<_>>()
                .join(", ");
            html.push_str(&format!(
                "<p class=\"failed\">⚠️ {} : not recorded for {}</p>",
                escape_html(&class.name),
                failed
            ));
        }
    }
    html.push_str("<h3>✅ Attendance pages created!</h3>");
    html
}
