//! One-time setup: capture a tenant's class and attendance databases.

use axum::{
    extract::{Query, State},
    response::Html,
    Form,
};
use serde::Deserialize;

use super::{escape_html, tenant_link, TenantQuery};
use crate::errors::{AppError, HtmlError};
use crate::models::TenantConfig;
use crate::tenancy::extract_database_id;
use crate::AppState;

/// Form body posted by the setup page.
#[derive(Debug, Deserialize)]
pub struct SetupForm {
    pub user_id: String,
    /// Class database id or URL
    pub class_db: String,
    /// Attendance database id or URL
    pub attendance_db: String,
}

impl SetupForm {
    /// Canonical database ids extracted from the submitted values.
    pub fn tenant_config(&self) -> Result<TenantConfig, AppError> {
        Ok(TenantConfig {
            class_table_id: extract_database_id(&self.class_db)?,
            attendance_table_id: extract_database_id(&self.attendance_db)?,
        })
    }
}

/// GET /setup - Render the setup form.
pub async fn setup_form(Query(query): Query<TenantQuery>) -> Html<String> {
    let user_id = escape_html(query.tenant().unwrap_or_default());
    Html(format!(
        r#"<h2>Attendance setup</h2>
<form method="post" action="/setup">
  <label>User ID <input name="user_id" value="{user_id}" required></label><br>
  <label>Class database (ID or URL) <input name="class_db" size="80" required></label><br>
  <label>Attendance database (ID or URL) <input name="attendance_db" size="80" required></label><br>
  <button type="submit">Save</button>
</form>"#
    ))
}

/// POST /setup - Store the tenant's database pair.
pub async fn save_setup(
    State(state): State<AppState>,
    Form(form): Form<SetupForm>,
) -> Result<Html<String>, HtmlError> {
    let tenant = form.user_id.trim();
    if tenant.is_empty() {
        return Err(AppError::TenantRequired.into());
    }

    let config = form.tenant_config()?;
    state.store.save_config(tenant, &config).await?;

    Ok(Html(render_saved(tenant, &config)))
}

fn render_saved(tenant: &str, config: &TenantConfig) -> String {
    format!(
        r#"<h2>Setup saved</h2>
<p>Class database: <code>{}</code></p>
<p>Attendance database: <code>{}</code></p>
<p><a href="{}">Run today's attendance</a></p>"#,
        config.class_table_id,
        config.attendance_table_id,
        escape_html(&tenant_link("/", tenant))
    )
}
