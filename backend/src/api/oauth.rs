//! Notion OAuth handshake.

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use chrono::Utc;
use serde::Deserialize;

use crate::config::OAuthSettings;
use crate::errors::{AppError, HtmlError};
use crate::models::{Credential, IssuedMetadata};
use crate::AppState;

use super::tenant_link;

/// Query string Notion appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

struct OAuthClient<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

fn oauth_client(settings: &OAuthSettings) -> Result<OAuthClient<'_>, AppError> {
    match (
        settings.client_id.as_deref(),
        settings.client_secret.as_deref(),
        settings.redirect_uri.as_deref(),
    ) {
        (Some(client_id), Some(client_secret), Some(redirect_uri)) => Ok(OAuthClient {
            client_id,
            client_secret,
            redirect_uri,
        }),
        _ => Err(AppError::Config(
            "OAuth is not configured: set ATTENDANCE_OAUTH_CLIENT_ID, ATTENDANCE_OAUTH_CLIENT_SECRET and ATTENDANCE_OAUTH_REDIRECT_URI"
                .to_string(),
        )),
    }
}

/// GET /auth - Redirect to the Notion consent screen.
pub async fn start_auth(State(state): State<AppState>) -> Result<Redirect, HtmlError> {
    let client = oauth_client(&state.config.oauth)?;
    let url = state
        .notion
        .authorize_url(client.client_id, client.redirect_uri)?;
    Ok(Redirect::temporary(&url))
}

/// GET /auth/callback - Exchange the code, store the credential, return to `/`.
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, HtmlError> {
    if let Some(error) = query.error {
        return Err(
            AppError::BadRequest(format!("Notion authorization was denied: {}", error)).into(),
        );
    }
    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let client = oauth_client(&state.config.oauth)?;
    let token = state
        .notion
        .exchange_code(
            client.client_id,
            client.client_secret,
            &code,
            client.redirect_uri,
        )
        .await?;

    let tenant = token.tenant_id().ok_or_else(|| {
        AppError::Upstream("Token response did not identify a user or workspace".to_string())
    })?;

    let credential = Credential {
        access_token: token.access_token,
        issued_metadata: IssuedMetadata {
            workspace_id: token.workspace_id,
            workspace_name: token.workspace_name,
            bot_id: token.bot_id,
            obtained_at: Utc::now(),
        },
    };
    state.store.save_credential(&tenant, &credential).await?;
    tracing::info!(tenant = %tenant, "OAuth handshake completed");

    Ok(Redirect::to(&tenant_link("/", &tenant)))
}
