//! Notion REST client.
//!
//! Wraps the handful of endpoints the service needs: database query, page
//! retrieval, page creation and the OAuth token exchange. Every call goes
//! through one `reqwest::Client` carrying the configured timeout.

mod types;

pub use types::*;

use std::collections::HashSet;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::{json, Value};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::Credential;

/// Header set authorizing calls on behalf of one tenant.
#[derive(Debug, Clone)]
pub struct NotionHeaders(HeaderMap);

impl NotionHeaders {
    /// Build `Authorization`, `Notion-Version` and `Content-Type` headers.
    pub fn new(access_token: &str, version: &str) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", access_token)).map_err(|_| {
            AppError::Internal("Stored access token is not a valid header value".to_string())
        })?;
        let version = HeaderValue::from_str(version)
            .map_err(|_| AppError::Config(format!("Invalid Notion version '{}'", version)))?;

        headers.insert(AUTHORIZATION, bearer);
        headers.insert("Notion-Version", version);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self(headers))
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.0
    }
}

/// Result of a page creation attempt that reached Notion.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub status: StatusCode,
    pub body: Value,
}

impl CreateOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Client for the Notion REST API.
#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    api_base: String,
    version: String,
}

impl NotionClient {
    /// Create a client from the process configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: config.notion_api_base.trim_end_matches('/').to_string(),
            version: config.notion_version.clone(),
        })
    }

    /// Header set for calls made with the given credential.
    pub fn headers_for(&self, credential: &Credential) -> Result<NotionHeaders, AppError> {
        NotionHeaders::new(&credential.access_token, &self.version)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Query every row of a database, following pagination cursors.
    pub async fn query_database(
        &self,
        headers: &NotionHeaders,
        database_id: &str,
    ) -> Result<Vec<Page>, AppError> {
        let url = self.url(&format!("/databases/{}/query", database_id));
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        loop {
            let body = match &cursor {
                Some(c) => json!({ "start_cursor": c }),
                None => json!({}),
            };

            let response = self
                .http
                .post(&url)
                .headers(headers.as_map().clone())
                .json(&body)
                .send()
                .await?;
            let response = ensure_success("database query", response).await?;
            let batch: QueryResponse = response.json().await?;

            tracing::debug!(
                database_id,
                rows = batch.results.len(),
                has_more = batch.has_more,
                "queried database"
            );
            pages.extend(batch.results);

            match batch.next_cursor {
                Some(next) if batch.has_more => {
                    if !seen_cursors.insert(next.clone()) {
                        tracing::warn!(database_id, cursor = %next, "repeated cursor, stopping");
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(pages)
    }

    /// Fetch a single page.
    pub async fn retrieve_page(
        &self,
        headers: &NotionHeaders,
        page_id: &str,
    ) -> Result<Page, AppError> {
        let response = self
            .http
            .get(self.url(&format!("/pages/{}", page_id)))
            .headers(headers.as_map().clone())
            .send()
            .await?;
        let response = ensure_success("page retrieval", response).await?;
        Ok(response.json().await?)
    }

    /// Create a page. Any HTTP status is returned as an outcome; only
    /// transport failures (including timeouts) are errors.
    pub async fn create_page(
        &self,
        headers: &NotionHeaders,
        body: &Value,
    ) -> Result<CreateOutcome, AppError> {
        let response = self
            .http
            .post(self.url("/pages"))
            .headers(headers.as_map().clone())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(CreateOutcome { status, body })
    }

    /// URL of the Notion consent screen for this integration.
    pub fn authorize_url(&self, client_id: &str, redirect_uri: &str) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            &self.url("/oauth/authorize"),
            &[
                ("client_id", client_id),
                ("response_type", "code"),
                ("owner", "user"),
                ("redirect_uri", redirect_uri),
            ],
        )
        .map_err(|e| AppError::Config(format!("Invalid OAuth authorize URL: {}", e)))?;
        Ok(url.to_string())
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(self.url("/oauth/token"))
            .basic_auth(client_id, Some(client_secret))
            .header("Notion-Version", &self.version)
            .json(&json!({
                "grant_type": "authorization_code",
                "code": code,
                "redirect_uri": redirect_uri,
            }))
            .send()
            .await?;
        let response = ensure_success("OAuth token exchange", response).await?;
        Ok(response.json().await?)
    }
}

/// Turn a non-success response into an `Upstream` error carrying status and body.
async fn ensure_success(context: &str, response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    tracing::warn!(%status, body = %body, "Notion {} failed", context);
    Err(AppError::Upstream(format!(
        "Notion {} failed ({}): {}",
        context, status, body
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_headers_carry_token_and_version() {
        let headers = NotionHeaders::new("secret_abc", "2022-06-28").unwrap();
        let map = headers.as_map();
        assert_eq!(map[AUTHORIZATION], "Bearer secret_abc");
        assert_eq!(map["Notion-Version"], "2022-06-28");
        assert_eq!(map[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_headers_reject_control_characters() {
        assert!(matches!(
            NotionHeaders::new("bad\ntoken", "2022-06-28"),
            Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_query_stops_on_repeated_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db1/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "id": "row" }],
                "has_more": true,
                "next_cursor": "stuck"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let config = Config {
            notion_api_base: format!("{}/v1", server.uri()),
            ..Config::default()
        };
        let client = NotionClient::new(&config).unwrap();
        let headers = NotionHeaders::new("secret_abc", "2022-06-28").unwrap();

        let pages = client.query_database(&headers, "db1").await.unwrap();
        assert_eq!(pages.len(), 2);
        server.verify().await;
    }

    #[test]
    fn test_authorize_url_encodes_redirect() {
        let client = NotionClient::new(&Config::default()).unwrap();
        let url = client
            .authorize_url("client-1", "http://localhost:8080/auth/callback")
            .unwrap();
        assert!(url.starts_with("https://api.notion.com/v1/oauth/authorize?"));
        assert!(url.contains("client_id=client-1"));
        assert!(url.contains("owner=user"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fcallback"));
    }
}
