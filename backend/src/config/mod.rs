//! Configuration module for the attendance service.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! The resulting [`Config`] is built once at startup and handed to every component
//! through the application state.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

/// Base URL of the Notion REST API.
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// Protocol version sent in the `Notion-Version` header.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Weekday names used by the class database, Monday first.
const DEFAULT_WEEKDAY_LABELS: [&str; 7] = [
    "월요일", "화요일", "수요일", "목요일", "금요일", "토요일", "일요일",
];

/// Where tenant credentials and table identifiers come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// One global token and table pair taken from this configuration.
    Static,
    /// One JSON file per tenant under the data directory.
    File,
    /// SQLite tables keyed by tenant id.
    Sqlite,
}

impl std::str::FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(StoreBackend::Static),
            "file" => Ok(StoreBackend::File),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(AppError::Config(format!(
                "Unknown ATTENDANCE_STORE value '{}' (expected static, file or sqlite)",
                other
            ))),
        }
    }
}

/// Property names of the Notion databases the workflow reads and writes.
#[derive(Debug, Clone)]
pub struct PropertyNames {
    /// Title property holding the class name
    pub class_title: String,
    /// Multi-select property listing the weekdays a class runs on
    pub class_weekdays: String,
    /// Relation property listing enrolled students
    pub class_students: String,
    /// Title property of an attendance page
    pub record_title: String,
    /// Date property of an attendance page
    pub record_date: String,
    /// Relation from an attendance page to the student
    pub record_student: String,
    /// Relation from an attendance page to the class
    pub record_class: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            class_title: "수업명".to_string(),
            class_weekdays: "요일".to_string(),
            class_students: "수강생".to_string(),
            record_title: "제목".to_string(),
            record_date: "날짜".to_string(),
            record_student: "학생".to_string(),
            record_class: "수업".to_string(),
        }
    }
}

/// OAuth client settings, only needed by the `/auth` routes.
#[derive(Debug, Clone, Default)]
pub struct OAuthSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the JSON trigger (optional)
    pub api_psk: Option<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Tenant store backing
    pub store: StoreBackend,
    /// Directory for the file-backed tenant store
    pub data_dir: PathBuf,
    /// Path to SQLite database file for the sqlite-backed tenant store
    pub db_path: PathBuf,
    /// Global integration token (static store only)
    pub notion_token: Option<String>,
    /// Global class database id (static store only)
    pub class_db_id: Option<String>,
    /// Global attendance database id (static store only)
    pub record_db_id: Option<String>,
    /// Notion API base URL
    pub notion_api_base: String,
    /// Notion protocol version header value
    pub notion_version: String,
    /// Timeout applied to every outbound Notion call
    pub http_timeout: Duration,
    /// Upper bound on concurrent Notion calls within one run
    pub max_concurrency: usize,
    /// Weekday labels as stored in the class database, Monday first
    pub weekday_labels: [String; 7],
    /// Database property names
    pub properties: PropertyNames,
    /// OAuth client settings
    pub oauth: OAuthSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_psk: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            store: StoreBackend::Static,
            data_dir: PathBuf::from("./data"),
            db_path: PathBuf::from("./data/attendance.sqlite"),
            notion_token: None,
            class_db_id: None,
            record_db_id: None,
            notion_api_base: NOTION_API_BASE.to_string(),
            notion_version: NOTION_VERSION.to_string(),
            http_timeout: Duration::from_secs(5),
            max_concurrency: 4,
            weekday_labels: DEFAULT_WEEKDAY_LABELS.map(str::to_string),
            properties: PropertyNames::default(),
            oauth: OAuthSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let bind_addr = match non_empty_var("ATTENDANCE_BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Config(format!("Invalid ATTENDANCE_BIND_ADDR format: {}", raw))
            })?,
            None => defaults.bind_addr,
        };

        let store = match non_empty_var("ATTENDANCE_STORE") {
            Some(raw) => raw.parse()?,
            None => defaults.store,
        };

        let http_timeout = match non_empty_var("ATTENDANCE_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("ATTENDANCE_HTTP_TIMEOUT_SECS", &raw)?),
            None => defaults.http_timeout,
        };

        let max_concurrency = match non_empty_var("ATTENDANCE_MAX_CONCURRENCY") {
            Some(raw) => parse_positive("ATTENDANCE_MAX_CONCURRENCY", &raw)? as usize,
            None => defaults.max_concurrency,
        };

        let weekday_labels = match non_empty_var("ATTENDANCE_WEEKDAY_LABELS") {
            Some(raw) => parse_weekday_labels(&raw)?,
            None => defaults.weekday_labels,
        };

        let config = Self {
            api_psk: non_empty_var("ATTENDANCE_API_PSK"),
            bind_addr,
            log_level: non_empty_var("ATTENDANCE_LOG_LEVEL").unwrap_or(defaults.log_level),
            store,
            data_dir: non_empty_var("ATTENDANCE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            db_path: non_empty_var("ATTENDANCE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            notion_token: non_empty_var("ATTENDANCE_NOTION_TOKEN"),
            class_db_id: non_empty_var("ATTENDANCE_CLASS_DB_ID"),
            record_db_id: non_empty_var("ATTENDANCE_RECORD_DB_ID"),
            notion_api_base: defaults.notion_api_base,
            notion_version: defaults.notion_version,
            http_timeout,
            max_concurrency,
            weekday_labels,
            properties: defaults.properties,
            oauth: OAuthSettings {
                client_id: non_empty_var("ATTENDANCE_OAUTH_CLIENT_ID"),
                client_secret: non_empty_var("ATTENDANCE_OAUTH_CLIENT_SECRET"),
                redirect_uri: non_empty_var("ATTENDANCE_OAUTH_REDIRECT_URI"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field requirements that single variables cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.store == StoreBackend::Static && self.notion_token.is_none() {
            return Err(AppError::Config(
                "ATTENDANCE_NOTION_TOKEN must be set when ATTENDANCE_STORE=static".to_string(),
            ));
        }
        Ok(())
    }

    /// Label of the given weekday as it appears in the class database.
    pub fn weekday_label(&self, weekday: chrono::Weekday) -> &str {
        &self.weekday_labels[weekday.num_days_from_monday() as usize]
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, AppError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(AppError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}

fn parse_weekday_labels(raw: &str) -> Result<[String; 7], AppError> {
    let labels: Vec<String> = raw.split(',').map(|s| s.trim().to_string()).collect();
    if labels.iter().any(|l| l.is_empty()) {
        return Err(AppError::Config(
            "ATTENDANCE_WEEKDAY_LABELS must not contain empty labels".to_string(),
        ));
    }
    labels.try_into().map_err(|labels: Vec<String>| {
        AppError::Config(format!(
            "ATTENDANCE_WEEKDAY_LABELS needs 7 labels (Monday first), got {}",
            labels.len()
        ))
    })
}
