//! Tenant credential and configuration records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata returned alongside an access token by the OAuth exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuedMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    pub obtained_at: DateTime<Utc>,
}

/// A Notion access token stored for one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub issued_metadata: IssuedMetadata,
}

impl Credential {
    /// Credential with no OAuth metadata, as used by the static store.
    pub fn from_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            issued_metadata: IssuedMetadata {
                obtained_at: Utc::now(),
                ..IssuedMetadata::default()
            },
        }
    }
}

/// The two Notion databases that scope a tenant's runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub class_table_id: String,
    pub attendance_table_id: String,
}
