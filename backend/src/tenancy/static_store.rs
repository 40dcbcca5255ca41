//! Single-tenant store answering every lookup from process configuration.

use async_trait::async_trait;

use super::TenantStore;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{Credential, TenantConfig};

/// Tenant id reported in errors when running single-tenant.
const DEFAULT_TENANT: &str = "default";

pub struct StaticStore {
    credential: Credential,
    config: Option<TenantConfig>,
}

impl StaticStore {
    pub fn new(credential: Credential, config: Option<TenantConfig>) -> Self {
        Self { credential, config }
    }

    /// Build from the global token and database ids. The token is mandatory.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let token = config.notion_token.clone().ok_or_else(|| {
            AppError::Config(
                "ATTENDANCE_NOTION_TOKEN must be set when ATTENDANCE_STORE=static".to_string(),
            )
        })?;

        let tables = match (&config.class_db_id, &config.record_db_id) {
            (Some(class_table_id), Some(attendance_table_id)) => Some(TenantConfig {
                class_table_id: class_table_id.clone(),
                attendance_table_id: attendance_table_id.clone(),
            }),
            _ => None,
        };

        Ok(Self::new(Credential::from_token(token), tables))
    }
}

#[async_trait]
impl TenantStore for StaticStore {
    async fn resolve_credential(&self, _tenant: Option<&str>) -> Result<Credential, AppError> {
        Ok(self.credential.clone())
    }

    async fn resolve_config(&self, tenant: Option<&str>) -> Result<TenantConfig, AppError> {
        self.config.clone().ok_or_else(|| {
            AppError::ConfigurationMissing(tenant.unwrap_or(DEFAULT_TENANT).to_string())
        })
    }

    async fn save_credential(
        &self,
        _tenant: &str,
        _credential: &Credential,
    ) -> Result<(), AppError> {
        Err(AppError::BadRequest(
            "The static store does not persist credentials; set ATTENDANCE_STORE=file or sqlite"
                .to_string(),
        ))
    }

    async fn save_config(&self, _tenant: &str, _config: &TenantConfig) -> Result<(), AppError> {
        Err(AppError::BadRequest(
            "The static store does not persist configuration; set ATTENDANCE_CLASS_DB_ID and ATTENDANCE_RECORD_DB_ID instead"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_store_ignores_tenant() {
        let config = Config {
            notion_token: Some("secret_abc".to_string()),
            class_db_id: Some("c".repeat(32)),
            record_db_id: Some("r".repeat(32)),
            ..Config::default()
        };
        let store = StaticStore::from_config(&config).unwrap();

        let credential = store.resolve_credential(Some("anyone")).await.unwrap();
        assert_eq!(credential.access_token, "secret_abc");
        let tables = store.resolve_config(None).await.unwrap();
        assert_eq!(tables.attendance_table_id, "r".repeat(32));
    }

    #[tokio::test]
    async fn test_static_store_without_tables() {
        let config = Config {
            notion_token: Some("secret_abc".to_string()),
            ..Config::default()
        };
        let store = StaticStore::from_config(&config).unwrap();
        let err = store.resolve_config(None).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigurationMissing(t) if t == "default"));
        assert!(store
            .save_config("u1", &TenantConfig {
                class_table_id: "a".to_string(),
                attendance_table_id: "b".to_string(),
            })
            .await
            .is_err());
    }

    #[test]
    fn test_static_store_requires_token() {
        assert!(StaticStore::from_config(&Config::default()).is_err());
    }
}
