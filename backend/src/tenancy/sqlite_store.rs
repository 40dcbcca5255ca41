//! Document-store backing over the SQLite repository.

use async_trait::async_trait;

use super::{require_tenant, TenantStore};
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{Credential, TenantConfig};

pub struct SqliteStore {
    repo: Repository,
}

impl SqliteStore {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl TenantStore for SqliteStore {
    async fn resolve_credential(&self, tenant: Option<&str>) -> Result<Credential, AppError> {
        let tenant = require_tenant(tenant)?;
        self.repo
            .get_credential(tenant)
            .await?
            .ok_or_else(|| AppError::CredentialNotFound(tenant.to_string()))
    }

    async fn resolve_config(&self, tenant: Option<&str>) -> Result<TenantConfig, AppError> {
        let tenant = require_tenant(tenant)?;
        self.repo
            .get_config(tenant)
            .await?
            .ok_or_else(|| AppError::ConfigurationMissing(tenant.to_string()))
    }

    async fn save_credential(&self, tenant: &str, credential: &Credential) -> Result<(), AppError> {
        let tenant = require_tenant(Some(tenant))?;
        self.repo.upsert_credential(tenant, credential).await?;
        tracing::info!(tenant, "stored credential");
        Ok(())
    }

    async fn save_config(&self, tenant: &str, config: &TenantConfig) -> Result<(), AppError> {
        let tenant = require_tenant(Some(tenant))?;
        self.repo.upsert_config(tenant, config).await?;
        tracing::info!(tenant, "stored tenant configuration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sqlite_store_errors_by_tenant() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        let store = SqliteStore::new(Repository::new(pool));

        store
            .save_credential("u1", &Credential::from_token("secret_abc"))
            .await
            .unwrap();

        assert!(store.resolve_credential(Some("u1")).await.is_ok());
        assert!(matches!(
            store.resolve_credential(Some("u2")).await,
            Err(AppError::CredentialNotFound(_))
        ));
        assert!(matches!(
            store.resolve_config(Some("u1")).await,
            Err(AppError::ConfigurationMissing(_))
        ));
        assert!(matches!(
            store.resolve_config(None).await,
            Err(AppError::TenantRequired)
        ));
    }
}
