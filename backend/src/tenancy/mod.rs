//! Tenant credential and configuration resolution.
//!
//! The workflow only ever talks to [`TenantStore`]; which backing answers is
//! decided once at startup from [`StoreBackend`].

mod file_store;
mod identifier;
mod sqlite_store;
mod static_store;

pub use file_store::FileStore;
pub use identifier::extract_database_id;
pub use sqlite_store::SqliteStore;
pub use static_store::StaticStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StoreBackend};
use crate::db::{self, Repository};
use crate::errors::AppError;
use crate::models::{Credential, TenantConfig};

/// Point lookup and point upsert of per-tenant state.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Credential for the tenant, or `CredentialNotFound`.
    async fn resolve_credential(&self, tenant: Option<&str>) -> Result<Credential, AppError>;

    /// Class/attendance database pair for the tenant, or `ConfigurationMissing`.
    async fn resolve_config(&self, tenant: Option<&str>) -> Result<TenantConfig, AppError>;

    async fn save_credential(&self, tenant: &str, credential: &Credential)
        -> Result<(), AppError>;

    async fn save_config(&self, tenant: &str, config: &TenantConfig) -> Result<(), AppError>;
}

/// Build the store selected by the configuration.
pub async fn build_store(config: &Config) -> Result<Arc<dyn TenantStore>, AppError> {
    let store: Arc<dyn TenantStore> = match config.store {
        StoreBackend::Static => Arc::new(StaticStore::from_config(config)?),
        StoreBackend::File => Arc::new(FileStore::open(&config.data_dir).await?),
        StoreBackend::Sqlite => {
            let pool = db::init_database(&config.db_path).await?;
            Arc::new(SqliteStore::new(Repository::new(pool)))
        }
    };
    Ok(store)
}

/// Multi-tenant stores need an explicit, non-blank tenant id.
pub(crate) fn require_tenant(tenant: Option<&str>) -> Result<&str, AppError> {
    match tenant.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(AppError::TenantRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_tenant() {
        assert_eq!(require_tenant(Some(" u1 ")).unwrap(), "u1");
        assert!(matches!(require_tenant(None), Err(AppError::TenantRequired)));
        assert!(matches!(
            require_tenant(Some("  ")),
            Err(AppError::TenantRequired)
        ));
    }
}
