//! File-backed store: one JSON document per tenant.
//!
//! Layout under the data directory:
//! `credentials/<tenant>.json` and `configs/<tenant>.json`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::{require_tenant, TenantStore};
use crate::errors::AppError;
use crate::models::{Credential, TenantConfig};

const CREDENTIALS_DIR: &str = "credentials";
const CONFIGS_DIR: &str = "configs";

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store, creating its directories if needed.
    pub async fn open(root: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(root.join(CREDENTIALS_DIR)).await?;
        tokio::fs::create_dir_all(root.join(CONFIGS_DIR)).await?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn document_path(&self, kind: &str, tenant: &str) -> Result<PathBuf, AppError> {
        let safe = tenant
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(AppError::BadRequest(format!(
                "Invalid user id '{}': only letters, digits, '-' and '_' are allowed",
                tenant
            )));
        }
        Ok(self.root.join(kind).join(format!("{}.json", tenant)))
    }

    async fn read_document<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, AppError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        // Write then rename so readers never see a half-written file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl TenantStore for FileStore {
    async fn resolve_credential(&self, tenant: Option<&str>) -> Result<Credential, AppError> {
        let tenant = require_tenant(tenant)?;
        let path = self.document_path(CREDENTIALS_DIR, tenant)?;
        self.read_document(&path)
            .await?
            .ok_or_else(|| AppError::CredentialNotFound(tenant.to_string()))
    }

    async fn resolve_config(&self, tenant: Option<&str>) -> Result<TenantConfig, AppError> {
        let tenant = require_tenant(tenant)?;
        let path = self.document_path(CONFIGS_DIR, tenant)?;
        self.read_document(&path)
            .await?
            .ok_or_else(|| AppError::ConfigurationMissing(tenant.to_string()))
    }

    async fn save_credential(&self, tenant: &str, credential: &Credential) -> Result<(), AppError> {
        let tenant = require_tenant(Some(tenant))?;
        let path = self.document_path(CREDENTIALS_DIR, tenant)?;
        self.write_document(&path, credential).await?;
        tracing::info!(tenant, "stored credential");
        Ok(())
    }

    async fn save_config(&self, tenant: &str, config: &TenantConfig) -> Result<(), AppError> {
        let tenant = require_tenant(Some(tenant))?;
        let path = self.document_path(CONFIGS_DIR, tenant)?;
        self.write_document(&path, config).await?;
        tracing::info!(tenant, "stored tenant configuration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).await.unwrap();

        let err = store.resolve_credential(Some("u1")).await.unwrap_err();
        assert!(matches!(err, AppError::CredentialNotFound(t) if t == "u1"));
        let err = store.resolve_config(Some("u1")).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigurationMissing(t) if t == "u1"));

        store
            .save_credential("u1", &Credential::from_token("secret_abc"))
            .await
            .unwrap();
        let config = TenantConfig {
            class_table_id: "c".repeat(32),
            attendance_table_id: "r".repeat(32),
        };
        store.save_config("u1", &config).await.unwrap();

        assert_eq!(
            store.resolve_credential(Some("u1")).await.unwrap().access_token,
            "secret_abc"
        );
        assert_eq!(store.resolve_config(Some("u1")).await.unwrap(), config);
        assert!(temp_dir.path().join("configs").join("u1.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_rejects_unsafe_tenant_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).await.unwrap();

        let err = store.resolve_credential(Some("../etc")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = store.resolve_config(None).await.unwrap_err();
        assert!(matches!(err, AppError::TenantRequired));
    }
}
