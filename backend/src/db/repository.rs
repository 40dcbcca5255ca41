//! Database repository for tenant records.
//!
//! Point lookups and point upserts keyed by tenant id.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Credential, IssuedMetadata, TenantConfig};

/// Database repository for all tenant operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== CREDENTIAL OPERATIONS ====================

    /// Get the credential stored for a tenant.
    pub async fn get_credential(&self, tenant_id: &str) -> Result<Option<Credential>, AppError> {
        let row = sqlx::query(
            "SELECT access_token, workspace_id, workspace_name, bot_id, obtained_at FROM credentials WHERE tenant_id = ?",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(credential_from_row).transpose()
    }

    /// Insert or replace the credential for a tenant.
    pub async fn upsert_credential(
        &self,
        tenant_id: &str,
        credential: &Credential,
    ) -> Result<(), AppError> {
        let meta = &credential.issued_metadata;
        sqlx::query(
            r#"
            INSERT INTO credentials (tenant_id, access_token, workspace_id, workspace_name, bot_id, obtained_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(tenant_id) DO UPDATE SET
                access_token = excluded.access_token,
                workspace_id = excluded.workspace_id,
                workspace_name = excluded.workspace_name,
                bot_id = excluded.bot_id,
                obtained_at = excluded.obtained_at
            "#,
        )
        .bind(tenant_id)
        .bind(&credential.access_token)
        .bind(&meta.workspace_id)
        .bind(&meta.workspace_name)
        .bind(&meta.bot_id)
        .bind(meta.obtained_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ==================== CONFIG OPERATIONS ====================

    /// Get the database configuration stored for a tenant.
    pub async fn get_config(&self, tenant_id: &str) -> Result<Option<TenantConfig>, AppError> {
        let row = sqlx::query(
            "SELECT class_table_id, attendance_table_id FROM tenant_configs WHERE tenant_id = ?",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| TenantConfig {
            class_table_id: row.get("class_table_id"),
            attendance_table_id: row.get("attendance_table_id"),
        }))
    }

    /// Insert or replace the database configuration for a tenant.
    pub async fn upsert_config(&self, tenant_id: &str, config: &TenantConfig) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO tenant_configs (tenant_id, class_table_id, attendance_table_id, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(tenant_id) DO UPDATE SET
                class_table_id = excluded.class_table_id,
                attendance_table_id = excluded.attendance_table_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(&config.class_table_id)
        .bind(&config.attendance_table_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn credential_from_row(row: &SqliteRow) -> Result<Credential, AppError> {
    let obtained_at: String = row.get("obtained_at");
    let obtained_at = DateTime::parse_from_rfc3339(&obtained_at)
        .map_err(|e| AppError::Database(format!("Invalid obtained_at timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(Credential {
        access_token: row.get("access_token"),
        issued_metadata: IssuedMetadata {
            workspace_id: row.get("workspace_id"),
            workspace_name: row.get("workspace_name"),
            bot_id: row.get("bot_id"),
            obtained_at,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_credential_upsert_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        assert!(repo.get_credential("u1").await.unwrap().is_none());

        let mut credential = Credential::from_token("first");
        credential.issued_metadata.workspace_name = Some("School".to_string());
        repo.upsert_credential("u1", &credential).await.unwrap();
        repo.upsert_credential("u1", &Credential::from_token("second"))
            .await
            .unwrap();

        let stored = repo.get_credential("u1").await.unwrap().unwrap();
        assert_eq!(stored.access_token, "second");
        assert!(stored.issued_metadata.workspace_name.is_none());
    }

    #[tokio::test]
    async fn test_config_roundtrip_per_tenant() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        let config = TenantConfig {
            class_table_id: "a".repeat(32),
            attendance_table_id: "b".repeat(32),
        };
        repo.upsert_config("u1", &config).await.unwrap();

        assert_eq!(repo.get_config("u1").await.unwrap(), Some(config));
        assert!(repo.get_config("u2").await.unwrap().is_none());
    }
}
