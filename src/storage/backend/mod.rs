//! SeaORM 存储后端
//!
//! 支持 SQLite 与 PostgreSQL。`short_links` 表在 `short_id` 和 `original_url`
//! 上各有唯一索引，并发创建同一 URL 时由索引保证只有一个成功。

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use tracing::info;

use crate::config::StorageConfig;
use crate::errors::{Result, ShortenerError};
use crate::storage::{BackendKind, LinkStore, OwnedLink};

use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从 DSN 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<BackendKind> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok(BackendKind::Sqlite)
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
    {
        Ok(BackendKind::Postgres)
    } else {
        Err(ShortenerError::database_config(format!(
            "Cannot infer database type from DSN '{}'. Supported: sqlite://, *.db, postgres://",
            database_url
        )))
    }
}

/// 是否为唯一约束冲突（short_id 或 original_url）
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// 基于 SeaORM 的存储后端
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    kind: BackendKind,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, kind: BackendKind, config: &StorageConfig) -> Result<Self> {
        if database_url.is_empty() {
            return Err(ShortenerError::database_config("database DSN is empty"));
        }

        let db = match kind {
            BackendKind::Sqlite => connect_sqlite(database_url).await?,
            BackendKind::Postgres => connect_generic(database_url, kind, config.pool_size).await?,
            other => {
                return Err(ShortenerError::database_config(format!(
                    "'{}' is not a relational backend",
                    other
                )));
            }
        };

        run_migrations(&db).await?;

        let storage = SeaOrmStorage {
            db,
            kind,
            retry_config: retry::RetryConfig::from_storage_config(config),
        };
        info!("{} storage initialized", kind.as_ref().to_uppercase());
        Ok(storage)
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn save_owned(&self, owner_id: &str, short_id: &str, url: &str) -> Result<()> {
        self.insert_owned(owner_id, short_id, url).await
    }

    async fn save_batch_owned(&self, owner_id: &str, batch: &HashMap<String, String>) -> Result<()> {
        self.insert_batch(owner_id, batch).await
    }

    async fn load(&self, short_id: &str) -> Result<String> {
        self.load_url(short_id).await
    }

    async fn find_by_url(&self, url: &str) -> Result<String> {
        self.find_active_by_url(url).await
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<OwnedLink>> {
        self.list_active_by_owner(owner_id).await
    }

    async fn mark_deleted(&self, owner_id: &str, short_ids: &[String]) -> Result<()> {
        self.soft_delete(owner_id, short_ids).await
    }

    async fn health_check(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| ShortenerError::connection(format!("{} ping failed: {}", self.kind, e)))
    }

    fn backend_name(&self) -> &str {
        self.kind.as_ref()
    }
}
