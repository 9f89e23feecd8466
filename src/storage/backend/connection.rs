use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{Result, ShortenerError};
use crate::storage::BackendKind;
use migration::{Migrator, MigratorTrait};

/// 连接 SQLite，文件不存在时自动创建，开启 WAL
pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
    use std::str::FromStr;

    let url = normalize_sqlite_url(database_url);
    let opt = SqliteConnectOptions::from_str(&url)
        .map_err(|e| ShortenerError::database_config(format!("Invalid SQLite DSN: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
        ShortenerError::connection(format!("Failed to connect to SQLite: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 裸文件路径（`links.db`）补上 `sqlite://` 前缀
fn normalize_sqlite_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    }
}

/// 连接 PostgreSQL
pub async fn connect_generic(
    database_url: &str,
    kind: BackendKind,
    pool_size: u32,
) -> Result<DatabaseConnection> {
    let pool_size = pool_size.max(1);
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(pool_size)
        .min_connections(pool_size.min(2))
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        ShortenerError::connection(format!("Failed to connect to {}: {}", kind, e))
    })
}

/// 建表（幂等）
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| ShortenerError::database_operation(format!("Migration failed: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
