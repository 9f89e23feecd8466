//! 存储层
//!
//! 所有后端都实现 `LinkStore`。后端在启动时由 [`StorageFactory`] 选定一次，
//! 以 `Arc<dyn LinkStore>` 共享。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::StorageConfig;
use crate::errors::Result;

pub mod backend;
pub mod file;
pub mod memory;
pub mod models;
mod table;

pub use backend::SeaOrmStorage;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use models::{BackendKind, OwnedLink, ShortLink};

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// 匿名保存，等价于 owner 为空的 `save_owned`
    async fn save(&self, short_id: &str, url: &str) -> Result<()> {
        self.save_owned("", short_id, url).await
    }

    /// 保存一条记录
    ///
    /// - URL 已映射到其他 short id → `UrlConflict`（优先检查）
    /// - short id 已映射到其他 URL → `ShortIdConflict`
    /// - 完全相同的记录已存在 → `Ok(())`，不做任何改动
    async fn save_owned(&self, owner_id: &str, short_id: &str, url: &str) -> Result<()>;

    /// 批量保存 `short_id → url`；与已有记录冲突的条目被跳过
    async fn save_batch_owned(&self, owner_id: &str, batch: &HashMap<String, String>) -> Result<()>;

    /// 解析 short id；不存在 → `NotFound`，已软删除 → `Deleted`
    async fn load(&self, short_id: &str) -> Result<String>;

    /// 反查 URL 对应的未删除 short id
    async fn find_by_url(&self, url: &str) -> Result<String>;

    /// owner 的未删除链接，按插入顺序
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<OwnedLink>>;

    /// 软删除；不属于 owner 或不存在的 id 被静默忽略
    async fn mark_deleted(&self, owner_id: &str, short_ids: &[String]) -> Result<()>;

    /// 数据库连通性检查；无连接的后端返回 `Connection` 错误
    async fn health_check(&self) -> Result<()>;

    fn backend_name(&self) -> &str;
}

pub struct StorageFactory;

impl StorageFactory {
    /// DSN 优先于文件路径；两者都未配置时使用内存存储
    pub fn select_backend(config: &StorageConfig) -> Result<BackendKind> {
        if let Some(dsn) = config.database_dsn.as_deref().filter(|s| !s.is_empty()) {
            return backend::infer_backend_from_url(dsn);
        }
        if config
            .file_storage_path
            .as_deref()
            .is_some_and(|p| !p.is_empty())
        {
            return Ok(BackendKind::File);
        }
        Ok(BackendKind::Memory)
    }

    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn LinkStore>> {
        let kind = Self::select_backend(config)?;
        info!("Using {} storage backend", kind);

        let store: Arc<dyn LinkStore> = match kind {
            BackendKind::Memory => Arc::new(MemoryStorage::new()),
            BackendKind::File => {
                let path = config.file_storage_path.as_deref().unwrap_or_default();
                Arc::new(FileStorage::open(path)?)
            }
            BackendKind::Sqlite | BackendKind::Postgres => {
                let dsn = config.database_dsn.as_deref().unwrap_or_default();
                Arc::new(SeaOrmStorage::new(dsn, kind, config).await?)
            }
        };
        Ok(store)
    }
}
