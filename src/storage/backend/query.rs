//! SeaOrmStorage 的读操作

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::error;

use super::converters::model_to_shortlink;
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ShortenerError};
use crate::storage::{OwnedLink, ShortLink};

use migration::entities::short_link;

impl SeaOrmStorage {
    pub(super) async fn load_url(&self, short_id: &str) -> Result<String> {
        let db = &self.db;
        let model = retry::with_retry(&format!("load({})", short_id), self.retry_config, || async {
            short_link::Entity::find()
                .filter(short_link::Column::ShortId.eq(short_id))
                .one(db)
                .await
        })
        .await
        .map_err(|e| {
            error!("load({}) failed after retries: {}", short_id, e);
            ShortenerError::database_operation(format!("Failed to load '{}': {}", short_id, e))
        })?;

        match model {
            None => Err(ShortenerError::not_found(format!(
                "Short id '{}' not found",
                short_id
            ))),
            Some(m) if m.is_deleted => Err(ShortenerError::deleted(format!(
                "Short id '{}' has been deleted",
                short_id
            ))),
            Some(m) => Ok(m.original_url),
        }
    }

    pub(super) async fn find_active_by_url(&self, url: &str) -> Result<String> {
        let db = &self.db;
        let model = retry::with_retry("find_by_url", self.retry_config, || async {
            short_link::Entity::find()
                .filter(short_link::Column::OriginalUrl.eq(url))
                .filter(short_link::Column::IsDeleted.eq(false))
                .one(db)
                .await
        })
        .await
        .map_err(|e| {
            ShortenerError::database_operation(format!("Failed to look up URL '{}': {}", url, e))
        })?;

        model
            .map(|m| m.short_id)
            .ok_or_else(|| ShortenerError::not_found(format!("No active short id for '{}'", url)))
    }

    /// 按 URL 查找记录，包含已删除的
    pub(super) async fn find_any_by_url(&self, url: &str) -> Result<Option<ShortLink>> {
        let db = &self.db;
        let model = retry::with_retry("find_any_by_url", self.retry_config, || async {
            short_link::Entity::find()
                .filter(short_link::Column::OriginalUrl.eq(url))
                .one(db)
                .await
        })
        .await
        .map_err(|e| {
            ShortenerError::database_operation(format!("Failed to look up URL '{}': {}", url, e))
        })?;

        Ok(model.map(model_to_shortlink))
    }

    /// 按插入顺序（自增 id）返回 owner 的未删除链接
    pub(super) async fn list_active_by_owner(&self, owner_id: &str) -> Result<Vec<OwnedLink>> {
        if owner_id.is_empty() {
            return Ok(Vec::new());
        }

        let db = &self.db;
        let models = retry::with_retry(
            &format!("list_by_owner({})", owner_id),
            self.retry_config,
            || async {
                short_link::Entity::find()
                    .filter(short_link::Column::UserId.eq(owner_id))
                    .filter(short_link::Column::IsDeleted.eq(false))
                    .order_by_asc(short_link::Column::Id)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            ShortenerError::database_operation(format!(
                "Failed to list links of '{}': {}",
                owner_id, e
            ))
        })?;

        Ok(models
            .into_iter()
            .map(|m| OwnedLink {
                short_id: m.short_id,
                original_url: m.original_url,
            })
            .collect())
    }
}
