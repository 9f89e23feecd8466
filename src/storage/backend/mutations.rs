//! SeaOrmStorage 的写操作
//!
//! 单行写入不做事务内的先查后插：SQLite 的延迟事务从读锁升级到写锁时会直接
//! 返回 BUSY_SNAPSHOT，busy_timeout 不起作用。写入直接交给唯一索引裁决，
//! 冲突后再读一次已有记录来区分 URL 冲突和 short_id 冲突。

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, TransactionTrait};
use tracing::{debug, info};

use super::converters::{new_active_model, skip_on_conflict};
use super::{SeaOrmStorage, is_unique_violation, retry};
use crate::errors::{Result, ShortenerError};

use migration::entities::short_link;

impl SeaOrmStorage {
    /// 插入一条记录；唯一约束冲突作为值返回，不进入重试判断
    pub(super) async fn insert_owned(&self, owner_id: &str, short_id: &str, url: &str) -> Result<()> {
        let db = &self.db;
        let operation = format!("save({})", short_id);

        let inserted = retry::with_retry(&operation, self.retry_config, || async {
            match short_link::Entity::insert(new_active_model(owner_id, short_id, url))
                .exec(db)
                .await
            {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(|e| ShortenerError::database_operation(format!("{}: {}", operation, e)))?;

        if inserted {
            debug!("Saved {} -> {}", short_id, url);
            return Ok(());
        }
        self.resolve_conflict(short_id, url).await
    }

    /// 冲突判定：完全相同的记录视为成功，URL 冲突优先于 short_id 冲突
    async fn resolve_conflict(&self, short_id: &str, url: &str) -> Result<()> {
        match self.find_any_by_url(url).await? {
            Some(existing) if existing.short_id == short_id => {
                debug!("save({}): identical record already present", short_id);
                Ok(())
            }
            Some(existing) => Err(ShortenerError::url_conflict(format!(
                "URL '{}' is already mapped to '{}'",
                url, existing.short_id
            ))),
            None => Err(ShortenerError::short_id_conflict(format!(
                "Short id '{}' is already taken",
                short_id
            ))),
        }
    }

    /// 单事务批量插入，冲突行被跳过
    pub(super) async fn insert_batch(&self, owner_id: &str, batch: &HashMap<String, String>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let models: Vec<short_link::ActiveModel> = batch
            .iter()
            .map(|(short_id, url)| new_active_model(owner_id, short_id, url))
            .collect();

        let db = &self.db;
        retry::with_retry(
            &format!("save_batch({})", owner_id),
            self.retry_config,
            || async {
                let txn = db.begin().await?;
                match short_link::Entity::insert_many(models.clone())
                    .on_conflict(skip_on_conflict())
                    .exec(&txn)
                    .await
                {
                    Ok(_) | Err(DbErr::RecordNotInserted) => {}
                    Err(e) => return Err(e),
                }
                txn.commit().await
            },
        )
        .await
        .map_err(|e| ShortenerError::database_operation(format!("Batch insert failed: {}", e)))?;

        info!("Batch saved {} links for owner '{}'", batch.len(), owner_id);
        Ok(())
    }

    /// 单条 UPDATE（幂等，可重试），只影响属于 `owner_id` 的记录
    pub(super) async fn soft_delete(&self, owner_id: &str, short_ids: &[String]) -> Result<()> {
        if owner_id.is_empty() || short_ids.is_empty() {
            return Ok(());
        }

        let db = &self.db;
        let result = retry::with_retry(
            &format!("mark_deleted({})", owner_id),
            self.retry_config,
            || async {
                short_link::Entity::update_many()
                    .col_expr(short_link::Column::IsDeleted, Expr::value(true))
                    .filter(short_link::Column::UserId.eq(owner_id))
                    .filter(short_link::Column::ShortId.is_in(short_ids.iter().cloned()))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| ShortenerError::database_operation(format!("Soft delete failed: {}", e)))?;

        info!(
            "Marked {} of {} links deleted for owner '{}'",
            result.rows_affected,
            short_ids.len(),
            owner_id
        );
        Ok(())
    }
}
