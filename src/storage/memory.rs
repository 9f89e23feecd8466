use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::table::LinkTable;
use super::{LinkStore, OwnedLink};
use crate::errors::{Result, ShortenerError};

/// 进程内存储，进程退出即丢失
#[derive(Default)]
pub struct MemoryStorage {
    table: RwLock<LinkTable>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkStore for MemoryStorage {
    async fn save_owned(&self, owner_id: &str, short_id: &str, url: &str) -> Result<()> {
        let inserted = self.table.write().insert_owned(owner_id, short_id, url)?;
        if inserted {
            debug!("MemoryStorage: saved {} -> {}", short_id, url);
        }
        Ok(())
    }

    async fn save_batch_owned(&self, owner_id: &str, batch: &HashMap<String, String>) -> Result<()> {
        let inserted = self.table.write().insert_batch(owner_id, batch);
        debug!(
            "MemoryStorage: batch saved {}/{} links for owner '{}'",
            inserted,
            batch.len(),
            owner_id
        );
        Ok(())
    }

    async fn load(&self, short_id: &str) -> Result<String> {
        self.table.read().load(short_id)
    }

    async fn find_by_url(&self, url: &str) -> Result<String> {
        self.table.read().find_by_url(url)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<OwnedLink>> {
        Ok(self.table.read().list_by_owner(owner_id))
    }

    async fn mark_deleted(&self, owner_id: &str, short_ids: &[String]) -> Result<()> {
        let changed = self.table.write().mark_deleted(owner_id, short_ids);
        debug!(
            "MemoryStorage: marked {} of {} links deleted for owner '{}'",
            changed,
            short_ids.len(),
            owner_id
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Err(ShortenerError::connection("there is no connection: memory"))
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
