use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::storage::LinkStore;

/// 批量删除的落地目标
#[async_trait]
pub trait DeleteSink: Send + Sync {
    async fn delete_batch(&self, owner_id: &str, short_ids: &[String]) -> Result<()>;
}

/// 将删除批次转交给存储后端的 `mark_deleted`
pub struct StoreSink {
    store: Arc<dyn LinkStore>,
}

impl StoreSink {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DeleteSink for StoreSink {
    async fn delete_batch(&self, owner_id: &str, short_ids: &[String]) -> Result<()> {
        self.store.mark_deleted(owner_id, short_ids).await
    }
}
