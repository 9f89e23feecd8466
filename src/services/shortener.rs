//! 短链接生成服务
//!
//! 基于 [`LinkStore`] 把 URL 转成 short id。short id 冲突时换新 id 重试，
//! 最多 `max_attempts` 次；已缩短过的 URL 返回原有 id 并标记为冲突。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::generator::IdGenerator;
use crate::config::ShortenerConfig;
use crate::errors::{Result, ShortenerError};
use crate::storage::{LinkStore, OwnedLink};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// `shorten` 的结果；`conflict` 为 true 表示 URL 之前已被缩短
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenOutcome {
    pub short_id: String,
    pub conflict: bool,
}

pub struct LinkShortener {
    store: Arc<dyn LinkStore>,
    generator: IdGenerator,
    max_attempts: u32,
}

impl LinkShortener {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self::with_generator(store, IdGenerator::new(), DEFAULT_MAX_ATTEMPTS)
    }

    pub fn from_config(store: Arc<dyn LinkStore>, config: &ShortenerConfig) -> Self {
        Self::with_generator(store, IdGenerator::new(), config.max_attempts)
    }

    pub fn with_generator(store: Arc<dyn LinkStore>, generator: IdGenerator, max_attempts: u32) -> Self {
        Self {
            store,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.store
    }

    pub async fn shorten(&self, url: &str, owner_id: &str) -> Result<ShortenOutcome> {
        for attempt in 1..=self.max_attempts {
            let short_id = self.generator.generate();
            let saved = if owner_id.is_empty() {
                self.store.save(&short_id, url).await
            } else {
                self.store.save_owned(owner_id, &short_id, url).await
            };

            match saved {
                Ok(()) => {
                    info!("Shortened {} -> {}", url, short_id);
                    return Ok(ShortenOutcome {
                        short_id,
                        conflict: false,
                    });
                }
                Err(ShortenerError::ShortIdConflict(_)) => {
                    debug!(
                        "Short id {} collided (attempt {}/{})",
                        short_id, attempt, self.max_attempts
                    );
                }
                Err(ShortenerError::UrlConflict(_)) => {
                    let existing = self.store.find_by_url(url).await?;
                    debug!("{} already shortened as {}", url, existing);
                    return Ok(ShortenOutcome {
                        short_id: existing,
                        conflict: true,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            "Gave up shortening {} after {} colliding ids",
            url, self.max_attempts
        );
        Err(ShortenerError::id_exhausted(format!(
            "No free short id after {} attempts",
            self.max_attempts
        )))
    }

    /// 每个 URL 分配一个新 id（批内互不相同），一次 `save_batch_owned` 写入
    pub async fn shorten_batch(
        &self,
        owner_id: &str,
        urls: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>> {
        let mut used = HashSet::with_capacity(urls.len());
        let mut batch = HashMap::with_capacity(urls.len());
        let mut result = HashMap::with_capacity(urls.len());

        for (correlation_id, url) in urls {
            let short_id = loop {
                let candidate = self.generator.generate();
                if used.insert(candidate.clone()) {
                    break candidate;
                }
            };
            batch.insert(short_id.clone(), url.clone());
            result.insert(correlation_id.clone(), short_id);
        }

        self.store.save_batch_owned(owner_id, &batch).await?;
        info!("Shortened batch of {} URLs for owner '{}'", urls.len(), owner_id);
        Ok(result)
    }

    pub async fn retrieve(&self, short_id: &str) -> Result<String> {
        self.store.load(short_id).await
    }

    pub async fn list_owned(&self, owner_id: &str) -> Result<Vec<OwnedLink>> {
        self.store.list_by_owner(owner_id).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::storage::MemoryStorage;

    /// 前 `collisions` 次保存返回 short id 冲突，之后委托给内存存储
    struct CollidingStore {
        inner: MemoryStorage,
        collisions: Mutex<u32>,
        attempts: Mutex<u32>,
    }

    impl CollidingStore {
        fn new(collisions: u32) -> Self {
            Self {
                inner: MemoryStorage::new(),
                collisions: Mutex::new(collisions),
                attempts: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl LinkStore for CollidingStore {
        async fn save_owned(&self, owner_id: &str, short_id: &str, url: &str) -> Result<()> {
            *self.attempts.lock() += 1;
            {
                let mut left = self.collisions.lock();
                if *left > 0 {
                    *left -= 1;
                    return Err(ShortenerError::short_id_conflict(short_id));
                }
            }
            self.inner.save_owned(owner_id, short_id, url).await
        }

        async fn save_batch_owned(&self, owner_id: &str, batch: &HashMap<String, String>) -> Result<()> {
            self.inner.save_batch_owned(owner_id, batch).await
        }

        async fn load(&self, short_id: &str) -> Result<String> {
            self.inner.load(short_id).await
        }

        async fn find_by_url(&self, url: &str) -> Result<String> {
            self.inner.find_by_url(url).await
        }

        async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<OwnedLink>> {
            self.inner.list_by_owner(owner_id).await
        }

        async fn mark_deleted(&self, owner_id: &str, short_ids: &[String]) -> Result<()> {
            self.inner.mark_deleted(owner_id, short_ids).await
        }

        async fn health_check(&self) -> Result<()> {
            self.inner.health_check().await
        }

        fn backend_name(&self) -> &str {
            "colliding"
        }
    }

    #[tokio::test]
    async fn test_retries_on_short_id_collision() {
        let store = Arc::new(CollidingStore::new(3));
        let shortener = LinkShortener::with_generator(store.clone(), IdGenerator::with_seed(1), 5);

        let outcome = shortener.shorten("https://example.com/a", "u1").await.unwrap();
        assert!(!outcome.conflict);
        assert_eq!(*store.attempts.lock(), 4);
        assert_eq!(
            shortener.retrieve(&outcome.short_id).await.unwrap(),
            "https://example.com/a"
        );
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let store = Arc::new(CollidingStore::new(u32::MAX));
        let shortener = LinkShortener::with_generator(store.clone(), IdGenerator::with_seed(1), 5);

        let err = shortener.shorten("https://example.com/a", "u1").await.unwrap_err();
        assert!(matches!(err, ShortenerError::IdExhausted(_)));
        assert_eq!(*store.attempts.lock(), 5);
    }

    #[tokio::test]
    async fn test_ownerless_shorten_is_not_listed() {
        let store: Arc<dyn LinkStore> = Arc::new(MemoryStorage::new());
        let shortener = LinkShortener::new(store);

        let outcome = shortener.shorten("https://example.com/b", "").await.unwrap();
        assert_eq!(
            shortener.retrieve(&outcome.short_id).await.unwrap(),
            "https://example.com/b"
        );
        assert!(shortener.list_owned("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ping_reports_missing_connection_for_memory() {
        let shortener = LinkShortener::new(Arc::new(MemoryStorage::new()));
        let err = shortener.ping().await.unwrap_err();
        assert!(matches!(err, ShortenerError::Connection(_)));
    }
}
