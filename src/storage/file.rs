//! 文件存储后端
//!
//! 整张表常驻内存，每次修改全量重写文件，每行一个 JSON 对象：
//! `{short_url, original_url, user_id, is_deleted}`。

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::table::LinkTable;
use super::{LinkStore, OwnedLink, ShortLink};
use crate::errors::{Result, ShortenerError};

/// 文件中的单行记录
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FileRecord {
    pub short_url: String,
    pub original_url: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub is_deleted: bool,
}

impl From<FileRecord> for ShortLink {
    fn from(record: FileRecord) -> Self {
        ShortLink {
            short_id: record.short_url,
            original_url: record.original_url,
            owner_id: record.user_id,
            deleted: record.is_deleted,
        }
    }
}

impl From<&ShortLink> for FileRecord {
    fn from(link: &ShortLink) -> Self {
        FileRecord {
            short_url: link.short_id.clone(),
            original_url: link.original_url.clone(),
            user_id: link.owner_id.clone(),
            is_deleted: link.deleted,
        }
    }
}

pub struct FileStorage {
    file_path: PathBuf,
    table: RwLock<LinkTable>,
    /// 串行化写入者；落盘期间读操作不受阻塞
    write_gate: Mutex<()>,
}

impl FileStorage {
    /// 打开存储文件；文件不存在时从空表开始，首次写入时创建
    pub fn open(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        let table = Self::load_from_file(&file_path)?;
        info!(
            "FileStorage loaded {} short links from {}",
            table.len(),
            file_path.display()
        );

        Ok(FileStorage {
            file_path,
            table: RwLock::new(table),
            write_gate: Mutex::new(()),
        })
    }

    fn load_from_file(path: &Path) -> Result<LinkTable> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Link file {} not found, starting empty", path.display());
                return Ok(LinkTable::default());
            }
            Err(e) => {
                return Err(ShortenerError::file_operation(format!(
                    "Failed to read link file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut links = Vec::new();
        for record in serde_json::Deserializer::from_str(&content).into_iter::<FileRecord>() {
            match record {
                Ok(record) => links.push(ShortLink::from(record)),
                Err(e) => {
                    error!("Failed to parse link file {}: {}", path.display(), e);
                    return Err(ShortenerError::serialization(format!(
                        "Failed to parse link file {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Ok(LinkTable::from_records(links))
    }

    /// 全量重写：先写临时文件再 rename，避免写到一半的文件
    async fn save_to_file(&self, table: &LinkTable) -> Result<()> {
        let mut buf = Vec::with_capacity(table.len() * 96);
        for link in table.records() {
            serde_json::to_writer(&mut buf, &FileRecord::from(link))?;
            buf.push(b'\n');
        }

        let path = self.file_path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let tmp_path = path.with_extension("tmp");
            {
                let mut file = fs::File::create(&tmp_path)?;
                file.write_all(&buf)?;
                file.sync_all()?;
            }
            fs::rename(&tmp_path, &path)?;
            Ok(())
        })
        .await
        .map_err(|e| ShortenerError::file_operation(format!("Link file writer failed: {}", e)))?
    }

    /// 对表的副本执行修改，落盘成功后才替换内存状态
    async fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut LinkTable) -> Result<(T, bool)>,
    {
        let _gate = self.write_gate.lock().await;
        let mut next = self.table.read().clone();
        let (value, dirty) = op(&mut next)?;
        if dirty {
            self.save_to_file(&next).await.inspect_err(|e| {
                error!(
                    "Failed to persist link file {}: {}",
                    self.file_path.display(),
                    e
                );
            })?;
            *self.table.write() = next;
        }
        Ok(value)
    }
}

#[async_trait]
impl LinkStore for FileStorage {
    async fn save_owned(&self, owner_id: &str, short_id: &str, url: &str) -> Result<()> {
        self.mutate(|table| {
            let inserted = table.insert_owned(owner_id, short_id, url)?;
            Ok(((), inserted))
        })
        .await
    }

    async fn save_batch_owned(&self, owner_id: &str, batch: &HashMap<String, String>) -> Result<()> {
        let inserted = self.mutate(|table| {
            let inserted = table.insert_batch(owner_id, batch);
            Ok((inserted, inserted > 0))
        })
        .await?;
        debug!(
            "FileStorage: batch saved {}/{} links for owner '{}'",
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
        let changed = self.mutate(|table| {
            let changed = table.mark_deleted(owner_id, short_ids);
            Ok((changed, changed > 0))
        })
        .await?;
        debug!(
            "FileStorage: marked {} of {} links deleted for owner '{}'",
            changed,
            short_ids.len(),
            owner_id
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Err(ShortenerError::connection("there is no connection: file"))
    }

    fn backend_name(&self) -> &str {
        "file"
    }
}
