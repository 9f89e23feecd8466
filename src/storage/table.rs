//! 内存与文件后端共用的链接表
//!
//! 除记录本身外维护两个索引：`original_url → short_id` 用于冲突检测，
//! `owner_id → [short_id]`（只追加）用于列表。加锁由调用方负责。

use std::collections::HashMap;

use crate::errors::{Result, ShortenerError};
use crate::storage::{OwnedLink, ShortLink};

#[derive(Debug, Clone, Default)]
pub(crate) struct LinkTable {
    records: HashMap<String, ShortLink>,
    /// 包含已删除记录：original_url 的唯一性覆盖全部记录
    by_url: HashMap<String, String>,
    /// 插入顺序，用于稳定地重写文件
    order: Vec<String>,
    owners: HashMap<String, Vec<String>>,
}

impl LinkTable {
    /// 从持久化记录重建（文件加载）。重复的 short_id 以后出现者为准
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ShortLink>,
    {
        let mut table = Self::default();
        for link in records {
            if let Some(previous) = table.records.get(&link.short_id) {
                table.by_url.remove(&previous.original_url);
            } else {
                table.order.push(link.short_id.clone());
                if !link.owner_id.is_empty() {
                    table
                        .owners
                        .entry(link.owner_id.clone())
                        .or_default()
                        .push(link.short_id.clone());
                }
            }
            table
                .by_url
                .insert(link.original_url.clone(), link.short_id.clone());
            table.records.insert(link.short_id.clone(), link);
        }
        table
    }

    /// 冲突检查 + 插入；完全相同的 `(short_id, url)` 已存在时返回 `Ok(false)`
    pub fn insert_owned(&mut self, owner_id: &str, short_id: &str, url: &str) -> Result<bool> {
        if let Some(existing_id) = self.by_url.get(url)
            && existing_id != short_id
        {
            return Err(ShortenerError::url_conflict(format!(
                "URL '{}' is already mapped to '{}'",
                url, existing_id
            )));
        }

        if let Some(existing) = self.records.get(short_id) {
            if existing.original_url != url {
                return Err(ShortenerError::short_id_conflict(format!(
                    "Short id '{}' is already taken",
                    short_id
                )));
            }
            return Ok(false);
        }

        self.push(ShortLink::new(owner_id, short_id, url));
        Ok(true)
    }

    /// 批量插入，跳过与已有 short_id 或 original_url 冲突的条目，返回实际插入数
    pub fn insert_batch(&mut self, owner_id: &str, batch: &HashMap<String, String>) -> usize {
        let mut inserted = 0;
        for (short_id, url) in batch {
            if self.records.contains_key(short_id) || self.by_url.contains_key(url) {
                continue;
            }
            self.push(ShortLink::new(owner_id, short_id, url));
            inserted += 1;
        }
        inserted
    }

    fn push(&mut self, link: ShortLink) {
        self.order.push(link.short_id.clone());
        if !link.owner_id.is_empty() {
            self.owners
                .entry(link.owner_id.clone())
                .or_default()
                .push(link.short_id.clone());
        }
        self.by_url
            .insert(link.original_url.clone(), link.short_id.clone());
        self.records.insert(link.short_id.clone(), link);
    }

    pub fn load(&self, short_id: &str) -> Result<String> {
        match self.records.get(short_id) {
            None => Err(ShortenerError::not_found(format!(
                "Short id '{}' not found",
                short_id
            ))),
            Some(link) if link.deleted => Err(ShortenerError::deleted(format!(
                "Short id '{}' has been deleted",
                short_id
            ))),
            Some(link) => Ok(link.original_url.clone()),
        }
    }

    pub fn find_by_url(&self, url: &str) -> Result<String> {
        self.by_url
            .get(url)
            .and_then(|id| self.records.get(id))
            .filter(|link| !link.deleted)
            .map(|link| link.short_id.clone())
            .ok_or_else(|| ShortenerError::not_found(format!("No active short id for '{}'", url)))
    }

    pub fn list_by_owner(&self, owner_id: &str) -> Vec<OwnedLink> {
        let Some(ids) = self.owners.get(owner_id) else {
            return Vec::new();
        };

        ids.iter()
            .filter_map(|id| self.records.get(id))
            .filter(|link| !link.deleted)
            .map(|link| OwnedLink {
                short_id: link.short_id.clone(),
                original_url: link.original_url.clone(),
            })
            .collect()
    }

    /// 软删除属于 `owner_id` 的记录，返回状态发生变化的数量
    pub fn mark_deleted(&mut self, owner_id: &str, short_ids: &[String]) -> usize {
        if owner_id.is_empty() {
            return 0;
        }

        let mut changed = 0;
        for id in short_ids {
            if let Some(link) = self.records.get_mut(id)
                && link.owner_id == owner_id
                && !link.deleted
            {
                link.deleted = true;
                changed += 1;
            }
        }
        changed
    }

    /// 按插入顺序遍历全部记录
    pub fn records(&self) -> impl Iterator<Item = &ShortLink> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_load() {
        let mut table = LinkTable::default();
        assert!(table.insert_owned("u1", "abc", "https://a.example").unwrap());
        assert_eq!(table.load("abc").unwrap(), "https://a.example");
    }

    #[test]
    fn test_exact_pair_is_noop_and_not_reindexed() {
        let mut table = LinkTable::default();
        table.insert_owned("u1", "abc", "https://a.example").unwrap();
        assert!(!table.insert_owned("u1", "abc", "https://a.example").unwrap());
        assert_eq!(table.list_by_owner("u1").len(), 1);
    }

    #[test]
    fn test_url_conflict_checked_before_short_id() {
        let mut table = LinkTable::default();
        table.insert_owned("u1", "abc", "https://a.example").unwrap();
        table.insert_owned("u1", "def", "https://b.example").unwrap();

        // 两种冲突同时存在时报告 URL 冲突
        let err = table
            .insert_owned("u1", "def", "https://a.example")
            .unwrap_err();
        assert!(matches!(err, ShortenerError::UrlConflict(_)));
    }

    #[test]
    fn test_ownerless_links_are_not_listed_or_deletable() {
        let mut table = LinkTable::default();
        table.insert_owned("", "abc", "https://a.example").unwrap();
        assert!(table.list_by_owner("").is_empty());
        assert_eq!(table.mark_deleted("", &["abc".to_string()]), 0);
        assert!(table.load("abc").is_ok());
    }

    #[test]
    fn test_from_records_rebuilds_indexes() {
        let mut deleted = ShortLink::new("u1", "b", "https://b.example");
        deleted.deleted = true;
        let table = LinkTable::from_records(vec![
            ShortLink::new("u1", "a", "https://a.example"),
            deleted,
            ShortLink::new("", "c", "https://c.example"),
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.find_by_url("https://a.example").unwrap(), "a");
        assert!(table.find_by_url("https://b.example").unwrap_err().is_not_found());
        assert!(table.load("b").unwrap_err().is_deleted());
        let listed: Vec<_> = table.list_by_owner("u1").into_iter().map(|l| l.short_id).collect();
        assert_eq!(listed, vec!["a"]);
        let order: Vec<_> = table.records().map(|l| l.short_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
