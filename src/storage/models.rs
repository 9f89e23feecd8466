use serde::{Deserialize, Serialize};
use strum::AsRefStr;

/// 短链接记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub short_id: String,
    pub original_url: String,
    /// 匿名创建时为空字符串
    pub owner_id: String,
    pub deleted: bool,
}

impl ShortLink {
    pub fn new(owner_id: &str, short_id: &str, original_url: &str) -> Self {
        Self {
            short_id: short_id.to_string(),
            original_url: original_url.to_string(),
            owner_id: owner_id.to_string(),
            deleted: false,
        }
    }
}

/// `list_by_owner` 的返回项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedLink {
    pub short_id: String,
    pub original_url: String,
}

/// 存储后端类型（启动时选定，运行期不切换）
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    Memory,
    File,
    Sqlite,
    Postgres,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}
