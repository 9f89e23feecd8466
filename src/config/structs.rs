use serde::{Deserialize, Serialize};

use crate::deletion::DeleterSettings;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - storage: 存储后端选择与数据库连接
/// - shortener: 短码生成与展示
/// - deleter: 批量软删除聚合器
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StaticConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub shortener: ShortenerConfig,
    #[serde(default)]
    pub deleter: DeleterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：legacy ENV > ENV > config.toml > 默认值
    /// ENV 前缀：SHORTENER，分隔符：__
    /// 示例：SHORTENER__STORAGE__DATABASE_DSN=postgres://...
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("SHORTENER")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        };

        config.apply_legacy_env(|key| std::env::var(key).ok());
        config
    }

    /// 兼容旧版服务的环境变量（FILE_STORAGE_PATH / DATABASE_DSN / BASE_URL）
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("FILE_STORAGE_PATH").filter(|v| !v.is_empty()) {
            self.storage.file_storage_path = Some(path);
        }
        if let Some(dsn) = lookup("DATABASE_DSN").filter(|v| !v.is_empty()) {
            self.storage.database_dsn = Some(dsn);
        }
        if let Some(base) = lookup("BASE_URL").filter(|v| !v.is_empty()) {
            self.shortener.base_url = base;
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 存储配置
///
/// 选择规则：`database_dsn` 存在 → 关系型；`file_storage_path` 存在 → 文件；否则内存。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub database_dsn: Option<String>,
    #[serde(default)]
    pub file_storage_path: Option<String>,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 短码生成配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortenerConfig {
    /// short_id 冲突时的最大生成次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 用于拼接完整短链接
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// 删除聚合器配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleterConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

impl DeleterConfig {
    pub fn to_settings(&self) -> DeleterSettings {
        DeleterSettings {
            queue_capacity: self.queue_capacity.max(1),
            flush_threshold: self.flush_threshold.max(1),
            flush_interval: std::time::Duration::from_millis(self.flush_interval_ms.max(1)),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_queue_capacity() -> usize {
    100
}

fn default_flush_threshold() -> usize {
    100
}

fn default_flush_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_dsn: None,
            file_storage_path: None,
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_url: default_base_url(),
        }
    }
}

impl Default for DeleterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            flush_threshold: default_flush_threshold(),
            flush_interval_ms: default_flush_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
