use std::fmt;

#[derive(Debug, Clone)]
pub enum ShortenerError {
    NotFound(String),
    Deleted(String),
    UrlConflict(String),
    ShortIdConflict(String),
    Connection(String),
    IdExhausted(String),
    AggregatorClosed(String),
    DatabaseConfig(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    Validation(String),
}

impl ShortenerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortenerError::NotFound(_) => "E001",
            ShortenerError::Deleted(_) => "E002",
            ShortenerError::UrlConflict(_) => "E003",
            ShortenerError::ShortIdConflict(_) => "E004",
            ShortenerError::Connection(_) => "E005",
            ShortenerError::IdExhausted(_) => "E006",
            ShortenerError::AggregatorClosed(_) => "E007",
            ShortenerError::DatabaseConfig(_) => "E008",
            ShortenerError::DatabaseOperation(_) => "E009",
            ShortenerError::FileOperation(_) => "E010",
            ShortenerError::Serialization(_) => "E011",
            ShortenerError::Validation(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortenerError::NotFound(_) => "Short Link Not Found",
            ShortenerError::Deleted(_) => "Short Link Deleted",
            ShortenerError::UrlConflict(_) => "URL Conflict",
            ShortenerError::ShortIdConflict(_) => "Short ID Conflict",
            ShortenerError::Connection(_) => "Connection Error",
            ShortenerError::IdExhausted(_) => "Short ID Generation Exhausted",
            ShortenerError::AggregatorClosed(_) => "Delete Aggregator Closed",
            ShortenerError::DatabaseConfig(_) => "Database Configuration Error",
            ShortenerError::DatabaseOperation(_) => "Database Operation Error",
            ShortenerError::FileOperation(_) => "File Operation Error",
            ShortenerError::Serialization(_) => "Serialization Error",
            ShortenerError::Validation(_) => "Validation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShortenerError::NotFound(msg)
            | ShortenerError::Deleted(msg)
            | ShortenerError::UrlConflict(msg)
            | ShortenerError::ShortIdConflict(msg)
            | ShortenerError::Connection(msg)
            | ShortenerError::IdExhausted(msg)
            | ShortenerError::AggregatorClosed(msg)
            | ShortenerError::DatabaseConfig(msg)
            | ShortenerError::DatabaseOperation(msg)
            | ShortenerError::FileOperation(msg)
            | ShortenerError::Serialization(msg)
            | ShortenerError::Validation(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShortenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortenerError {}

// 便捷的构造函数
impl ShortenerError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortenerError::NotFound(msg.into())
    }

    pub fn deleted<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Deleted(msg.into())
    }

    pub fn url_conflict<T: Into<String>>(msg: T) -> Self {
        ShortenerError::UrlConflict(msg.into())
    }

    pub fn short_id_conflict<T: Into<String>>(msg: T) -> Self {
        ShortenerError::ShortIdConflict(msg.into())
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Connection(msg.into())
    }

    pub fn id_exhausted<T: Into<String>>(msg: T) -> Self {
        ShortenerError::IdExhausted(msg.into())
    }

    pub fn aggregator_closed<T: Into<String>>(msg: T) -> Self {
        ShortenerError::AggregatorClosed(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseConfig(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ShortenerError::NotFound(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, ShortenerError::Deleted(_))
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ShortenerError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShortenerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ShortenerError {
    fn from(err: std::io::Error) -> Self {
        ShortenerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShortenerError {
    fn from(err: serde_json::Error) -> Self {
        ShortenerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortenerError>;
