//! 数据库操作重试模块
//!
//! 连接断开、锁冲突和序列化失败按指数退避重试，其余错误直接返回。

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::StorageConfig;

/// PostgreSQL 40001/40P01
const RETRYABLE_SQLSTATES: &[&str] = &["40001", "40P01"];

/// SQLite 主错误码 BUSY(5)/LOCKED(6)，扩展码的低 8 位即主错误码
const RETRYABLE_SQLITE_PRIMARY: &[i64] = &[5, 6];

const RETRYABLE_MESSAGES: &[&str] = &[
    "deadlock",
    "database is locked",
    "serialization failure",
    "could not serialize access",
];

/// 判断数据库错误是否值得重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => is_retryable_runtime(runtime),
        _ => false,
    }
}

fn is_retryable_runtime(err: &RuntimeErr) -> bool {
    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            let code = sqlx_err.as_database_error().and_then(|e| e.code());
            code.is_some_and(|c| code_is_retryable(&c))
                || message_is_retryable(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => message_is_retryable(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

/// SQLSTATE 精确匹配；纯数字且不超过 4 位的按 SQLite 错误码处理
fn code_is_retryable(code: &str) -> bool {
    if RETRYABLE_SQLSTATES.contains(&code) {
        return true;
    }
    if code.len() > 4 {
        return false;
    }
    code.parse::<i64>()
        .is_ok_and(|n| RETRYABLE_SQLITE_PRIMARY.contains(&(n & 0xff)))
}

fn message_is_retryable(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    RETRYABLE_MESSAGES.iter().any(|needle| lower.contains(needle))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn from_storage_config(config: &StorageConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from_storage_config(&StorageConfig::default())
    }
}

/// 执行 `operation`，对可重试错误按指数退避重试，最多 `max_retries` 次
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && is_retryable_error(&e) => {
                attempt += 1;
                let delay = backoff_delay(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// base * 2^(attempt-1)，封顶 max，再加 0-25% 抖动
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp.min(max_ms);
    capped.saturating_add(rand::random_range(0..=capped / 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 5,
            max_delay_ms: 20,
        }
    }

    fn pool_timeout() -> DbErr {
        DbErr::ConnectionAcquire(sea_orm::error::ConnAcquireErr::Timeout)
    }

    #[test]
    fn test_connection_errors_are_retryable() {
        assert!(is_retryable_error(&pool_timeout()));
        assert!(is_retryable_error(&DbErr::Conn(RuntimeErr::Internal(
            "connection reset".into()
        ))));
    }

    #[test]
    fn test_lock_messages_are_retryable() {
        let locked = DbErr::Query(RuntimeErr::Internal("database is locked".into()));
        assert!(is_retryable_error(&locked));
        let deadlock = DbErr::Exec(RuntimeErr::Internal("Deadlock detected".into()));
        assert!(is_retryable_error(&deadlock));
    }

    #[test]
    fn test_sqlite_extended_busy_codes_are_retryable() {
        assert!(code_is_retryable("5"));
        assert!(code_is_retryable("6"));
        // BUSY_SNAPSHOT / BUSY_RECOVERY / LOCKED_SHAREDCACHE
        assert!(code_is_retryable("517"));
        assert!(code_is_retryable("261"));
        assert!(code_is_retryable("262"));
        assert!(code_is_retryable("40P01"));
        assert!(code_is_retryable("40001"));
    }

    #[test]
    fn test_constraint_codes_are_not_retryable() {
        // SQLITE_CONSTRAINT_UNIQUE / PostgreSQL unique_violation
        assert!(!code_is_retryable("2067"));
        assert!(!code_is_retryable("1555"));
        assert!(!code_is_retryable("23505"));
        assert!(!code_is_retryable("08006"));
    }

    #[test]
    fn test_logical_errors_are_not_retryable() {
        assert!(!is_retryable_error(&DbErr::RecordNotFound("abc".into())));
        let unique = DbErr::Exec(RuntimeErr::Internal(
            "UNIQUE constraint failed: short_links.short_id".into(),
        ));
        assert!(!is_retryable_error(&unique));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        assert!((100..=125).contains(&backoff_delay(1, 100, 2000)));
        assert!((400..=500).contains(&backoff_delay(3, 100, 2000)));
        assert!((2000..=2500).contains(&backoff_delay(12, 100, 2000)));
    }

    #[test]
    fn test_default_follows_storage_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 100);
        assert_eq!(config.max_delay_ms, 2000);
    }

    #[tokio::test]
    async fn test_with_retry_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry("load(abc)", fast_config(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(pool_timeout())
                } else {
                    Ok("https://example.com")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "https://example.com");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result = with_retry("load(abc)", fast_config(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(pool_timeout()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_does_not_retry_logical_errors() {
        let calls = AtomicU32::new(0);
        let result = with_retry("load(abc)", fast_config(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DbErr::RecordNotFound("abc".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
