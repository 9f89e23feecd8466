//! 批量软删除
//!
//! 删除请求进入队列，由单个后台任务批量落地：
//! - 待删除 id 数达到阈值时立即刷新
//! - 定时器触发且有待删除数据时刷新
//! - 停止时把队列中剩余的任务一起做最后一次刷新

mod aggregator;
mod sink;

use std::time::Duration;

pub use aggregator::DeleteAggregator;
pub use sink::{DeleteSink, StoreSink};

/// 一次删除请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteJob {
    pub owner_id: String,
    pub short_ids: Vec<String>,
}

impl DeleteJob {
    pub fn new(owner_id: impl Into<String>, short_ids: Vec<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            short_ids,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleterSettings {
    /// 队列容量，满时 `submit` 等待
    pub queue_capacity: usize,
    /// 待删除 id 总数达到该值立即刷新
    pub flush_threshold: usize,
    pub flush_interval: Duration,
}

impl Default for DeleterSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            flush_threshold: 100,
            flush_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AggregatorState {
    Running,
    Draining,
    Stopped,
}

impl AggregatorState {
    fn as_u8(self) -> u8 {
        match self {
            AggregatorState::Running => 0,
            AggregatorState::Draining => 1,
            AggregatorState::Stopped => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => AggregatorState::Running,
            1 => AggregatorState::Draining,
            _ => AggregatorState::Stopped,
        }
    }
}
