//! 删除聚合器
//!
//! 单个后台任务独占待删除表 `owner_id → [short_id]`，其余调用方只通过
//! 有界队列投递任务。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use super::{AggregatorState, DeleteJob, DeleteSink, DeleterSettings};
use crate::errors::{Result, ShortenerError};

/// 后台任务持有的待删除数据
#[derive(Default)]
struct PendingDeletes {
    by_owner: HashMap<String, Vec<String>>,
    total: usize,
}

impl PendingDeletes {
    fn push(&mut self, job: DeleteJob) {
        if job.short_ids.is_empty() {
            return;
        }
        self.total += job.short_ids.len();
        self.by_owner
            .entry(job.owner_id)
            .or_default()
            .extend(job.short_ids);
    }

    fn is_empty(&self) -> bool {
        self.total == 0
    }

    fn take(&mut self) -> HashMap<String, Vec<String>> {
        self.total = 0;
        std::mem::take(&mut self.by_owner)
    }
}

pub struct DeleteAggregator {
    tx: mpsc::Sender<DeleteJob>,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    state: Arc<AtomicU8>,
}

impl DeleteAggregator {
    /// 启动后台任务，需在 tokio 运行时内调用
    pub fn spawn(sink: Arc<dyn DeleteSink>, settings: DeleterSettings) -> Self {
        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let (stop_tx, stop_rx) = oneshot::channel();
        let state = Arc::new(AtomicU8::new(AggregatorState::Running.as_u8()));

        let handle = tokio::spawn(run(rx, stop_rx, sink, settings));
        info!(
            "Delete aggregator started (threshold: {}, interval: {:?})",
            settings.flush_threshold, settings.flush_interval
        );

        Self {
            tx,
            stop_tx: Mutex::new(Some(stop_tx)),
            handle: Mutex::new(Some(handle)),
            state,
        }
    }

    pub fn state(&self) -> AggregatorState {
        AggregatorState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 投递删除任务；队列满时等待。停止后返回 `AggregatorClosed`
    pub async fn submit(&self, owner_id: &str, short_ids: Vec<String>) -> Result<()> {
        self.ensure_running()?;
        self.tx
            .send(DeleteJob::new(owner_id, short_ids))
            .await
            .map_err(|_| ShortenerError::aggregator_closed("delete aggregator has stopped"))
    }

    /// 非阻塞投递；队列已满时返回 `Ok(false)`
    pub fn try_submit(&self, owner_id: &str, short_ids: Vec<String>) -> Result<bool> {
        self.ensure_running()?;
        match self.tx.try_send(DeleteJob::new(owner_id, short_ids)) {
            Ok(()) => Ok(true),
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(
                    "Delete queue full, rejected {} ids for owner '{}'",
                    job.short_ids.len(),
                    job.owner_id
                );
                Ok(false)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ShortenerError::aggregator_closed(
                "delete aggregator has stopped",
            )),
        }
    }

    /// 停止并等待最后一次刷新完成；重复调用直接返回
    pub async fn stop(&self) {
        let stop_tx = self.stop_tx.lock().take();
        let Some(stop_tx) = stop_tx else {
            return;
        };

        self.state
            .store(AggregatorState::Draining.as_u8(), Ordering::Release);
        let _ = stop_tx.send(());

        let handle = self.handle.lock().take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            error!("Delete aggregator task failed: {}", e);
        }

        self.state
            .store(AggregatorState::Stopped.as_u8(), Ordering::Release);
        info!("Delete aggregator stopped");
    }

    fn ensure_running(&self) -> Result<()> {
        match self.state() {
            AggregatorState::Running => Ok(()),
            state => Err(ShortenerError::aggregator_closed(format!(
                "delete aggregator is {}",
                state.as_ref()
            ))),
        }
    }
}

async fn run(
    mut rx: mpsc::Receiver<DeleteJob>,
    mut stop_rx: oneshot::Receiver<()>,
    sink: Arc<dyn DeleteSink>,
    settings: DeleterSettings,
) {
    let mut pending = PendingDeletes::default();
    let mut ticker = interval_at(
        Instant::now() + settings.flush_interval,
        settings.flush_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = &mut stop_rx => break,
            job = rx.recv() => match job {
                Some(job) => {
                    pending.push(job);
                    if pending.total >= settings.flush_threshold {
                        debug!("Delete threshold reached ({} ids)", pending.total);
                        flush(&mut pending, &sink).await;
                    }
                }
                None => break,
            },
            _ = ticker.tick() => {
                if !pending.is_empty() {
                    flush(&mut pending, &sink).await;
                }
            }
        }
    }

    // 拒绝新任务后把队列里剩余的取完
    rx.close();
    while let Some(job) = rx.recv().await {
        pending.push(job);
    }
    if !pending.is_empty() {
        debug!("Final delete flush ({} ids)", pending.total);
        flush(&mut pending, &sink).await;
    }
}

/// 每个 owner 一次 `delete_batch`；失败只记日志，不重试
async fn flush(pending: &mut PendingDeletes, sink: &Arc<dyn DeleteSink>) {
    let batches = pending.take();
    for (owner_id, short_ids) in batches {
        match sink.delete_batch(&owner_id, &short_ids).await {
            Ok(()) => debug!(
                "Flushed {} deletions for owner '{}'",
                short_ids.len(),
                owner_id
            ),
            Err(e) => error!(
                "Failed to delete {} links for owner '{}': {}",
                short_ids.len(),
                owner_id,
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Default)]
    struct MockSink {
        batches: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl MockSink {
        fn batches(&self) -> Vec<(String, Vec<String>)> {
            self.batches.lock().clone()
        }

        fn total_ids(&self) -> usize {
            self.batches.lock().iter().map(|(_, ids)| ids.len()).sum()
        }
    }

    #[async_trait]
    impl DeleteSink for MockSink {
        async fn delete_batch(&self, owner_id: &str, short_ids: &[String]) -> Result<()> {
            self.batches
                .lock()
                .push((owner_id.to_string(), short_ids.to_vec()));
            Ok(())
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn slow_timer(threshold: usize) -> DeleterSettings {
        DeleterSettings {
            queue_capacity: 16,
            flush_threshold: threshold,
            flush_interval: Duration::from_secs(3600),
        }
    }

    #[test]
    fn test_pending_groups_by_owner() {
        let mut pending = PendingDeletes::default();
        pending.push(DeleteJob::new("u1", ids(&["a", "b"])));
        pending.push(DeleteJob::new("u2", ids(&["c"])));
        pending.push(DeleteJob::new("u1", ids(&["d"])));
        pending.push(DeleteJob::new("u3", vec![]));

        assert_eq!(pending.total, 4);
        let batches = pending.take();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches["u1"], ids(&["a", "b", "d"]));
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_stop_flushes_pending_jobs() {
        let sink = Arc::new(MockSink::default());
        let aggregator =
            DeleteAggregator::spawn(Arc::clone(&sink) as Arc<dyn DeleteSink>, slow_timer(100));

        aggregator.submit("u1", ids(&["a", "b"])).await.unwrap();
        aggregator.submit("u1", ids(&["c"])).await.unwrap();
        assert_eq!(aggregator.state(), AggregatorState::Running);

        aggregator.stop().await;

        assert_eq!(aggregator.state(), AggregatorState::Stopped);
        assert_eq!(sink.batches(), vec![("u1".to_string(), ids(&["a", "b", "c"]))]);
    }

    #[tokio::test]
    async fn test_submit_after_stop_is_rejected() {
        let sink = Arc::new(MockSink::default());
        let aggregator =
            DeleteAggregator::spawn(Arc::clone(&sink) as Arc<dyn DeleteSink>, slow_timer(100));
        aggregator.stop().await;
        aggregator.stop().await;

        let err = aggregator.submit("u1", ids(&["a"])).await.unwrap_err();
        assert!(matches!(err, ShortenerError::AggregatorClosed(_)));
        assert!(aggregator.try_submit("u1", ids(&["a"])).is_err());
        assert_eq!(sink.total_ids(), 0);
    }

    #[tokio::test]
    async fn test_threshold_triggers_flush() {
        let sink = Arc::new(MockSink::default());
        let aggregator =
            DeleteAggregator::spawn(Arc::clone(&sink) as Arc<dyn DeleteSink>, slow_timer(3));

        aggregator.submit("u1", ids(&["a", "b"])).await.unwrap();
        aggregator.submit("u2", ids(&["c"])).await.unwrap();

        for _ in 0..100 {
            if sink.total_ids() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(sink.total_ids(), 3);
        aggregator.stop().await;
    }

    #[tokio::test]
    async fn test_try_submit_enqueues() {
        let sink = Arc::new(MockSink::default());
        let aggregator =
            DeleteAggregator::spawn(Arc::clone(&sink) as Arc<dyn DeleteSink>, slow_timer(100));

        assert!(aggregator.try_submit("u1", ids(&["a"])).unwrap());
        aggregator.stop().await;
        assert_eq!(sink.total_ids(), 1);
    }
}
