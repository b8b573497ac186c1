//! # Reminder Scheduler
//!
//! Owns the pending reminder set and one timer task per reminder.
//!
//! Each armed reminder is an independent tokio task that sleeps until its fire
//! time, posts the message through the [`NotificationSink`], and then removes
//! itself from the store. All mutations of the task set, and every save of it,
//! happen under a single async mutex so concurrent fires and creations never
//! overwrite each other's changes on disk.
//!
//! Delivery is at-most-once: a failed send is logged and the reminder is still
//! retired.

use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::error::ReminderError;
use super::sink::NotificationSink;
use super::store::{ReminderId, ReminderStore, ReminderTask};
use super::when::FireTime;

struct SchedulerInner {
    store: tokio::sync::Mutex<ReminderStore>,
    timers: Mutex<HashMap<ReminderId, JoinHandle<()>>>,
    sink: Arc<dyn NotificationSink>,
}

impl SchedulerInner {
    fn timers(&self) -> MutexGuard<'_, HashMap<ReminderId, JoinHandle<()>>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the current task set. Failures are logged, never returned.
    async fn persist(&self) {
        let store = self.store.lock().await;
        if let Err(e) = store.save().await {
            error!("Failed to persist reminders: {e}");
        }
    }

    /// Spawn the timer for `task`. The handle is registered before the timer can retire.
    fn arm(inner: &Arc<SchedulerInner>, task: ReminderTask) {
        let mut timers = inner.timers();
        let id = task.id;
        let fire_inner = Arc::clone(inner);
        let handle = tokio::spawn(async move {
            SchedulerInner::fire(fire_inner, task).await;
        });
        if let Some(previous) = timers.insert(id, handle) {
            warn!("Reminder {id} was armed twice, dropping the older timer");
            previous.abort();
        }
    }

    async fn fire(inner: Arc<SchedulerInner>, task: ReminderTask) {
        let delay = (task.fire_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        if !delay.is_zero() {
            debug!("Reminder {} sleeping for {:?}", task.id, delay);
            tokio::time::sleep(delay).await;
        }

        match inner.sink.send(task.channel_id, &task.message).await {
            Ok(()) => info!(
                "⏰ Delivered reminder {} to channel {}",
                task.id, task.channel_id
            ),
            Err(e) => {
                let err = ReminderError::Delivery {
                    channel_id: task.channel_id,
                    reason: e.to_string(),
                };
                error!("Reminder {}: {err}", task.id);
            }
        }

        inner.retire(task.id).await;
    }

    /// Remove a fired reminder from the store and the timer table
    async fn retire(&self, id: ReminderId) {
        {
            let mut store = self.store.lock().await;
            if store.remove(id).is_some() {
                if let Err(e) = store.save().await {
                    error!("Failed to persist reminders after retiring {id}: {e}");
                }
            }
        }
        self.timers().remove(&id);
    }
}

/// Schedules reminders and replays persisted ones on startup
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<SchedulerInner>,
}

impl ReminderScheduler {
    pub fn new(store: ReminderStore, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                store: tokio::sync::Mutex::new(store),
                timers: Mutex::new(HashMap::new()),
                sink,
            }),
        }
    }

    /// Load persisted reminders and arm every one of them.
    ///
    /// Reminders whose time has already passed fire right away. Returns the
    /// number of reminders armed.
    pub async fn start(&self) -> Result<usize, ReminderError> {
        let mut store = self.inner.store.lock().await;
        let persisted = store.load().await?;

        let mut armed = 0;
        for task in persisted {
            if store.get(task.id).is_some() {
                continue;
            }
            if task.fire_at <= Utc::now() {
                info!("Reminder {} is overdue, firing now", task.id);
            }
            store.add(task.clone());
            SchedulerInner::arm(&self.inner, task);
            armed += 1;
        }

        info!(
            "📅 Reminder scheduler started with {armed} pending reminders from {}",
            store.path().display()
        );
        Ok(armed)
    }

    /// Schedule `message` for `channel_id` at the time described by `when`.
    ///
    /// `when` is either a date/time (`2024-12-24 18:00`, `+` also works as the
    /// space) or `+`-joined durations (`2h`, `1d+30m`). The save happens in the
    /// background; a failed save is only logged.
    pub async fn create_reminder(
        &self,
        when: &str,
        message: &str,
        channel_id: u64,
    ) -> Result<ReminderId, ReminderError> {
        let fire_at = FireTime::parse(when)?.resolve(Utc::now())?;
        let task = ReminderTask::new(fire_at, message, channel_id);
        let id = task.id;

        info!(
            "Created reminder {id} for channel {channel_id} at {}",
            fire_at.to_rfc3339()
        );

        {
            let mut store = self.inner.store.lock().await;
            store.add(task.clone());
            SchedulerInner::arm(&self.inner, task);
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.persist().await;
        });

        Ok(id)
    }

    /// Write the current task set to disk now
    pub async fn persist(&self) {
        self.inner.persist().await;
    }

    pub async fn get(&self, id: ReminderId) -> Option<ReminderTask> {
        self.inner.store.lock().await.get(id).cloned()
    }

    /// All pending reminders, soonest first
    pub async fn pending(&self) -> Vec<ReminderTask> {
        let mut tasks = self.inner.store.lock().await.tasks().to_vec();
        tasks.sort_by_key(|t| t.fire_at);
        tasks
    }

    /// Pending reminders targeting one channel, soonest first
    pub async fn pending_in_channel(&self, channel_id: u64) -> Vec<ReminderTask> {
        self.pending()
            .await
            .into_iter()
            .filter(|t| t.channel_id == channel_id)
            .collect()
    }

    /// Number of timers currently armed
    pub fn armed_count(&self) -> usize {
        self.inner.timers().len()
    }

    /// Abort every armed timer and save the pending set so it replays on next start
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.inner.timers().drain().collect();
        for (_, handle) in &handles {
            handle.abort();
        }
        info!("Reminder scheduler stopped, {} timers aborted", handles.len());
        self.inner.persist().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(u64, String)>>,
        fail: bool,
    }

    impl RecordingSink {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<(u64, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, channel_id: u64, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push((channel_id, text.to_string()));
            if self.fail {
                Err(anyhow!("channel is gone"))
            } else {
                Ok(())
            }
        }
    }

    fn scheduler_at(path: &Path, sink: Arc<RecordingSink>) -> ReminderScheduler {
        ReminderScheduler::new(ReminderStore::new(path), sink)
    }

    fn persisted(path: &PathBuf) -> Vec<ReminderTask> {
        let data = std::fs::read(path).unwrap();
        serde_json::from_slice(&data).unwrap()
    }

    async fn eventually<F: Fn() -> bool>(check: F) {
        for _ in 0..100 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("condition not met within 2s");
    }

    #[tokio::test]
    async fn test_relative_reminder_scheduled_in_future() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminds.json");
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_at(&path, sink.clone());

        let before = Utc::now();
        let id = scheduler
            .create_reminder("14h", "drink water", 123)
            .await
            .unwrap();
        let after = Utc::now();

        let task = scheduler.get(id).await.unwrap();
        assert_eq!(task.message, "drink water");
        assert_eq!(task.channel_id, 123);
        assert!(task.fire_at >= before + ChronoDuration::hours(14));
        assert!(task.fire_at <= after + ChronoDuration::hours(14));
        assert_eq!(scheduler.armed_count(), 1);
        assert!(sink.sent().is_empty());

        scheduler.persist().await;
        assert_eq!(persisted(&path), vec![task]);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler_at(
            &dir.path().join("reminds.json"),
            Arc::new(RecordingSink::default()),
        );

        let err = scheduler.create_reminder("0h", "x", 123).await.unwrap_err();
        match err {
            ReminderError::InvalidDurationSegment { segment, .. } => assert_eq!(segment, "0h"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(scheduler.pending().await.is_empty());
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_expression_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler_at(
            &dir.path().join("reminds.json"),
            Arc::new(RecordingSink::default()),
        );

        assert!(matches!(
            scheduler.create_reminder("  ", "x", 1).await,
            Err(ReminderError::InvalidTimeExpression(_))
        ));
    }

    #[tokio::test]
    async fn test_back_to_back_reminders_have_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler_at(
            &dir.path().join("reminds.json"),
            Arc::new(RecordingSink::default()),
        );

        let a = scheduler.create_reminder("1h", "a", 1).await.unwrap();
        let b = scheduler.create_reminder("1h", "a", 1).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending().await.len(), 2);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_reminder_fires_and_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminds.json");
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_at(&path, sink.clone());

        scheduler
            .create_reminder("100ms", "stand up", 9)
            .await
            .unwrap();
        assert!(sink.sent().is_empty());

        eventually(|| sink.sent().len() == 1).await;
        eventually(|| scheduler.armed_count() == 0).await;

        assert_eq!(sink.sent(), vec![(9, "stand up".to_string())]);
        assert!(scheduler.pending().await.is_empty());
        assert!(persisted(&path).is_empty());
    }

    #[tokio::test]
    async fn test_start_with_missing_file_arms_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler_at(
            &dir.path().join("absent.json"),
            Arc::new(RecordingSink::default()),
        );

        assert_eq!(scheduler.start().await.unwrap(), 0);
        assert!(scheduler.pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_fires_overdue_reminders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminds.json");

        let overdue = ReminderTask::new(Utc::now() - ChronoDuration::hours(1), "late", 5);
        let future = ReminderTask::new(Utc::now() + ChronoDuration::hours(1), "later", 6);
        let mut seed = ReminderStore::new(&path);
        seed.add(overdue);
        seed.add(future.clone());
        seed.save().await.unwrap();

        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_at(&path, sink.clone());
        assert_eq!(scheduler.start().await.unwrap(), 2);

        eventually(|| sink.sent().len() == 1).await;
        eventually(|| scheduler.armed_count() == 1).await;

        assert_eq!(sink.sent(), vec![(5, "late".to_string())]);
        assert_eq!(scheduler.pending().await, vec![future.clone()]);
        assert_eq!(persisted(&path), vec![future]);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_delivery_still_retires() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminds.json");
        let sink = Arc::new(RecordingSink::failing());
        let scheduler = scheduler_at(&path, sink.clone());

        scheduler.create_reminder("10ms", "nobody hears", 3).await.unwrap();

        eventually(|| sink.sent().len() == 1).await;
        eventually(|| scheduler.armed_count() == 0).await;
        assert!(scheduler.pending().await.is_empty());

        // No redelivery
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fire_concurrent_with_creation_loses_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminds.json");
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_at(&path, sink.clone());

        scheduler.create_reminder("30ms", "first", 1).await.unwrap();

        let mut creators = Vec::new();
        for i in 0..10 {
            let scheduler = scheduler.clone();
            creators.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(i * 7)).await;
                scheduler
                    .create_reminder("1h", &format!("later {i}"), 2)
                    .await
                    .unwrap()
            }));
        }
        let mut created = Vec::new();
        for creator in creators {
            created.push(creator.await.unwrap());
        }

        eventually(|| sink.sent().len() == 1).await;
        eventually(|| scheduler.armed_count() == 10).await;
        scheduler.persist().await;

        // Background saves may still be rewriting the file, poll until a full read matches
        created.sort();
        eventually(|| {
            let Ok(data) = std::fs::read(&path) else {
                return false;
            };
            let Ok(tasks) = serde_json::from_slice::<Vec<ReminderTask>>(&data) else {
                return false;
            };
            let mut on_disk: Vec<_> = tasks.into_iter().map(|t| t.id).collect();
            on_disk.sort();
            on_disk == created
        })
        .await;
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_keeps_pending_reminders_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminds.json");
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_at(&path, sink.clone());

        let id = scheduler.create_reminder("150ms", "after restart", 4).await.unwrap();
        scheduler.shutdown().await;
        assert_eq!(scheduler.armed_count(), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(sink.sent().is_empty());

        let on_disk = persisted(&path);
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0].id, id);

        // A fresh scheduler picks it up again
        let restarted = scheduler_at(&path, sink.clone());
        assert_eq!(restarted.start().await.unwrap(), 1);
        eventually(|| sink.sent().len() == 1).await;
    }

    #[tokio::test]
    async fn test_failed_start_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminds.json");
        let contents = br#"[{"id":"not-a-uuid","fire_at":"2030-01-01T00:00:00Z","message":"m","channel_id":1}]"#;
        std::fs::write(&path, contents).unwrap();

        let scheduler = scheduler_at(&path, Arc::new(RecordingSink::default()));
        assert!(matches!(
            scheduler.start().await,
            Err(ReminderError::Persistence { .. })
        ));

        scheduler.create_reminder("1h", "still armed", 1).await.unwrap();
        assert_eq!(scheduler.armed_count(), 1);
        scheduler.shutdown().await;

        assert_eq!(std::fs::read(&path).unwrap(), contents.to_vec());
    }

    #[tokio::test]
    async fn test_pending_in_channel_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler_at(
            &dir.path().join("reminds.json"),
            Arc::new(RecordingSink::default()),
        );

        scheduler.create_reminder("3h", "c", 10).await.unwrap();
        scheduler.create_reminder("1h", "a", 10).await.unwrap();
        scheduler.create_reminder("2h", "other", 11).await.unwrap();

        let messages: Vec<_> = scheduler
            .pending_in_channel(10)
            .await
            .into_iter()
            .map(|t| t.message)
            .collect();
        assert_eq!(messages, vec!["a", "c"]);
        scheduler.shutdown().await;
    }
}
