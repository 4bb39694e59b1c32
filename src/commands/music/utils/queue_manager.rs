use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::idle_tracker::IdleTracker;
use super::queue::{DEFAULT_QUEUE_CAPACITY, Queue};

/// Shared handle to one guild's queue. Every mutation goes through the mutex,
/// which hands out access in the order callers asked for it.
pub type QueueHandle = Arc<Mutex<Queue>>;

/// Registry of per-guild queues and idle records
pub struct QueueManager {
    // Map of guild ID to queue
    queues: DashMap<GuildId, QueueHandle>,
    idle: IdleTracker,
    max_queue_length: usize,
}

impl Default for QueueManager {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl QueueManager {
    /// Create a queue manager whose queues hold at most `max_queue_length` tracks
    pub fn new(max_queue_length: usize) -> Self {
        Self {
            queues: DashMap::new(),
            idle: IdleTracker::new(),
            max_queue_length,
        }
    }

    pub fn max_queue_length(&self) -> usize {
        self.max_queue_length
    }

    /// Get the queue for a guild, creating an empty normal-mode one if needed
    pub fn get(&self, guild_id: GuildId) -> QueueHandle {
        self.queues
            .entry(guild_id)
            .or_insert_with(|| {
                debug!("Creating queue for guild {}", guild_id);
                Arc::new(Mutex::new(Queue::with_capacity(self.max_queue_length)))
            })
            .clone()
    }

    /// Get the queue for a guild without creating one
    pub fn existing(&self, guild_id: GuildId) -> Option<QueueHandle> {
        self.queues.get(&guild_id).map(|entry| entry.value().clone())
    }

    /// Drop the queue and the idle record for a guild
    pub fn delete(&self, guild_id: GuildId) {
        if self.queues.remove(&guild_id).is_some() {
            info!("Deleted queue for guild {}", guild_id);
        }
        self.idle.clear(guild_id);
    }

    pub fn idle(&self) -> &IdleTracker {
        &self.idle
    }

    /// Guilds that currently have a queue
    pub fn guilds(&self) -> Vec<GuildId> {
        self.queues.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Empty every registered queue
    pub async fn clear_all(&self) {
        let handles: Vec<QueueHandle> = self
            .queues
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        for handle in handles {
            handle.lock().await.clear();
        }
        debug!("Cleared all queues");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::utils::queue::QueueMode;
    use crate::commands::music::utils::track::Track;
    use pretty_assertions::assert_eq;

    fn guild(id: u64) -> GuildId {
        GuildId::new(id)
    }

    #[tokio::test]
    async fn test_get_creates_empty_normal_queue() {
        let manager = QueueManager::new(10);

        let queue = manager.get(guild(123));
        let queue = queue.lock().await;

        assert!(queue.is_empty());
        assert_eq!(queue.mode(), QueueMode::Normal);
        assert_eq!(queue.capacity(), 10);
    }

    #[tokio::test]
    async fn test_get_returns_the_same_queue() {
        let manager = QueueManager::default();

        let first = manager.get(guild(123));
        first
            .lock()
            .await
            .push(Track::new("a", "https://youtu.be/a"))
            .unwrap();
        let second = manager.get(guild(123));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.len(), 1);
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_guilds_are_isolated() {
        let manager = QueueManager::default();
        manager
            .get(guild(1))
            .lock()
            .await
            .push(Track::new("a", "https://youtu.be/a"))
            .unwrap();

        assert!(manager.get(guild(2)).lock().await.is_empty());
    }

    #[test]
    fn test_existing_does_not_create() {
        let manager = QueueManager::default();

        assert!(manager.existing(guild(1)).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_delete_removes_queue_and_idle_record() {
        let manager = QueueManager::default();
        manager.get(guild(123));
        manager.idle().mark_idle(guild(123));

        manager.delete(guild(123));

        assert!(manager.existing(guild(123)).is_none());
        assert!(!manager.idle().is_idle(guild(123)));
    }

    #[test]
    fn test_delete_unknown_guild_is_noop() {
        let manager = QueueManager::default();
        manager.delete(guild(404));
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_get_starts_fresh() {
        let manager = QueueManager::default();
        {
            let queue = manager.get(guild(1));
            let mut queue = queue.lock().await;
            queue.set_mode(QueueMode::RepeatQueue);
            queue.push(Track::new("a", "https://youtu.be/a")).unwrap();
        }

        manager.delete(guild(1));
        let queue = manager.get(guild(1));
        let queue = queue.lock().await;

        assert!(queue.is_empty());
        assert_eq!(queue.mode(), QueueMode::Normal);
    }

    #[tokio::test]
    async fn test_clear_all_keeps_registrations() {
        let manager = QueueManager::default();
        for id in 1..=3 {
            manager
                .get(guild(id))
                .lock()
                .await
                .push(Track::new("a", "https://youtu.be/a"))
                .unwrap();
        }

        manager.clear_all().await;

        assert_eq!(manager.len(), 3);
        for id in manager.guilds() {
            assert!(manager.get(id).lock().await.is_empty());
        }
    }
}
