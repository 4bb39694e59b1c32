//! Bookkeeping for guilds whose playback ran out.
//!
//! A guild is marked idle with the instant its last track ended without a
//! successor. A periodic sweep compares that instant against the configured
//! timeout and disconnects guilds that stayed silent for too long.

use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::player::Player;

#[derive(Debug, Default)]
pub struct IdleTracker {
    since: DashMap<GuildId, Instant>,
}

impl IdleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a guild idle as of now
    pub fn mark_idle(&self, guild_id: GuildId) {
        self.mark_idle_at(guild_id, Instant::now());
    }

    /// Mark a guild idle as of `at`. A guild that is already idle keeps its
    /// original start.
    pub fn mark_idle_at(&self, guild_id: GuildId, at: Instant) {
        self.since.entry(guild_id).or_insert_with(|| {
            info!("Guild {} is now idle", guild_id);
            at
        });
    }

    /// Forget the idle record for a guild. Returns whether one existed.
    pub fn clear(&self, guild_id: GuildId) -> bool {
        let cleared = self.since.remove(&guild_id).is_some();
        if cleared {
            debug!("Reset idle timer for guild {}", guild_id);
        }
        cleared
    }

    pub fn idle_since(&self, guild_id: GuildId) -> Option<Instant> {
        self.since.get(&guild_id).map(|entry| *entry.value())
    }

    pub fn is_idle(&self, guild_id: GuildId) -> bool {
        self.since.contains_key(&guild_id)
    }

    /// Time left before the guild reaches `timeout`, zero once it has
    pub fn remaining(&self, guild_id: GuildId, timeout: Duration, now: Instant) -> Option<Duration> {
        self.idle_since(guild_id)
            .map(|since| timeout.saturating_sub(now.saturating_duration_since(since)))
    }

    /// Whether the guild has been idle for at least `timeout` as of `now`
    pub fn is_expired(&self, guild_id: GuildId, timeout: Duration, now: Instant) -> bool {
        self.idle_since(guild_id)
            .is_some_and(|since| now.saturating_duration_since(since) >= timeout)
    }

    /// Guilds that have been idle for at least `timeout` as of `now`
    pub fn expired(&self, timeout: Duration, now: Instant) -> Vec<GuildId> {
        self.since
            .iter()
            .filter(|entry| now.saturating_duration_since(*entry.value()) >= timeout)
            .map(|entry| *entry.key())
            .collect()
    }

    /// Every idle guild with its idle start, oldest first
    pub fn snapshot(&self) -> Vec<(GuildId, Instant)> {
        let mut entries: Vec<_> = self
            .since
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        entries.sort_by_key(|(_, since)| *since);
        entries
    }

    pub fn len(&self) -> usize {
        self.since.len()
    }

    pub fn is_empty(&self) -> bool {
        self.since.is_empty()
    }
}

/// Spawn the recurring sweep that disconnects guilds idle for longer than `timeout`
pub fn spawn_idle_sweeper(
    player: Arc<Player>,
    interval: Duration,
    timeout: Duration,
) -> JoinHandle<()> {
    info!(
        "Starting idle sweeper (every {:?}, timeout {:?})",
        interval, timeout
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let disconnected = player.sweep_idle(timeout, Instant::now()).await;
            if !disconnected.is_empty() {
                info!("Idle sweep disconnected {} guild(s)", disconnected.len());
            }
        }
    })
}
