//! Commands and track ends racing on the same guild

mod common;

use common::fixtures::{SAMPLE_GUILD_ID, random_tracks, track};
use common::mocks::{played, recording_engine};
use common::{finished, player, queued_titles, seed};
use pretty_assertions::assert_eq;
use rusty_tunes::commands::music::utils::{
    engine::{EndReason, PlayerEvent, TrackEnd},
    player::{Continuation, SkipOutcome},
    queue::QueueMode,
};
use serenity::model::id::GuildId;
use tokio::sync::mpsc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enqueues_lose_nothing() {
    let (mut engine, _log) = recording_engine();
    engine
        .expect_current_track()
        .returning(|_| Some(track("playing")));
    let player = player(engine);

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let player = player.clone();
            tokio::spawn(async move {
                player
                    .enqueue(SAMPLE_GUILD_ID, random_tracks(2))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut positions = Vec::new();
    for task in tasks {
        let enqueued = task.await.unwrap();
        assert_eq!(enqueued.queued, 2);
        positions.push(enqueued.position.unwrap());
    }
    positions.sort_unstable();

    assert_eq!(queued_titles(&player, SAMPLE_GUILD_ID).await.len(), 100);
    // Each batch landed as one contiguous block
    assert_eq!(positions, (0..50).map(|i| i * 2 + 1).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_skip_wins_over_racing_track_end() {
    let (engine, log) = recording_engine();
    let player = player(engine);
    let current = seed(&player, SAMPLE_GUILD_ID, QueueMode::Normal, random_tracks(10)).await;

    let ending = {
        let player = player.clone();
        tokio::spawn(async move {
            player
                .on_track_end(TrackEnd {
                    guild_id: SAMPLE_GUILD_ID,
                    playback: current,
                    track: track("current"),
                    reason: EndReason::Finished,
                })
                .await
        })
    };
    let skipping = {
        let player = player.clone();
        tokio::spawn(async move { player.skip(SAMPLE_GUILD_ID, 1).await.unwrap() })
    };
    let continuation = ending.await.unwrap();
    let outcome = skipping.await.unwrap();

    let played = played(&log, SAMPLE_GUILD_ID);
    let SkipOutcome::Playing(skipped_to) = outcome else {
        panic!("ten tracks were queued");
    };
    // Whichever ran first, the skip decides what ends up playing
    assert_eq!(played.last(), Some(&skipped_to.title));
    match continuation {
        Continuation::Playing(_) => assert_eq!(played.len(), 2),
        Continuation::Ignored => assert_eq!(played.len(), 1),
        other => panic!("unexpected continuation {other:?}"),
    }
    assert_eq!(
        queued_titles(&player, SAMPLE_GUILD_ID).await.len(),
        10 - played.len()
    );
}

#[tokio::test]
async fn test_late_track_end_does_not_undo_skip() {
    let (engine, log) = recording_engine();
    let player = player(engine);
    let a = seed(&player, SAMPLE_GUILD_ID, QueueMode::RepeatTrack, vec![track("b")]).await;
    let (tx, rx) = mpsc::unbounded_channel();

    // `a` ended on its own, but the event is handled only after the skip
    tx.send(PlayerEvent::TrackEnded(TrackEnd {
        guild_id: SAMPLE_GUILD_ID,
        playback: a,
        track: track("a"),
        reason: EndReason::Finished,
    }))
    .unwrap();
    player.skip(SAMPLE_GUILD_ID, 1).await.unwrap();
    drop(tx);
    player.clone().run(rx).await;

    assert_eq!(played(&log, SAMPLE_GUILD_ID), vec!["b"]);
    assert!(queued_titles(&player, SAMPLE_GUILD_ID).await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_guilds_in_parallel() {
    let (engine, log) = recording_engine();
    let player = player(engine);
    let guilds: Vec<GuildId> = (1..=20).map(GuildId::new).collect();

    for &guild_id in &guilds {
        seed(&player, guild_id, QueueMode::RepeatQueue, vec![track("b")]).await;
    }

    let tasks: Vec<_> = guilds
        .iter()
        .map(|&guild_id| {
            let player = player.clone();
            tokio::spawn(async move {
                for _ in 0..5 {
                    let end = finished(&player, guild_id, track("a")).await;
                    player.on_track_end(end).await;
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(player.queues().len(), 20);
    for &guild_id in &guilds {
        // After the first rotation the queue only ever holds the re-queued track
        assert_eq!(played(&log, guild_id), vec!["b", "a", "a", "a", "a"]);
    }
}
