//! Sample data used across tests

use fake::Fake;
use fake::faker::lorem::en::Sentence;
use rusty_tunes::commands::music::utils::track::Track;
use serenity::model::id::GuildId;
use std::time::Duration;

/// Sample guild ID for testing
pub const SAMPLE_GUILD_ID: GuildId = GuildId::new(987654321);

/// A second guild, for isolation checks
pub const OTHER_GUILD_ID: GuildId = GuildId::new(123456789);

/// Sample requester name for testing
pub const SAMPLE_REQUESTER: &str = "rusty-tester";

/// A track with a fixed, readable title
pub fn track(name: &str) -> Track {
    Track::new(name, format!("https://www.youtube.com/watch?v={name}"))
        .with_requester(SAMPLE_REQUESTER)
}

/// `count` tracks with generated titles and durations
pub fn random_tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| {
            let title: String = Sentence(1..4).fake();
            let seconds: u64 = (30..600).fake();
            Track::new(title, format!("https://youtu.be/fake{i}"))
                .with_duration(Duration::from_secs(seconds))
                .with_requester(SAMPLE_REQUESTER)
        })
        .collect()
}
