use super::*;
use crate::commands::music::utils::embedded_messages::{self, GuildStatus};
use std::time::Instant;

/// Show every guild with a queue and how long idle ones have left
#[poise::command(slash_command, category = "Music", owners_only)]
pub async fn status(ctx: Context<'_>) -> CommandResult {
    let data = ctx.data();
    let queues = data.player.queues();
    let timeout = data.config.idle_timeout;
    let now = Instant::now();

    let mut guilds = Vec::new();
    for guild_id in queues.guilds() {
        let Some(handle) = queues.existing(guild_id) else {
            continue;
        };
        let queue = handle.lock().await;
        guilds.push(GuildStatus {
            guild_id,
            queued: queue.len(),
            mode: queue.mode(),
            idle_remaining: queues.idle().remaining(guild_id, timeout, now),
        });
    }
    guilds.sort_by_key(|status| status.guild_id);

    ctx.send(embedded_messages::status(&guilds, timeout)).await?;
    Ok(())
}
