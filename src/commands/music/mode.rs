use super::*;
use crate::commands::music::utils::{embedded_messages, queue::QueueMode};
use tracing::info;

/// Change how the next track is picked
#[poise::command(slash_command, category = "Music", rename = "queue-mode")]
pub async fn mode(
    ctx: Context<'_>,
    #[description = "How the next track is picked"] mode: QueueMode,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    ctx.data()
        .player
        .queues()
        .get(guild_id)
        .lock()
        .await
        .set_mode(mode);
    info!("Queue mode for guild {} set to {}", guild_id, mode);

    ctx.send(embedded_messages::mode_changed(mode)).await?;
    Ok(())
}
