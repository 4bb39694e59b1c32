use super::*;
use crate::commands::music::utils::embedded_messages;

/// Remove a track from the queue by its position
#[poise::command(slash_command, category = "Music")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Position of the track to remove (1-based)"]
    #[min = 1]
    position: usize,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let reply = {
        let handle = ctx.data().player.queues().get(guild_id);
        let mut queue = handle.lock().await;

        if queue.is_empty() {
            embedded_messages::queue_is_empty()
        } else {
            // Convert to 0-based index
            match position.checked_sub(1).and_then(|index| queue.remove(index)) {
                Some(track) => embedded_messages::track_removed(&track, position),
                None => embedded_messages::invalid_queue_position(queue.len()),
            }
        }
    };

    ctx.send(reply).await?;
    Ok(())
}
