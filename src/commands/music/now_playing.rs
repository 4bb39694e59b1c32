use super::*;
use crate::commands::music::utils::embedded_messages;
use poise::CreateReply;

/// Show the track that is currently playing
#[poise::command(slash_command, category = "Music", rename = "now-playing")]
pub async fn now_playing(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx.data().player.now_playing(guild_id).await {
        Some(track) => {
            ctx.send(CreateReply::default().embed(embedded_messages::now_playing(&track)))
                .await?
        }
        None => ctx.send(embedded_messages::no_track_playing()).await?,
    };

    Ok(())
}
