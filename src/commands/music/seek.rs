use super::*;
use crate::commands::music::utils::embedded_messages;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, poise::ChoiceParameter)]
pub enum SeekUnit {
    #[default]
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl SeekUnit {
    fn duration(self, amount: u64) -> Duration {
        match self {
            Self::Milliseconds => Duration::from_millis(amount),
            Self::Seconds => Duration::from_secs(amount),
            Self::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            Self::Hours => Duration::from_secs(amount.saturating_mul(3600)),
        }
    }
}

/// Jump to a position in the current track
#[poise::command(slash_command, category = "Music")]
pub async fn seek(
    ctx: Context<'_>,
    #[description = "The position to seek to"] position: u64,
    #[description = "The unit of the position (milliseconds by default)"] unit: Option<SeekUnit>,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let player = &ctx.data().player;

    let Some(track) = player.now_playing(guild_id).await else {
        ctx.send(embedded_messages::no_track_playing()).await?;
        return Ok(());
    };

    let position = unit.unwrap_or_default().duration(position);
    match player.seek(guild_id, position).await {
        Ok(reached) => ctx.send(embedded_messages::seeked(&track, reached)).await?,
        Err(err) => {
            ctx.send(embedded_messages::error(format!("Error while seeking: {}", err)))
                .await?
        }
    };

    Ok(())
}
