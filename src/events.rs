use poise::serenity_prelude as serenity;
use serenity::{GuildId, UserId, VoiceState};
use tracing::{debug, info};

use crate::{Data, Error};

/// Gateway events the bot reacts to outside of commands
pub async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("{} is connected", data_about_bot.user.name);
        }
        serenity::FullEvent::VoiceStateUpdate { new, .. } => {
            if let Some(guild_id) = bot_disconnected(framework.bot_id, new) {
                info!("Disconnected from voice in guild {}, dropping its queue", guild_id);
                data.player.disconnected(guild_id).await;
            }
        }
        _ => {}
    }
    Ok(())
}

/// The guild the bot just left voice in, if this update says so
fn bot_disconnected(bot_id: UserId, state: &VoiceState) -> Option<GuildId> {
    if state.user_id != bot_id || state.channel_id.is_some() {
        return None;
    }
    debug!("Bot voice state cleared: {:?}", state.guild_id);
    state.guild_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    const BOT: u64 = 42;

    fn voice_state(user_id: u64, channel_id: Option<u64>) -> VoiceState {
        serde_json::from_value(json!({
            "channel_id": channel_id.map(|id| id.to_string()),
            "deaf": false,
            "guild_id": "7",
            "mute": false,
            "self_deaf": false,
            "self_mute": false,
            "self_video": false,
            "session_id": "session",
            "suppress": false,
            "user_id": user_id.to_string(),
            "request_to_speak_timestamp": null,
        }))
        .unwrap()
    }

    #[test_case(BOT, None, Some(7) ; "bot disconnected")]
    #[test_case(BOT, Some(100), None ; "bot moved channel")]
    #[test_case(1, None, None ; "other user left")]
    fn test_bot_disconnected(user_id: u64, channel_id: Option<u64>, expected: Option<u64>) {
        let state = voice_state(user_id, channel_id);

        assert_eq!(
            bot_disconnected(UserId::new(BOT), &state),
            expected.map(GuildId::new)
        );
    }
}
