use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rusty_tunes::commands::music::{
    self,
    utils::{
        idle_tracker::spawn_idle_sweeper, player::Player, queue_manager::QueueManager,
        songbird_engine::SongbirdEngine,
    },
};
use rusty_tunes::config::Config;
use rusty_tunes::{CommandResult, Context, Data, Error, events};

#[poise::command(slash_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rusty_tunes=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = Arc::new(Config::from_env()?);
    info!("Loaded {:?}", config);

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    // Voice manager shared between the gateway client and the playback engine
    let songbird = Songbird::serenity();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let engine = Arc::new(SongbirdEngine::new(
        songbird.clone(),
        reqwest::Client::new(),
        events_tx,
    ));
    let player = Arc::new(Player::new(
        QueueManager::new(config.max_queue_length),
        engine,
    ));

    tokio::spawn(player.clone().run(events_rx));
    let sweeper = spawn_idle_sweeper(
        player.clone(),
        config.idle_sweep_interval,
        config.idle_timeout,
    );

    let mut commands = vec![
        // Default commands
        register(),
        help(),
    ];
    commands.extend(music::commands());

    let data = Data {
        player: player.clone(),
        config: config.clone(),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .register_songbird_with(songbird)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Received Ctrl-C, shutting down");
        player.shutdown().await;
        shard_manager.shutdown_all().await;
    });

    client.start().await?;
    sweeper.abort();
    info!("Client stopped");
    Ok(())
}
