use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;

use clan_reminders::{
    bot,
    config::Config,
    error::AppError,
    scheduler::reminders,
    service::{
        clash_api::ClashApiClient,
        delivery::DiscordDeliverySink,
        dispatch::ReminderDispatcher,
        event_window::EventWindowResolver,
        game_data::GameDataClient,
        materializer::TriggerMaterializer,
        render::ReminderRenderer,
    },
    startup,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;
    let http_client = startup::setup_reqwest_client()?;

    let game: Arc<dyn GameDataClient> = Arc::new(ClashApiClient::new(
        http_client,
        config.clash_api_url.clone(),
        config.clash_api_token.clone(),
    ));

    tracing::info!("Starting reminder engine");

    // Initialize Discord bot and extract HTTP client
    let (bot_client, discord_http) = bot::start::init_bot(&config, db.clone()).await?;

    tokio::spawn(async move {
        if let Err(e) = bot::start::start_bot(bot_client).await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    let resolver = EventWindowResolver::new(game.clone());
    let materializer =
        TriggerMaterializer::new(db.clone(), resolver, config.engine.catch_up_policy);
    let renderer = ReminderRenderer::new(db.clone(), game);
    let sink = Arc::new(DiscordDeliverySink::new(discord_http));
    let dispatcher = ReminderDispatcher::new(db, renderer, sink, &config.engine);

    let mut scheduler =
        reminders::start_scheduler(materializer, dispatcher.clone(), &config.engine).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to listen for shutdown: {}", e)))?;

    tracing::info!("Shutting down, waiting for in-flight deliveries");

    scheduler.shutdown().await?;

    dispatcher
        .shutdown(Duration::from_secs(config.engine.shutdown_grace_secs))
        .await;

    Ok(())
}
