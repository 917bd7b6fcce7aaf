// Bot binary entry point: wires the engine to the Telegram transport.

use anyhow::Context;
use common::bootstrap;
use common::config::Settings;
use common::dispatcher::ReminderDispatcher;
use common::reconciler::Reconciler;
use common::registry::TimerRegistry;
use common::service::LectureService;
use common::store::ScheduleStore;
use std::sync::Arc;
use teloxide::dptree;
use teloxide::prelude::*;
use tracing::info;

mod handlers;
mod telegram;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap::init_human_tracing();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    settings
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    // The single fatal startup condition: no credential, no scheduler.
    if settings.bot.token.trim().is_empty() {
        eprintln!(
            "❌ BOT_TOKEN не задан!\n\
             1. Получите токен у @BotFather в Telegram\n\
             2. Задайте переменную окружения BOT_TOKEN\n\
             3. Или пропишите токен в config/local.toml"
        );
        return Ok(());
    }

    info!(
        timezone = %settings.bot.timezone,
        schedule_file = %settings.schedule.path,
        lead_minutes = settings.reminder.lead_minutes,
        "Starting lecture reminder bot"
    );

    let bot = Bot::new(settings.bot.token.clone());

    // Engine wiring: registry → dispatcher → reconciler → service.
    let registry = Arc::new(TimerRegistry::new(settings.bot.timezone));
    let sink = Arc::new(telegram::TelegramSink::new(bot.clone()));
    let dispatcher = Arc::new(ReminderDispatcher::new(
        sink,
        settings.bot.timezone,
        settings.reminder.lead_minutes,
    ));
    let reconciler = Reconciler::new(
        Arc::clone(&registry),
        dispatcher,
        settings.reminder.lead_minutes,
    );

    let store = ScheduleStore::new(&settings.schedule.path);
    let service = Arc::new(
        LectureService::open(store, reconciler, settings.reminder.lead_minutes).await,
    );

    // Timers are not persisted: rebuild the whole set from the file.
    let restored = service.startup_reconcile().await;
    info!(timers = restored, "Restored reminder timers from the schedule file");

    let handler = Update::filter_message()
        .filter_command::<handlers::Command>()
        .endpoint(handlers::handle_command);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service, Arc::new(settings)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    registry.shutdown();
    info!("Bot stopped");
    Ok(())
}
