use crate::bot::views;
use crate::bot::{InboundUpdate, UpdateDispatcher};
use crate::capture::ExternalCapture;
use crate::config::Settings;
use crate::status::StatusReporter;
use crate::transport::{ChatRef, TelegramTransport};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tracing::{debug, info, warn};

/// Run the Telegram bot until Ctrl-C.
///
/// `status` measures uptime from when the process started, not from here.
///
/// # Errors
///
/// Returns an error if the bot identity cannot be queried or an existing
/// webhook cannot be removed. Both are fatal: polling cannot work without them.
pub async fn run_bot(settings: Arc<Settings>, status: StatusReporter) -> Result<()> {
    let bot = Bot::new(settings.telegram_token.clone());

    let me = bot.get_me().await.context("Failed to get info of the bot")?;
    info!("Launching bot: @{} ({})", me.username(), me.user.first_name);

    // getUpdates does not work while a webhook is set
    bot.delete_webhook()
        .await
        .context("Failed to delete webhook")?;

    let dispatcher = Arc::new(init_dispatcher(&settings, bot.clone()).with_status(status));
    if dispatcher.sessions().is_empty().await {
        warn!("No allowed ids configured, every update will be rejected.");
    }
    let handler = setup_handler();

    let interval = settings.monitor_interval();
    let listener = Polling::builder(bot.clone())
        .timeout(Duration::from_secs(interval))
        .build();

    info!("Bot is running (polling interval: {interval}s)...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .default_handler(|upd| async move {
            debug!("Ignoring non-message update {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("Error while receiving update"),
        )
        .await;

    Ok(())
}

fn init_dispatcher(settings: &Settings, bot: Bot) -> UpdateDispatcher {
    info!("Allowed ids: {}", settings.allowed_ids().join(", "));

    let capture = Arc::new(ExternalCapture::new(
        &settings.capture_bin,
        settings.capture_args(),
        &settings.temp_dir,
    ));
    info!(
        "Capture: {} (temp dir: {})",
        settings.capture_bin, settings.temp_dir
    );

    let transport = Arc::new(TelegramTransport::new(bot, &views::command_keyboard()));
    UpdateDispatcher::from_settings(settings, capture, transport)
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry().branch(Update::filter_message().endpoint(handle_message))
}

async fn handle_message(
    msg: Message,
    dispatcher: Arc<UpdateDispatcher>,
) -> Result<(), teloxide::RequestError> {
    // Outcome is logged by the dispatcher; nothing is retried.
    dispatcher.dispatch(inbound_update(&msg)).await;
    respond(())
}

/// Convert a Telegram message into the dispatcher's update form.
#[must_use]
pub fn inbound_update(msg: &Message) -> InboundUpdate {
    let from = msg.from.as_ref();
    InboundUpdate {
        identity: from.and_then(|u| u.username.clone()),
        display_name: from.map_or_else(|| "Unknown".to_string(), |u| u.first_name.clone()),
        text: msg.text().map(str::to_string),
        chat: ChatRef(msg.chat.id.0),
    }
}
