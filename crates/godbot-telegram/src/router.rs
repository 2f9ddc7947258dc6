use std::sync::Arc;

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::webhooks,
};

use tokio::sync::Mutex;
use tracing::info;

use godbot_core::{
    catalog::CompilerCatalog, config::Config, explorer::port::ExplorerPort, render::RenderPort,
    store::ReplyStore,
};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub catalog: Arc<CompilerCatalog>,
    pub explorer: Arc<dyn ExplorerPort>,
    pub renderer: Arc<dyn RenderPort>,
    pub store: Arc<Mutex<ReplyStore>>,
}

/// Run the bot until shutdown, polling in dev and serving the webhook
/// otherwise.
pub async fn run(
    cfg: Arc<Config>,
    catalog: Arc<CompilerCatalog>,
    explorer: Arc<dyn ExplorerPort>,
    renderer: Arc<dyn RenderPort>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_token.clone());

    if let Ok(me) = bot.get_me().await {
        info!(username = %me.username(), "godbot started");
    }
    for compiler in catalog.iter() {
        info!(command = %compiler.command, title = %compiler.title, "registered command");
    }

    let state = Arc::new(AppState {
        store: Arc::new(Mutex::new(ReplyStore::new(cfg.store_capacity))),
        cfg: cfg.clone(),
        catalog,
        explorer,
        renderer,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_edited_message().endpoint(handlers::handle_edited))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .build();

    if cfg.polling {
        info!("start polling");
        dispatcher.dispatch().await;
        return Ok(());
    }

    let hook = cfg
        .webhook_path
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("webhook mode requires TELEGRAM_HOOK"))?;
    let base = cfg
        .webhook_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("webhook mode requires WEBHOOK_URL"))?;

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.webhook_port).into();
    let url: url::Url = format!("{}/{hook}", base.trim_end_matches('/')).parse()?;
    info!(%url, port = cfg.webhook_port, "starting webhook");

    let listener = webhooks::axum(bot, webhooks::Options::new(addr, url)).await?;
    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("update listener error"),
        )
        .await;

    Ok(())
}
