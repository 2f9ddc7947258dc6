use std::sync::Arc;

use tracing::info;

use godbot_carbonara::CarbonaraClient;
use godbot_core::{
    catalog::CompilerCatalog, config::Config, explorer::port::ExplorerPort, render::RenderPort,
};
use godbot_explorer::ExplorerClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    godbot_core::logging::init("godbot")?;

    let cfg = Arc::new(Config::load()?);

    let explorer: Arc<dyn ExplorerPort> = Arc::new(ExplorerClient::new(
        cfg.explorer_url.clone(),
        cfg.language.clone(),
    ));
    let renderer: Arc<dyn RenderPort> = Arc::new(CarbonaraClient::new(cfg.carbonara_url.clone()));

    // Built once here; every consumer gets a read-only handle.
    let listings = explorer.list_compilers(&cfg.language).await?;
    let mut catalog = CompilerCatalog::new();
    catalog.load(&listings, &cfg.language, &cfg.instruction_set);
    info!(compilers = catalog.len(), "compiler catalog ready");
    let catalog = Arc::new(catalog);

    godbot_telegram::router::run(cfg, catalog, explorer, renderer).await
}
