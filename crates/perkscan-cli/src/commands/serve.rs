//! Serve command - run the read-only HTTP API.

use clap::Args;

use perkscan_store::PerkStore;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Port to bind (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Database URL (overrides config)
    #[arg(long)]
    database_url: Option<String>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let database_url = args
        .database_url
        .unwrap_or_else(|| config.store.database_url.clone());
    let port = args.port.unwrap_or(config.api.port);

    let store = PerkStore::connect(&database_url).await?;
    perkscan_api::serve(store, port).await
}
