mod app;
mod config;
mod detection;
mod domain;
mod error;
mod features;
mod http;
mod infrastructure;
mod model;
mod whois;

use anyhow::Result;
use infrastructure::{directories, logging, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let (shutdown, _) = shutdown::Shutdown::new();
    shutdown::install_signal_handlers(shutdown.clone());

    let app = app::PhishGuardApp::initialize(config, shutdown)?;
    app.run().await
}
