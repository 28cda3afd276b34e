use clap::Parser;
use log::info;

use dataset_dashboard::client::Client;
use dataset_dashboard::config::Config;
use dataset_dashboard::error::DashboardError;
use dataset_dashboard::ui::{self, Dashboard, Options};

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    pretty_env_logger::init();

    let config = Config::parse();
    info!("Fetching datasets from {}", config.base_url);

    let client = Client::new(config.base_url.clone());
    let dashboard = Dashboard::new(client, Options::from(&config));
    ui::run(dashboard).await
}
