use std::sync::Arc;

use log::info;

mod api;
mod cli;
mod comparer;
mod config;
mod logs;
mod present;

use crate::api::{ArcScoreGateway, OsuGateway};
use crate::comparer::Comparer;
use crate::config::Settings;

#[tokio::main]
async fn main() {
    if dotenvy::dotenv().is_err() {
        eprintln!(".env file not found, relying on process environment variables.");
    }

    logs::init_logger();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let gateway: ArcScoreGateway = Arc::new(Box::new(OsuGateway::new(&settings)));
    let comparer = Comparer::new(gateway, &settings);

    info!("Starting osu! score comparer");

    cli::run(comparer, settings.score_limit).await;

    info!("Done");
}
