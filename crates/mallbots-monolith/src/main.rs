//! MallBots monolith entry point.
//!
//! The process hosts the modules and exposes no transport of its own; it
//! runs until interrupted.

use mallbots_monolith::config::Config;
use mallbots_monolith::error::AppError;
use mallbots_monolith::{logging, run};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    logging::init(config.log_format);

    tracing::info!("starting MallBots monolith");
    run(&config, tokio::signal::ctrl_c()).await
}
