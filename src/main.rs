mod auth;
mod blockers;
mod cli;
mod config;
mod error;
mod mail;
mod output;
mod providers;
mod reminder;
mod report;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting Jeeves - CI Failure Reminders");
    cli.execute().await?;

    Ok(())
}
