mod auth;
mod cli;
mod client;
mod config;
mod error;
mod fetcher;
mod jobs;
mod output;
mod reproduce;
mod testcase;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting clusterfuzz tools");
    cli.execute().await?;

    Ok(())
}
