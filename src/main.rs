mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    caselens::logging::init(cli.log_path())?;

    info!("Starting caselens");
    cli.execute().await?;

    Ok(())
}
