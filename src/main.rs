use anyhow::Result;
use clap::Parser;

use labelflow::cli::{commands, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::run(cli).await
}
