mod aggregate;
mod bom;
mod calendar;
mod chart;
mod cli;
mod db;
mod download;
mod error;
mod export;
mod parquet;
mod reading;
mod silo;
mod stats;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Fetch(args) => match command::fetch(args).await {
            Ok(filename) => println!("Tables saved alongside `{}`", filename),
            Err(e) => eprintln!("Error: {}", e),
        },
        Commands::Stations(args) => match command::stations(args).await {
            Ok(db_path) => println!("Station directory cached in `{}`", db_path),
            Err(e) => eprintln!("Error: {}", e),
        },
    }

    Ok(())
}
