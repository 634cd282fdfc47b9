mod db;
mod deals;

use clap::{Parser, Subcommand};

use crate::db::DbCommands;
use crate::deals::DealsCommands;

#[derive(Debug, Parser)]
#[command(name = "menudeals-cli")]
#[command(about = "MenuDeals command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Query deals and the day strip
    Deals {
        #[command(subcommand)]
        command: DealsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => db::run_db(command).await?,
        Some(Commands::Deals { command }) => deals::run_deals(command).await?,
        None => println!("menudeals-cli: run with --help to list commands"),
    }

    Ok(())
}
