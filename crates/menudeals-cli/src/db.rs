//! `db` subcommands: connectivity, migrations and catalog seeding.

use std::path::PathBuf;

use clap::Subcommand;
use menudeals_core::{load_catalog, AppConfig};

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert restaurants and deals from the catalog file
    Seed {
        /// Catalog YAML (defaults to `MENUDEALS_CATALOG_PATH`)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = menudeals_db::PoolConfig::from_app_config(config);
    let pool = menudeals_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

/// Dispatch a `db` subcommand.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database is unreachable,
/// or the catalog fails to load or seed.
pub(crate) async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    let config = menudeals_core::load_app_config()?;
    let pool = connect(&config).await?;

    match command {
        DbCommands::Ping => {
            menudeals_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = menudeals_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed { catalog } => {
            let path = catalog.unwrap_or_else(|| config.catalog_path.clone());
            let catalog = load_catalog(&path)?;
            menudeals_db::run_migrations(&pool).await?;
            let summary = menudeals_db::seed_catalog(&pool, &catalog).await?;
            println!(
                "seeded {} restaurant(s) and {} deal(s) from {}",
                summary.restaurants,
                summary.deals,
                path.display()
            );
        }
    }

    Ok(())
}
