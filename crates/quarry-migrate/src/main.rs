//! quarry-migrate CLI
//!
//! Command-line tool for running `.sql` migrations against SQLite.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::ConnectOptions;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use quarry_migrate::prelude::*;
use quarry_sqlite::SqliteExecutor;

/// Batch-tracked database migrations.
#[derive(Parser)]
#[command(name = "quarry-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (overrides the config file).
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// Migrations directory; repeat for several (later ones win on name clashes).
    #[arg(short = 'p', long = "path")]
    paths: Vec<PathBuf>,

    /// Ledger table name.
    #[arg(long)]
    table: Option<String>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations.
    #[command(name = "migrate")]
    Migrate,

    /// Roll back the last batch.
    #[command(name = "migrate:rollback")]
    Rollback {
        /// Only roll back this many of the batch's newest migrations.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        step: Option<u64>,
    },

    /// Show migration status.
    #[command(name = "migrate:status")]
    Status {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Create a new migration file.
    #[command(name = "make:migration")]
    MakeMigration {
        /// Migration name, e.g. CreateUsersTable.
        name: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<MigrateConfig> {
    let mut config = match &cli.config {
        Some(path) => MigrateConfig::from_file(path)?,
        None => MigrateConfig::default(),
    };
    if let Some(url) = &cli.database {
        config.database_url.clone_from(url);
    }
    if !cli.paths.is_empty() {
        config.paths.clone_from(&cli.paths);
    }
    if let Some(table) = &cli.table {
        config.table.clone_from(table);
    }
    config.validate()?;
    Ok(config)
}

async fn connect(url: &str) -> anyhow::Result<SqliteExecutor> {
    let conn = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .connect()
        .await?;
    Ok(SqliteExecutor::from_connection(conn))
}

async fn open_migrator(config: &MigrateConfig) -> anyhow::Result<Migrator<SqliteExecutor>> {
    let executor = connect(&config.database_url).await?;
    Ok(Migrator::from_config(executor, config, SqlFileResolver))
}

/// Writes a new migration stub into the first configured path.
fn make_migration(config: &MigrateConfig, name: &str) -> anyhow::Result<PathBuf> {
    let paths: MigrationPaths = config.paths.iter().collect();
    Ok(MigrationWriter::from_paths(&paths)?.write(name)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli)?;
    match cli.command {
        Commands::Migrate => {
            let applied = open_migrator(&config).await?.migrate().await?;
            if applied.is_empty() {
                println!("Nothing to migrate.");
            }
            for name in &applied {
                println!("Migrated: {name}");
            }
        }

        Commands::Rollback { step } => {
            let steps = usize::try_from(step.unwrap_or(0))?;
            let rolled_back = open_migrator(&config).await?.rollback(steps).await?;
            if rolled_back.is_empty() {
                println!("Nothing to rollback.");
            }
            for name in &rolled_back {
                println!("Rolled back: {name}");
            }
        }

        Commands::Status { json } => {
            let status = open_migrator(&config).await?.status().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else if status.is_empty() {
                println!("No migrations found.");
            } else {
                println!("{:<8}  {:<60}", "Batch", "Migration");
                println!("{:-<72}", "");
                for item in &status {
                    let batch = item
                        .batch
                        .map_or_else(|| "-".to_string(), |b| b.to_string());
                    println!("{batch:<8}  {:<60}", item.name);
                }
            }
        }

        // needs no database connection
        Commands::MakeMigration { name } => {
            let path = make_migration(&config, &name)?;
            println!("Created migration: {}", path.display());
        }
    }

    Ok(())
}
