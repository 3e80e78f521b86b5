//! quarry-migrate CLI
//!
//! Command-line tool for managing SQL-file migrations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use quarry_core::{Connection, ConnectionConfig, DATETIME_FORMAT};
use quarry_migrate::prelude::*;
use quarry_migrate::create_file;

/// Versioned SQL migrations for MySQL, PostgreSQL and SQLite.
#[derive(Parser)]
#[command(name = "quarry-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON connection config. Falls back to DB_* environment variables.
    #[arg(short, long, env = "QUARRY_CONFIG")]
    config: Option<PathBuf>,

    /// Migrations directory.
    #[arg(short, long, default_value = "migrations")]
    path: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations.
    Migrate,

    /// Roll back the most recent migrations.
    Rollback {
        /// Number of migrations to roll back.
        #[arg(short, long, default_value_t = 1)]
        steps: usize,
    },

    /// Roll back every applied migration.
    Reset,

    /// Roll back every migration, then apply them all again.
    Refresh,

    /// Show migration status.
    Status {
        /// Print the status as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show SQL for a migration without executing.
    Sql {
        /// Migration name.
        name: String,

        /// Show rollback SQL instead of forward SQL.
        #[arg(short, long)]
        reverse: bool,
    },

    /// Create an empty SQL migration file.
    Make {
        /// Migration description, e.g. "create users".
        name: String,
    },
}

fn report(outcomes: &[MigrationOutcome]) {
    for outcome in outcomes {
        match outcome {
            MigrationOutcome::Applied(name) => println!(" [+] {name}"),
            MigrationOutcome::RolledBack(name) => println!(" [-] {name}"),
            MigrationOutcome::Skipped(name) => println!(" [=] {name}"),
        }
    }
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

    if let Commands::Make { name } = &cli.command {
        let path = create_file(&cli.path, name)?;
        info!("Created migration: {}", path.display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => ConnectionConfig::from_json_file(path)?,
        None => ConnectionConfig::from_env()?,
    };
    let conn = Connection::connect(config).await?;

    let mut migrator = Migrator::new(&conn);
    let found = migrator.load_directory(&cli.path)?;
    info!("Loaded {} migration(s) from {}", found, cli.path.display());

    match cli.command {
        Commands::Migrate => report(&migrator.migrate().await?),
        Commands::Rollback { steps } => report(&migrator.rollback(steps).await?),
        Commands::Reset => report(&migrator.rollback_all().await?),
        Commands::Refresh => report(&migrator.refresh().await?),
        Commands::Status { json } => {
            let status = migrator.status().await?;
            if json {
                let entries: Vec<_> = status
                    .iter()
                    .map(|migration| {
                        serde_json::json!({
                            "migration": migration.name,
                            "applied": migration.applied,
                            "executed_at": migration
                                .executed_at
                                .map(|at| at.format(DATETIME_FORMAT).to_string()),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if status.is_empty() {
                info!("No migrations found.");
            } else {
                println!("\nMigrations:");
                println!("{:-<60}", "");
                for migration in &status {
                    match migration.executed_at {
                        Some(at) if migration.applied => println!(
                            " [X] {} ({})",
                            migration.name,
                            at.format(DATETIME_FORMAT)
                        ),
                        _ if migration.applied => println!(" [X] {}", migration.name),
                        _ => println!(" [ ] {}", migration.name),
                    }
                }
                println!();
            }
        }
        Commands::Sql { name, reverse } => {
            let statements = if reverse {
                migrator.rollback_sql_for(&name)?
            } else {
                migrator.sql_for(&name)?
            };
            for sql in statements {
                println!("{sql};");
            }
        }
        Commands::Make { .. } => {}
    }

    Ok(())
}
