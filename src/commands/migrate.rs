//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use modelfilter_core::config::AppConfig;
use modelfilter_core::result::FilterResult;
use modelfilter_database::migration;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show migration status
    Status,
}

/// Migration display row for table output
#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    /// Version
    version: i64,
    /// Description
    description: String,
    /// Applied
    applied: bool,
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> FilterResult<()> {
    let db = super::connect(config).await?;

    let result = match &args.command {
        MigrateCommand::Run => migration::run_migrations(db.pool())
            .await
            .map(|()| output::print_success("All migrations applied successfully.")),
        MigrateCommand::Status => match migration::migration_status(db.pool()).await {
            Ok(status) => {
                let rows: Vec<MigrationRow> = status
                    .into_iter()
                    .map(|s| MigrationRow {
                        version: s.version,
                        description: s.description,
                        applied: s.applied,
                    })
                    .collect();
                output::print_list(&rows, format)
            }
            Err(e) => Err(e),
        },
    };

    db.close().await;
    result
}
