//! CLI command definitions and dispatch.

pub mod entities;
pub mod explain;
pub mod migrate;
pub mod query;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use modelfilter_core::config::AppConfig;
use modelfilter_core::error::FilterError;
use modelfilter_core::result::FilterResult;
use modelfilter_database::DatabasePool;

/// Run `$body` with `$entity` aliased to the entity type stored in `$table`.
macro_rules! with_entity {
    ($table:expr, $entity:ident => $body:expr) => {
        match $table {
            "posts" => {
                type $entity = modelfilter_entity::Post;
                $body
            }
            "tags" => {
                type $entity = modelfilter_entity::Tag;
                $body
            }
            "comments" => {
                type $entity = modelfilter_entity::Comment;
                $body
            }
            "authors" => {
                type $entity = modelfilter_entity::Author;
                $body
            }
            "profiles" => {
                type $entity = modelfilter_entity::Profile;
                $body
            }
            other => Err($crate::commands::unknown_table(other)),
        }
    };
}

pub(crate) use with_entity;

/// modelfilter: compile query parameters into relational filters
#[derive(Debug, Parser)]
#[command(name = "modelfilter", version, about, long_about = None)]
pub struct Cli {
    /// Configuration directory (`default.toml` plus `<env>.toml`)
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List entities or one entity's filters
    Entities(entities::EntitiesArgs),
    /// Compile a query string and print the resulting SQL
    Explain(explain::ExplainArgs),
    /// Filter rows in PostgreSQL
    Query(query::QueryArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> FilterResult<()> {
        match &self.command {
            Commands::Entities(args) => entities::execute(args, &config, self.format),
            Commands::Explain(args) => explain::execute(args, &config, self.format).await,
            Commands::Query(args) => query::execute(args, &config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: open the configured database pool
pub async fn connect(config: &AppConfig) -> FilterResult<DatabasePool> {
    DatabasePool::connect(&config.database).await
}

pub(crate) fn unknown_table(table: &str) -> FilterError {
    FilterError::not_found(format!("Unknown entity table '{table}'"))
}
