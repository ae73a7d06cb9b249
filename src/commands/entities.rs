//! Entity listing commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use modelfilter_core::config::AppConfig;
use modelfilter_core::result::FilterResult;
use modelfilter_entity::registry;

/// Arguments for the entities command
#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Show the effective filters of this table instead of the entity list
    pub table: Option<String>,
}

/// Entity display row for table output
#[derive(Debug, Serialize, Tabled)]
struct EntityRow {
    /// Table name
    table: String,
    /// Primary key column
    primary_key: String,
    /// Columns
    columns: String,
    /// Relation names
    relations: String,
    /// Number of filterable keys
    filters: usize,
}

/// Filter display row for table output
#[derive(Debug, Serialize, Tabled)]
struct FilterRow {
    /// Search key
    key: String,
    /// Strategy tag
    strategy: String,
}

/// Execute entity commands
pub fn execute(args: &EntitiesArgs, config: &AppConfig, format: OutputFormat) -> FilterResult<()> {
    match &args.table {
        None => {
            let rows: Vec<EntityRow> = registry::all()
                .into_iter()
                .map(|meta| EntityRow {
                    table: meta.table.to_string(),
                    primary_key: meta.primary_key.to_string(),
                    columns: meta.columns.join(", "),
                    relations: meta
                        .relations
                        .iter()
                        .map(|r| r.name)
                        .collect::<Vec<_>>()
                        .join(", "),
                    filters: registry::filters(meta.table).map_or(0, |f| f.len()),
                })
                .collect();
            output::print_list(&rows, format)
        }
        Some(table) => {
            let base = registry::filters(table).ok_or_else(|| super::unknown_table(table))?;
            let filters = config.filters_for(table, base);
            let rows: Vec<FilterRow> = filters
                .iter()
                .map(|(key, strategy)| FilterRow {
                    key: key.to_string(),
                    strategy: strategy.to_string(),
                })
                .collect();
            output::print_list(&rows, format)
        }
    }
}
