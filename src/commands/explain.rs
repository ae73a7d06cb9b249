//! Offline compilation of query strings into SQL.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use modelfilter_core::PredicateCompiler;
use modelfilter_core::config::AppConfig;
use modelfilter_core::result::FilterResult;
use modelfilter_core::traits::Filterable;
use modelfilter_core::types::{QueryParams, Scalar};
use modelfilter_database::SqlQuery;
use modelfilter_entity::registry;

/// Arguments for the explain command
#[derive(Debug, Args)]
pub struct ExplainArgs {
    /// Entity table, e.g. `posts`
    pub table: String,
    /// Query string, e.g. `title=cat&tags:name[]=news`
    #[arg(default_value = "")]
    pub query: String,
}

/// A compiled query, before execution.
#[derive(Debug, Serialize)]
pub struct Explained {
    /// Entity table.
    pub table: &'static str,
    /// Readable form of the compiled constraints.
    pub filter: String,
    /// Rendered PostgreSQL statement.
    pub sql: String,
    /// Values bound to the statement placeholders.
    pub binds: Vec<Scalar>,
}

#[derive(Debug, Serialize, Tabled)]
struct BindRow {
    placeholder: String,
    value: String,
}

/// Execute the explain command
pub async fn execute(
    args: &ExplainArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> FilterResult<()> {
    let params = QueryParams::from_query_str(&args.query)?;
    let explained = super::with_entity!(args.table.as_str(), E => explain::<E>(config, &params).await)?;

    match format {
        OutputFormat::Json => output::print_json(&explained),
        OutputFormat::Table => {
            output::print_kv("table", explained.table);
            output::print_kv("filter", &explained.filter);
            println!();
            println!("{}", explained.sql);
            if explained.binds.is_empty() {
                return Ok(());
            }
            println!();
            let rows: Vec<BindRow> = explained
                .binds
                .iter()
                .enumerate()
                .map(|(i, value)| BindRow {
                    placeholder: format!("${}", i + 1),
                    value: value.to_string(),
                })
                .collect();
            output::print_list(&rows, format)
        }
    }
}

/// Compile `params` for `E` against the declared columns, without a database.
pub async fn explain<E: Filterable>(
    config: &AppConfig,
    params: &QueryParams,
) -> FilterResult<Explained> {
    let schema = registry::static_schema();
    let filters = config.filters_for(E::table(), E::filters());
    let query = SqlQuery::<E>::unbound().case_insensitive(config.filter.case_insensitive);

    let query = PredicateCompiler::with_settings(&schema, &config.filter)
        .apply(query, E::table(), &filters, params)
        .await?;
    let rendered = query.render()?;

    Ok(Explained {
        table: E::table(),
        filter: query.filter().to_string(),
        sql: rendered.sql,
        binds: rendered.binds,
    })
}
