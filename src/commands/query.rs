//! Filtering rows stored in PostgreSQL.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use sqlx::FromRow;
use sqlx::postgres::PgRow;

use crate::output::{self, OutputFormat};
use modelfilter_core::config::AppConfig;
use modelfilter_core::result::FilterResult;
use modelfilter_core::traits::Filterable;
use modelfilter_core::types::{PageRequest, QueryParams, SortField};
use modelfilter_database::{FilterRepository, PgSchemaIntrospector};

/// Arguments for the query command
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Entity table, e.g. `posts`
    pub table: String,
    /// Query string, e.g. `status[]=draft&status[]=live&comments=0`
    #[arg(default_value = "")]
    pub query: String,
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u64,
    /// Rows per page
    #[arg(long, default_value_t = 25)]
    pub page_size: u64,
    /// Sort column, `col` or `col:desc`; repeatable
    #[arg(long)]
    pub sort: Vec<String>,
    /// Fetch every matching row without pagination or sorting
    #[arg(long, conflicts_with_all = ["page", "page_size", "sort"])]
    pub all: bool,
}

/// Execute the query command
pub async fn execute(args: &QueryArgs, config: &AppConfig, format: OutputFormat) -> FilterResult<()> {
    let params = QueryParams::from_query_str(&args.query)?;
    let sort = args
        .sort
        .iter()
        .map(|s| s.parse::<SortField>())
        .collect::<FilterResult<Vec<_>>>()?;

    let db = super::connect(config).await?;
    let schema = Arc::new(PgSchemaIntrospector::new(db.pool().clone(), &config.filter));

    let result = super::with_entity!(args.table.as_str(), E => {
        let repo = FilterRepository::<E>::new(db.pool().clone(), schema, config.filter.clone())
            .with_filters(config.filters_for(E::table(), E::filters()));
        run(&repo, args, &params, &sort, format).await
    });

    db.close().await;
    result
}

async fn run<E>(
    repo: &FilterRepository<E>,
    args: &QueryArgs,
    params: &QueryParams,
    sort: &[SortField],
    format: OutputFormat,
) -> FilterResult<()>
where
    E: Filterable + for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin,
{
    if args.all {
        let rows = repo
            .filter_results(params, true)
            .await?
            .into_materialized()
            .unwrap_or_default();
        return output::print_rows(&rows, format);
    }

    let page = repo
        .filter_page(params, PageRequest::new(args.page, args.page_size), sort)
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&page),
        OutputFormat::Table => {
            output::print_rows(&page.items, format)?;
            output::print_kv(
                "page",
                &format!("{} of {}", page.page, page.total_pages),
            );
            output::print_kv("total", &page.total_items.to_string());
            Ok(())
        }
    }
}
