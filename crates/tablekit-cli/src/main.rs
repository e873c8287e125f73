//! `tablekit` - render a JSON dataset through a managed table.
//!
//! Run with `--help` for usage.

#![forbid(unsafe_code)]

mod cli;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tablekit::config::{ColumnConfig, TableConfig};
use tablekit::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, FilterSpec, OutputFormat, SortSpec};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(&cli);

    let output = run(&cli)?;
    print!("{output}");
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose > 0 {
        EnvFilter::new(cli.log_level().as_str().to_lowercase())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_rows(cli: &Cli) -> Result<Vec<Rc<Value>>> {
    let text = fs::read_to_string(&cli.data)
        .with_context(|| format!("failed to read {}", cli.data.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", cli.data.display()))?;
    let Value::Array(items) = value else {
        bail!("{} must hold a JSON array of objects", cli.data.display());
    };
    if let Some(pos) = items.iter().position(|v| !v.is_object()) {
        bail!("row {pos} in {} is not an object", cli.data.display());
    }
    info!(rows = items.len(), "loaded rows");
    Ok(items.into_iter().map(Rc::new).collect())
}

/// One column per key of the first row, typed by its value.
fn infer_config(rows: &[Rc<Value>]) -> TableConfig {
    let columns = rows
        .first()
        .and_then(|row| row.as_object())
        .map(|obj| {
            obj.iter()
                .map(|(key, value)| {
                    let mut column = ColumnConfig::new(key.as_str());
                    column.type_name = match (key.as_str(), value) {
                        ("id", Value::Number(_)) => "id-number",
                        ("id", _) => "id-text",
                        (_, Value::Number(_)) => "number",
                        (_, Value::Bool(_)) => "boolean",
                        _ => "text",
                    }
                    .to_string();
                    column
                })
                .collect()
        })
        .unwrap_or_default();
    debug!(?columns, "inferred columns");
    TableConfig {
        columns,
        ..TableConfig::default()
    }
}

fn load_config(cli: &Cli, rows: &[Rc<Value>]) -> Result<TableConfig> {
    let mut config = match &cli.config {
        Some(path) => TableConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => infer_config(rows),
    };
    if config.columns.is_empty() {
        bail!("no columns: pass --config or provide at least one row");
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(locale) = cli.locale {
        config.stats_locale = locale.into();
    }
    for spec in &cli.filters {
        if !config.columns.iter().any(|c| c.id == spec.column) {
            bail!("unknown filter column '{}'", spec.column);
        }
        config
            .filters
            .entry(spec.column.clone())
            .or_insert_with(FilterColumnConfig::values);
    }
    config.validate().context("invalid table configuration")?;
    Ok(config)
}

fn apply_filters(table: &mut ManagedTable<Value>, filters: &[FilterSpec]) {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for spec in filters {
        grouped
            .entry(spec.column.as_str())
            .or_default()
            .push(spec.value.as_str());
    }
    for (column, values) in grouped {
        debug!(column, ?values, "applying filter");
        table
            .state_mut()
            .set_filter(column, FilterValue::values(values));
    }
    table.refilter();
}

/// Sorts the way a user would: by clicking the header until the
/// requested direction is reached.
fn apply_sort(table: &mut ManagedTable<Value>, spec: &SortSpec) -> Result<()> {
    let Some(column) = table.core().column(&spec.column) else {
        bail!("unknown sort column '{}'", spec.column);
    };
    if !column.sortable {
        warn!(column = %spec.column, "column is not sortable, ignoring --sort");
        return Ok(());
    }
    for _ in 0..3 {
        if table.state().sort().active() == Some((spec.column.as_str(), spec.direction)) {
            return Ok(());
        }
        let Some(header) = table.core().header_cell(&spec.column) else {
            break;
        };
        table.handle(&TableEvent::click(&header));
    }
    warn!(column = %spec.column, "sorting is disabled, ignoring --sort");
    Ok(())
}

fn run(cli: &Cli) -> Result<String> {
    let rows = load_rows(cli)?;
    let config = load_config(cli, &rows)?;
    let columns = config.columns(&ColumnTypeRegistry::new());

    let mut table = ManagedTable::new(
        Container::new("table"),
        columns,
        config.managed_options::<Value>(),
    )
    .context("failed to build table")?;
    table.set_data(rows);

    if !cli.filters.is_empty() {
        apply_filters(&mut table, &cli.filters);
    }
    if let Some(spec) = &cli.sort {
        apply_sort(&mut table, spec)?;
    }
    if let Some(query) = &cli.search {
        table.set_search_query(query.as_str());
    }
    if cli.page != 1 {
        table.set_page(cli.page);
    }
    info!(
        page = table.state().page(),
        pages = table.state().total_pages(),
        "rendered table"
    );

    let output = match cli.format {
        OutputFormat::Text => {
            let grid = render_text(table.core().container(), cli.width);
            let mut out = format!("{grid}\n{}\n", table.stats_text());
            if table.state().total_pages() > 1 {
                let _ = writeln!(
                    out,
                    "{}/{}",
                    table.state().page(),
                    table.state().total_pages()
                );
            }
            out
        }
        OutputFormat::Html => format!("{}\n", table.to_html()),
    };
    Ok(output)
}
