//! `datagrid`: load a dataset, apply a saved view state and print the grid

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dv_core::TableState;
use dv_data::{Dataset, DatasetConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod render;

/// Print one page of a tabular dataset under a view state
#[derive(Debug, Parser)]
#[command(name = "datagrid", version, about)]
struct Args {
    /// Dataset file (.json array of objects or headered .csv); replaces the
    /// configured path when both are given
    #[arg(required_unless_present = "config")]
    dataset: Option<PathBuf>,

    /// Saved table state (JSON)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Dataset configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Global search text
    #[arg(long)]
    search: Option<String>,

    /// Sort by a column; append ":desc" for descending
    #[arg(long, value_name = "COLUMN[:desc]")]
    sort: Vec<String>,

    /// Group rows by a column
    #[arg(long)]
    group: Option<String>,

    /// Page to print, starting at 1
    #[arg(long)]
    page: Option<usize>,

    /// Rows per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Print facet statistics before the grid
    #[arg(long)]
    facets: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    let config = dataset_config(&args)?;
    let dataset = Dataset::load(&config)
        .with_context(|| format!("Failed to load dataset {}", config.path.display()))?;
    let engine = dataset.engine()?;

    let state = build_state(&args)?;
    debug!("Effective state: {}", serde_json::to_string(&state)?);

    if args.facets {
        render::print_facets(&dataset.facets());
    }

    let view = engine.apply(dataset.records(), &state);
    info!("{} of {} records shown", view.len(), view.total_records);
    render::print_grid(&view, state.pagination);

    Ok(())
}

/// Dataset configuration from `--config`, with the positional path taking precedence
fn dataset_config(args: &Args) -> Result<DatasetConfig> {
    let mut config = match &args.config {
        Some(path) => DatasetConfig::from_file(path)
            .with_context(|| format!("Failed to read dataset config {}", path.display()))?,
        None => DatasetConfig::default(),
    };
    if let Some(dataset) = &args.dataset {
        config.path = dataset.clone();
    }
    Ok(config)
}

/// Saved state with the command-line adjustments applied on top
fn build_state(args: &Args) -> Result<TableState> {
    let mut state = match &args.state {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open state file {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Invalid table state in {}", path.display()))?
        }
        None => TableState::new(),
    };

    if let Some(search) = &args.search {
        state = state.set_global_filter(search.as_str());
    }
    if !args.sort.is_empty() {
        state = state.clear_sort();
        for key in &args.sort {
            let (column, descending) = parse_sort_key(key);
            state = state.set_sort(column, descending);
        }
    }
    if let Some(group) = &args.group {
        state = state.set_grouping(group);
    }
    if let Some(page_size) = args.page_size {
        state = state.set_page_size(page_size);
    }
    if let Some(page) = args.page {
        state = state.set_page(page.saturating_sub(1));
    }

    Ok(state)
}

/// Split `column[:asc|:desc]`
fn parse_sort_key(key: &str) -> (&str, bool) {
    match key.rsplit_once(':') {
        Some((column, "desc")) => (column, true),
        Some((column, "asc")) => (column, false),
        _ => (key, false),
    }
}
