use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table as ComfyTable};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use seedmodel_core::model::flatten::flat_length;
use seedmodel_core::model::{DistributionKind, MultivariateModel};
use seedmodel_core::modeler::{Modeler, ModelingResult};
use seedmodel_core::navigator::{DataNavigator, InMemoryNavigator};
use seedmodel_core::snapshot::types::ModelSnapshot;
use seedmodel_core::snapshot::write_snapshot;
use seedmodel_core::GaussianCopula;

use crate::args::{Distribution, ModelArgs};

pub fn run(args: &ModelArgs) -> Result<()> {
    // Load optional seedmodel.toml config
    let config = seedmodel_core::config::read_config(Path::new("."))?;
    let path = super::resolve_dataset_path(args.dataset.as_deref(), config.as_ref())?;

    // Phase 1: Load
    let pb = spinner("1/2");
    pb.set_message(format!("Loading {}...", path.display()));

    let navigator = super::load_navigator(&path)?;
    let meta = navigator.meta();

    pb.finish_with_message(format!(
        "Loading dataset... ✓ {} tables, {} references",
        meta.table_count(),
        meta.reference_count()
    ));

    let mut options = config
        .as_ref()
        .map(|c| c.modeler_options())
        .unwrap_or_default();
    if let Some(distribution) = args.distribution {
        options.fit.distribution = match distribution {
            Distribution::Gaussian => DistributionKind::Gaussian,
            Distribution::Kde => DistributionKind::Kde,
        };
    }
    if let Some(ref cfg) = config {
        for warning in cfg.validate_against_meta(meta) {
            eprintln!("  ⚠ {}", warning);
        }
    }

    // Phase 2: Model
    let pb2 = spinner("2/2");
    pb2.set_message(format!(
        "Modeling tables ({} marginals)...",
        options.fit.distribution
    ));

    let distribution = options.fit.distribution;
    let modeler: Modeler<_, GaussianCopula> = Modeler::new(&navigator, options);
    let result = modeler.model_database()?;

    pb2.finish_with_message(format!(
        "Modeling tables... ✓ {} tables, {} extensions, {} degenerate groups",
        result.report.tables_modeled,
        result.report.extensions_built,
        result.report.total_degenerate_groups()
    ));

    let rows = summarize(&navigator, &result)?;
    println!();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{}", summary_table(&rows));
    }

    if let Some(ref output) = args.output {
        let snapshot = ModelSnapshot::from_result(meta, distribution, &result);
        write_snapshot(&snapshot, output)
            .with_context(|| format!("Failed to write snapshot to {}", output.display()))?;
        println!("\nWrote {}", output.display());
    }

    Ok(())
}

fn spinner(prefix: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{prefix}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(prefix);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// One row of the modeling summary.
#[derive(Debug, Serialize)]
struct TableSummary {
    table: String,
    rows: usize,
    own_columns: usize,
    extension_columns: usize,
    dimension: usize,
    flat_length: usize,
    degenerate_groups: usize,
}

fn summarize(
    navigator: &InMemoryNavigator,
    result: &ModelingResult<GaussianCopula>,
) -> Result<Vec<TableSummary>> {
    let mut rows = Vec::with_capacity(result.order.tables.len());
    for table in &result.order.tables {
        let dimension = result.models[table].columns().len();
        let extension_columns = extension_width(navigator, result, table)?;
        let degenerate_groups = result
            .report
            .degenerate_groups
            .iter()
            .filter(|(relation, _)| relation.split("->").next() == Some(table.as_str()))
            .map(|(_, count)| count)
            .sum();

        rows.push(TableSummary {
            table: table.clone(),
            rows: result.tables[table].row_count(),
            own_columns: dimension - extension_columns,
            extension_columns,
            dimension,
            flat_length: flat_length(dimension),
            degenerate_groups,
        });
    }
    Ok(rows)
}

fn summary_table(rows: &[TableSummary]) -> ComfyTable {
    let mut t = ComfyTable::new();
    t.set_header(vec![
        "Table",
        "Rows",
        "Own columns",
        "Extension columns",
        "D",
        "Flat length",
        "Degenerate groups",
    ]);
    for row in rows {
        t.add_row(vec![
            Cell::new(&row.table),
            Cell::new(row.rows),
            Cell::new(row.own_columns),
            Cell::new(row.extension_columns),
            Cell::new(row.dimension),
            Cell::new(row.flat_length),
            Cell::new(row.degenerate_groups),
        ]);
    }
    t
}

/// Columns contributed by the children of `table`.
fn extension_width(
    navigator: &InMemoryNavigator,
    result: &ModelingResult<GaussianCopula>,
    table: &str,
) -> Result<usize> {
    Ok(navigator
        .get_children(table)?
        .iter()
        .map(|child| flat_length(result.numeric[child].column_count()))
        .sum())
}
