use anyhow::{bail, Result};
use comfy_table::{Cell, Table as ComfyTable};

use seedmodel_core::data::loader::load_dataset;
use seedmodel_core::snapshot::read_snapshot;
use seedmodel_core::snapshot::types::FlatModel;

use crate::args::InspectArgs;

pub fn run(args: &InspectArgs) -> Result<()> {
    let snapshot = read_snapshot(&args.snapshot)?;

    println!(
        "Snapshot: {} (seedmodel {}, {} marginals)",
        args.snapshot.display(),
        snapshot.seedmodel_version,
        snapshot.distribution
    );
    println!("Created:  {}", snapshot.created_at);
    println!("Dataset:  {}", &snapshot.dataset_hash[..16.min(snapshot.dataset_hash.len())]);
    println!("Order:    {}", snapshot.order.join(" → "));

    if let Some(ref dataset) = args.dataset {
        let loaded = load_dataset(dataset)?;
        if snapshot.matches_dataset(&loaded.meta) {
            println!("Status:   ✓ up to date with {}", dataset.display());
        } else {
            println!(
                "Status:   ✗ dataset metadata changed since this snapshot was written. \
                 Run `seedmodel model` again."
            );
        }
    }
    println!();

    let tables: Vec<(&String, &FlatModel)> = match args.table {
        Some(ref name) => match snapshot.models.get_key_value(name) {
            Some(entry) => vec![entry],
            None => bail!(
                "Table '{}' is not in the snapshot. Tables: {}",
                name,
                snapshot.order.join(", ")
            ),
        },
        None => snapshot.models.iter().collect(),
    };

    for (table, model) in tables {
        print_model(table, model)?;
    }

    Ok(())
}

fn print_model(table: &str, model: &FlatModel) -> Result<()> {
    let params = model.reconstruct()?;
    println!("━━━ {} (D = {}) ━━━", table, model.dimension);

    let mut distribs = ComfyTable::new();
    distribs.set_header(vec!["Column", "Mean", "Std"]);
    for (column, p) in model.columns.iter().zip(&params.distribs) {
        distribs.add_row(vec![
            Cell::new(column),
            Cell::new(format!("{:.6}", p.mean)),
            Cell::new(format!("{:.6}", p.std)),
        ]);
    }
    println!("{}", distribs);

    // Wide covariance matrices are unreadable; the flat vector has them.
    if model.dimension <= 12 {
        let mut cov = ComfyTable::new();
        let mut header = vec![String::new()];
        header.extend((0..model.dimension).map(|i| i.to_string()));
        cov.set_header(header);
        for (i, row) in params.covariance.rows().into_iter().enumerate() {
            let mut cells = vec![Cell::new(i)];
            cells.extend(row.into_iter().map(|v| Cell::new(format!("{:.4}", v))));
            cov.add_row(cells);
        }
        println!("{}", cov);
    } else {
        println!(
            "Covariance: {}×{} (too wide to print)",
            model.dimension, model.dimension
        );
    }
    println!();

    Ok(())
}
