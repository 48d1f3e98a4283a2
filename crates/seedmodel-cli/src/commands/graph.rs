use std::path::Path;

use anyhow::Result;

use seedmodel_core::graph::topo::modeling_order;
use seedmodel_core::graph::visualize::{self, GraphFormat as VizFormat};
use seedmodel_core::navigator::DataNavigator;

use crate::args::GraphArgs;

pub fn run(args: &GraphArgs) -> Result<()> {
    let config = seedmodel_core::config::read_config(Path::new("."))?;
    let path = super::resolve_dataset_path(args.dataset.as_deref(), config.as_ref())?;
    let navigator = super::load_navigator(&path)?;

    // A cyclic graph can still be drawn, just without positions.
    let order = match modeling_order(navigator.graph()) {
        Ok(order) => Some(order),
        Err(err) => {
            tracing::warn!("{}", err);
            None
        }
    };

    let format = match args.format {
        crate::args::GraphFormat::Mermaid => VizFormat::Mermaid,
        crate::args::GraphFormat::Dot => VizFormat::Dot,
    };

    let output = visualize::visualize(navigator.graph(), order.as_ref(), format);
    println!("{}", output);

    Ok(())
}
