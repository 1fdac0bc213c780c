//! Regions command - lists the cache regions of a property resource

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::infrastructure::properties::{resolve_resource_name, PropertyLoader};

/// Arguments for the regions command
#[derive(Args, Clone)]
pub struct RegionsArgs {
    /// Resource name, e.g. `cache`, `conf.cache.ccf` or `/conf/app.properties`
    pub resource: String,

    /// Search root (repeatable, overrides config)
    #[arg(long = "search-path")]
    pub search_paths: Vec<PathBuf>,
}

/// Print every region the resource declares, one per line
pub fn run(args: RegionsArgs) -> anyhow::Result<()> {
    let config = super::load_config();

    let search_paths = if args.search_paths.is_empty() {
        config.registry.search_paths
    } else {
        args.search_paths
    };

    let loader = PropertyLoader::new(search_paths);
    let properties = loader.load(&args.resource)?;
    let regions = properties.cache_regions();

    info!(
        resource = %resolve_resource_name(&args.resource),
        regions = regions.len(),
        "Loaded cache regions"
    );

    for region in regions {
        println!("{}", region);
    }

    Ok(())
}
