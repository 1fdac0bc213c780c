//! Demo command - assembles the registry and walks through its semantics

use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::infrastructure::metrics;

/// Arguments for the demo command
#[derive(Args, Clone)]
pub struct DemoArgs {
    /// Print Prometheus metrics after the walkthrough
    #[arg(long)]
    pub show_metrics: bool,
}

/// Run the walkthrough against a registry built from configuration
pub fn run(args: DemoArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    let prometheus = metrics::init_metrics(&config.metrics);

    let registry = crate::build_registry(&config.registry)?;
    info!(caches = registry.len(), "Registry ready");

    let cache = registry.get_or_create::<String>("myCache")?;
    let value = Arc::new("First Put".to_string());
    cache.put("bla", Arc::clone(&value));

    let by_reference = cache.get("bla").is_some_and(|v| Arc::ptr_eq(&v, &value));
    println!("put/get returns the stored reference: {}", by_reference);
    println!("size after put: {}", cache.size());

    cache.remove("bla");
    println!("present after remove: {}", cache.get("bla").is_some());

    let documents = registry.get_or_create::<serde_json::Value>("documents")?;
    let document = Arc::new(serde_json::json!({ "title": "draft" }));
    documents.put_copy("doc", &document)?;

    let stored = documents.get("doc");
    let isolated = stored.as_ref().is_some_and(|v| !Arc::ptr_eq(v, &document));
    println!("put_copy stores an independent copy: {}", isolated);

    match registry.get_or_create::<i64>("myCache") {
        Ok(_) => println!("type check: unexpectedly accepted i64 for myCache"),
        Err(e) => println!("type check: {}", e),
    }

    for name in registry.names() {
        if let Some(cache) = registry.get(&name) {
            println!(
                "cache {} holds {} ({} entries)",
                name,
                registry.value_type(&*cache),
                cache.size()
            );
        }
    }

    if args.show_metrics {
        if let Some(prometheus) = prometheus {
            print!("{}", prometheus.render());
        }
    }

    Ok(())
}
