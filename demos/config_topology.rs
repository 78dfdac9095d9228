//! Config Topology Example
//!
//! Loads a topology file, builds it, and logs a few records through it.
//! Memory sinks are dumped at the end.
//!
//! Run with: cargo run -p demos --bin config_topology [-- path/to/topology.toml]

use std::path::PathBuf;

use config_loader::ConfigLoader;
use contracts::Attr;
use dispatcher::{build_topology, LeafRegistry, Logger};
use observability::{LogFormat, ObservabilityConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        ..Default::default()
    })?;

    // ==== Stage 1: Load configuration ====
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/topology.toml")));
    tracing::info!(path = %path.display(), "Loading topology");
    let blueprint = ConfigLoader::load_from_path(&path)?;

    // ==== Stage 2: Build leaves and the tree ====
    let registry = LeafRegistry::from_blueprint(&blueprint)?;
    let root = build_topology(&blueprint, &registry)?;

    // ==== Stage 3: Log ====
    let logger = Logger::new(root).with(vec![Attr::new("service", "billing")]);
    let db = logger.with(vec![Attr::new("scope", "db")]).with_group("sql");

    logger.info("service started", vec![Attr::new("port", 8080i64)])?;
    for i in 0..4i64 {
        db.debug("query", vec![Attr::new("statement", "SELECT 1"), Attr::new("n", i)])?;
    }
    db.error("deadlock detected", vec![Attr::new("table", "invoices")])?;

    // ==== Stage 4: Report ====
    for (name, sink) in registry.memory_sinks() {
        println!("{name} ({} records)", sink.len());
        for record in sink.records() {
            let attrs: Vec<String> = record.attrs().iter().map(ToString::to_string).collect();
            println!("  [{}] {} {}", record.level, record.message, attrs.join(" "));
        }
    }

    Ok(())
}
