//! Fanout / Failover / Pool Example
//!
//! Three "collectors" stand in for remote log shippers; the second one is
//! down. The same record is sent through each strategy to show who gets it.
//!
//! Run with: cargo run -p demos --bin fanout_failover

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{Attr, SinkError, SinkRef, Value};
use dispatcher::{failover, fanout, pool, InlineSink, Logger};

/// Collector printing what it receives; `down` collectors refuse everything
fn collector(name: &'static str, down: Arc<AtomicBool>) -> SinkRef {
    Arc::new(InlineSink::new(
        name,
        |_, _, _| true,
        move |_, scope, record| {
            if down.load(Ordering::Relaxed) {
                return Err(SinkError::write(name, "connection refused"));
            }
            let attrs: Vec<String> = scope
                .merged_attrs(&record)
                .iter()
                .map(ToString::to_string)
                .collect();
            println!(
                "  [{name}] {} {} {}",
                record.level,
                record.message,
                attrs.join(" ")
            );
            Ok(())
        },
    ))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let outage = Arc::new(AtomicBool::new(true));
    let up = Arc::new(AtomicBool::new(false));
    let collectors = || {
        vec![
            collector("eu-west-3a", Arc::clone(&up)),
            collector("eu-west-3b", Arc::clone(&outage)),
            collector("eu-west-3c", Arc::clone(&up)),
        ]
    };

    let emit = |logger: Logger| {
        logger
            .with(vec![Attr::group(
                "user",
                vec![Attr::new("id", "user-123"), Attr::new("plan", "pro")],
            )])
            .with(vec![Attr::new("environment", "dev")])
            .error(
                "A message",
                vec![Attr::new("error", Value::error(std::io::Error::other("an error")))],
            )
    };

    println!("== fanout: every collector, failures aggregated");
    if let Err(e) = emit(Logger::new(fanout(collectors()))) {
        println!("  -> {} failure(s): {e}", e.errors().len());
    }

    println!("\n== failover: first collector that accepts");
    emit(Logger::new(failover(collectors())))?;

    println!("\n== pool: random start, then failover");
    for _ in 0..3 {
        emit(Logger::new(pool(collectors())))?;
    }

    outage.store(false, Ordering::Relaxed);
    println!("\n== fanout after recovery");
    emit(Logger::new(fanout(collectors())))?;

    Ok(())
}
