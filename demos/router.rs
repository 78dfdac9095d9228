//! Router Example
//!
//! Routes records by level and by bound attributes, once delivering to every
//! matching route and once to the first match only.
//!
//! Run with: cargo run -p demos --bin router

use std::sync::Arc;

use contracts::{Attr, Level, Value, ValueKind};
use dispatcher::predicate::{attr_kind_is, attr_value_is, level_is};
use dispatcher::{Logger, MemorySink, Router};

fn dump(sink: &MemorySink) {
    println!("  {}:", dispatcher::Sink::name(sink));
    for record in sink.records() {
        let attrs: Vec<String> = record.attrs().iter().map(ToString::to_string).collect();
        println!("    [{}] {} {}", record.level, record.message, attrs.join(" "));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // ==== Fan mode: slack for errors, influx for anything scoped to it ====
    let slack = MemorySink::new("slack");
    let influx = MemorySink::new("influx");
    let archive = MemorySink::new("archive");

    let logger = Logger::new(
        Router::new()
            .add(Arc::new(slack.clone()), vec![level_is([Level::Error])])
            .add(
                Arc::new(influx.clone()),
                vec![attr_value_is([("scope", "influx")])],
            )
            .add(Arc::new(archive.clone()), vec![])
            .build(),
    );

    logger.info("service started", vec![])?;
    let influx_logger = logger.with(vec![Attr::new("scope", "influx")]);
    influx_logger.info("write point", vec![Attr::new("measurement", "cpu")])?;
    influx_logger.error("write failed", vec![Attr::new("retries", 3i64)])?;

    println!("== fan mode");
    dump(&slack);
    dump(&influx);
    dump(&archive);

    // ==== First-match mode: query logs go to the query sink only ====
    let queries = MemorySink::new("queries").with_min_level(Level::Info);
    let other = MemorySink::new("other").with_min_level(Level::Debug);

    let logger = Logger::new(
        Router::new()
            .add(
                Arc::new(queries.clone()),
                vec![attr_kind_is([
                    ("query", ValueKind::String),
                    ("args", ValueKind::Any),
                ])],
            )
            .add(Arc::new(other.clone()), vec![])
            .first_match()
            .build(),
    );

    let query = |sql: &str| {
        vec![
            Attr::new("query", sql),
            Attr::new("args", Value::any(vec![1, 2, 3])),
        ]
    };
    logger.info("db log 1", query("SELECT * FROM users"))?;
    // matches the query route, which ignores debug: dropped, no fallthrough
    logger.debug("db log 2", query("SELECT * FROM orders"))?;
    logger.info("other logs", vec![Attr::new("something", "value")])?;

    println!("\n== first match");
    dump(&queries);
    dump(&other);

    Ok(())
}
