//! `emit` command implementation.

use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{Attr, Record, Value};
use dispatcher::scope::walk_attrs;
use dispatcher::{build_topology, LeafRegistry, Logger, Metered, Middleware};
use observability::metrics::{
    record_handle_latency_ms, record_records_emitted, record_sink_snapshot,
};
use observability::DeliveryAggregator;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::load_blueprint;
use crate::cli::EmitArgs;
use crate::error::CliError;

/// Emit outcome for JSON output
#[derive(Serialize)]
struct EmitReport {
    level: String,
    message: String,
    emitted: u64,
    failed: u64,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    errors: BTreeSet<String>,
    latency_mean_ms: f64,
    sinks: Vec<SinkReport>,
}

#[derive(Serialize)]
struct SinkReport {
    name: String,
    handled: u64,
    failed: u64,
    filtered: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    captured: Option<Vec<CapturedRecord>>,
}

#[derive(Serialize)]
struct CapturedRecord {
    level: String,
    message: String,
    attrs: Vec<String>,
}

/// Execute the `emit` command
#[instrument(
    name = "cli_emit",
    skip(args),
    fields(config = %args.config.display(), level = %args.level, repeat = args.repeat)
)]
pub fn run_emit(args: &EmitArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let mut registry =
        LeafRegistry::from_blueprint(&blueprint).context("Failed to create sinks")?;
    let mut meters: Vec<(String, Metered)> = Vec::new();
    registry.map_leaves(|name, sink| {
        let metered = Metered::new();
        let wrapped = metered.wrap(sink);
        meters.push((name.to_string(), metered));
        wrapped
    });
    meters.sort_by(|a, b| a.0.cmp(&b.0));

    let root = build_topology(&blueprint, &registry).context("Failed to build topology")?;
    let logger = derive_logger(Logger::new(root), args);
    let attrs: Vec<Attr> = args
        .attrs
        .iter()
        .map(|(k, v)| Attr::new(k.as_str(), infer_value(v)))
        .collect();

    info!(message = %args.message, attrs = attrs.len(), "Emitting record");

    let mut aggregator = DeliveryAggregator::new();
    let mut errors = BTreeSet::new();
    for round in 0..args.repeat {
        let start = Instant::now();
        let result = logger.log(args.level, &args.message, attrs.clone());
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        record_handle_latency_ms(latency_ms);
        record_records_emitted(args.level, result.is_ok());
        aggregator.update(result.is_ok(), latency_ms);

        if let Err(e) = result {
            warn!(round, error = %e, "Delivery failed");
            errors.extend(e.errors().into_iter().map(ToString::to_string));
        }
    }

    for (name, metered) in &meters {
        let snapshot = metered.metrics().snapshot();
        record_sink_snapshot(name, &snapshot);
        aggregator.set_snapshot(name.as_str(), snapshot);
    }
    let summary = aggregator.summary();
    debug!(failed = summary.total_failed, "Emit finished");

    let report = EmitReport {
        level: args.level.to_string(),
        message: args.message.clone(),
        emitted: summary.total_records,
        failed: summary.total_failed,
        errors,
        latency_mean_ms: summary.latency_ms.mean,
        sinks: summary
            .sink_snapshots
            .iter()
            .map(|(name, snap)| SinkReport {
                name: name.clone(),
                handled: snap.handled_count,
                failed: snap.failure_count,
                filtered: snap.filtered_count,
                captured: registry
                    .memory(name)
                    .map(|m| m.records().iter().map(capture).collect()),
            })
            .collect(),
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize emit report")?;
        println!("{}", json);
    } else {
        print_report(&report);
        print!("\n{}", summary);
    }

    if report.failed > 0 {
        return Err(CliError::delivery(report.failed, report.emitted).into());
    }
    Ok(())
}

/// Apply `--with` then `--group` derivations
fn derive_logger(logger: Logger, args: &EmitArgs) -> Logger {
    let bound: Vec<Attr> = args
        .bound
        .iter()
        .map(|(k, v)| Attr::new(k.as_str(), infer_value(v)))
        .collect();
    args.groups
        .iter()
        .fold(logger.with(bound), |logger, group| logger.with_group(group))
}

/// Typed value for a command-line string: integer, finite float, bool, else
/// string. `inf` and `nan` stay strings.
fn infer_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        Value::Int(i)
    } else if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
        Value::Float(f)
    } else if let Ok(b) = raw.parse::<bool>() {
        Value::Bool(b)
    } else {
        Value::from(raw)
    }
}

fn capture(record: &Record) -> CapturedRecord {
    let mut attrs = Vec::new();
    walk_attrs(record.attrs(), &mut |path, value| {
        if value.as_group().is_none() {
            attrs.push(format!("{path}={value}"));
        }
        true
    });
    CapturedRecord {
        level: record.level.to_string(),
        message: record.message.clone(),
        attrs,
    }
}

fn print_report(report: &EmitReport) {
    if report.failed == 0 {
        println!(
            "✓ Emitted {} x [{}] {:?}",
            report.emitted, report.level, report.message
        );
    } else {
        println!(
            "✗ {} of {} deliveries failed for [{}] {:?}",
            report.failed, report.emitted, report.level, report.message
        );
        for error in &report.errors {
            println!("  - {}", error);
        }
    }

    for sink in &report.sinks {
        println!(
            "\n  {} (handled {}, failed {}, filtered {})",
            sink.name, sink.handled, sink.failed, sink.filtered
        );
        if let Some(captured) = &sink.captured {
            for record in captured {
                println!(
                    "    [{}] {} {}",
                    record.level,
                    record.message,
                    record.attrs.join(" ")
                );
            }
        }
    }
}
